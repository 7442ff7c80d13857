//! `pway-sort` is a p-way external merge sort implementation.
//!
//! External sorting is a class of sorting algorithms that can handle massive amounts of data. External
//! sorting is required when the data being sorted do not fit into the main memory (RAM) of a computer
//! and instead must be resided in slower external memory, usually a hard disk drive. Sorting is achieved
//! in two phases. During the first phase replacement selection turns the input into initial sorted runs,
//! during the second phase the runs are merged `p` at a time until a single fully sorted run remains.
//! Because replacement selection keeps a bounded working set and re-admits each just-read record, the
//! initial runs are typically about twice the size of the working memory. For more information see
//! [External Sorting](https://en.wikipedia.org/wiki/External_sorting).
//!
//! # Overview
//!
//! `pway-sort` supports the following features:
//!
//! * **Bounded memory:**
//!   at most O(`p`) records are resident at any time in either phase; sortable file size is limited
//!   only by available temporary disk space.
//! * **Replacement-selection run generation:**
//!   initial runs larger than the working set, produced with an active/deferred partition scheme.
//! * **Iterative p-way merging:**
//!   runs are merged in groups of up to `p` using a tournament (heap) selection, one pass at a time,
//!   until one run remains.
//! * **Partial-failure tolerance:**
//!   a run store that went missing before its merge group is skipped with a warning and the merge
//!   proceeds with the remaining sources.
//!
//! # Example
//!
//! ```no_run
//! use std::fs;
//! use std::io;
//! use std::path;
//!
//! use pway_sort::{ExternalSorterBuilder, RecordReader};
//!
//! fn main() {
//!     env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();
//!
//!     let input = RecordReader::new(io::BufReader::new(fs::File::open("input.txt").unwrap()));
//!
//!     let sorter = ExternalSorterBuilder::new(8).build().unwrap();
//!
//!     let report = sorter.sort(input, path::Path::new("output.txt")).unwrap();
//!     println!("{} records sorted in {} passes", report.records, report.merge_passes);
//! }
//! ```

pub mod generator;
pub mod input;
pub mod merger;
pub mod run;
pub mod sort;

pub use generator::{RunBatch, RunGenerator};
pub use input::RecordReader;
pub use merger::{RunMerger, TournamentMerger};
pub use run::{Run, RunReader, RunWriter};
pub use sort::{ExternalSorter, ExternalSorterBuilder, SortError, SortReport};
