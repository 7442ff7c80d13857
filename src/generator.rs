//! Replacement-selection run generation.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io;
use std::path::Path;

use log;

use crate::run::{Run, RunWriter};
use crate::sort::SortError;

/// Result of the run generation phase: the produced run handles, in creation
/// order, and the total number of records read from the input.
pub struct RunBatch {
    pub runs: Vec<Run>,
    pub records: u64,
}

/// Initial run generator.
/// Produces sorted runs typically larger than the working-set bound by
/// replacement selection: the just-written minimum is continuously replaced
/// with a newly read record, and records too small to extend the current run
/// are deferred to the next one. Memory usage is bounded by `fan_in` resident
/// records across both working sets.
pub struct RunGenerator {
    fan_in: usize,
}

impl RunGenerator {
    /// Creates a generator with the given working-set bound.
    pub fn new(fan_in: usize) -> Self {
        RunGenerator { fan_in }
    }

    /// Consumes the input stream and writes one store per run under `tmp_dir`.
    /// An empty or fully unparsable input yields an empty batch.
    ///
    /// # Arguments
    /// * `input` - Input stream records are fetched from
    /// * `tmp_dir` - Directory the run stores are created in
    pub fn generate<I>(&self, input: I, tmp_dir: &Path) -> Result<RunBatch, SortError>
    where
        I: IntoIterator<Item = io::Result<i64>>,
    {
        let mut input = input.into_iter();
        // std's binary heap is a max-heap, reversed here to pop minima
        let mut active: BinaryHeap<Reverse<i64>> = BinaryHeap::with_capacity(self.fan_in);
        let mut deferred: BinaryHeap<Reverse<i64>> = BinaryHeap::with_capacity(self.fan_in);

        let mut runs: Vec<Run> = Vec::new();
        let mut records: u64 = 0;

        while active.len() < self.fan_in {
            match input.next() {
                Some(Ok(value)) => {
                    records += 1;
                    active.push(Reverse(value));
                }
                Some(Err(err)) => return Err(SortError::Input(err)),
                None => break,
            }
        }

        while !active.is_empty() {
            let path = tmp_dir.join(format!("run_{}", runs.len()));
            let mut writer = RunWriter::create(path).map_err(SortError::Io)?;

            while let Some(Reverse(minimum)) = active.pop() {
                writer.push(minimum).map_err(SortError::Io)?;
                let last_output = minimum;

                match input.next() {
                    Some(Ok(value)) => {
                        records += 1;
                        if value >= last_output {
                            // still fits the run in progress
                            active.push(Reverse(value));
                        } else {
                            deferred.push(Reverse(value));
                        }
                    }
                    Some(Err(err)) => return Err(SortError::Input(err)),
                    None => {}
                }
            }

            let run = writer.finish().map_err(SortError::Io)?;
            log::debug!("run {} closed at {}", runs.len(), run.path().display());
            runs.push(run);

            std::mem::swap(&mut active, &mut deferred);
        }

        log::info!("run generation done ({} records, {} runs)", records, runs.len());

        Ok(RunBatch { runs, records })
    }
}
