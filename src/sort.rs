//! External sorter.

use log;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::io;
use std::path::Path;

use crate::generator::RunGenerator;
use crate::merger::RunMerger;

/// Sorting error.
#[derive(Debug)]
pub enum SortError {
    /// Temporary directory creation error.
    TempDir(io::Error),
    /// Fan-in factor below the minimum of 2.
    InvalidFanIn(usize),
    /// Input data stream error.
    Input(io::Error),
    /// Run store I/O error.
    Io(io::Error),
    /// The input contained no parseable records, so no run was generated.
    NoRuns,
}

impl Error for SortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self {
            SortError::TempDir(err) => Some(err),
            SortError::Input(err) => Some(err),
            SortError::Io(err) => Some(err),
            SortError::InvalidFanIn(_) | SortError::NoRuns => None,
        }
    }
}

impl Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            SortError::TempDir(err) => write!(f, "temporary directory not created: {}", err),
            SortError::InvalidFanIn(fan_in) => write!(f, "fan-in factor must be at least 2, got {}", fan_in),
            SortError::Input(err) => write!(f, "input data stream error: {}", err),
            SortError::Io(err) => write!(f, "I/O operation failed: {}", err),
            SortError::NoRuns => write!(f, "no run generated"),
        }
    }
}

/// Statistics reported by a completed sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortReport {
    /// Total records read from the input.
    pub records: u64,
    /// Fan-in factor the sort ran with.
    pub fan_in: usize,
    /// Number of initial runs produced by replacement selection.
    pub initial_runs: usize,
    /// Number of merge passes performed.
    pub merge_passes: u64,
}

/// External sorter builder. Provides methods for [`ExternalSorter`] initialization.
#[derive(Clone)]
pub struct ExternalSorterBuilder {
    /// Fan-in factor: working-set bound for run generation and the maximum
    /// number of runs merged per group.
    fan_in: usize,
    /// Directory to be used to store temporary data.
    tmp_dir: Option<Box<Path>>,
}

impl ExternalSorterBuilder {
    /// Creates an instance of a builder with the given fan-in factor.
    pub fn new(fan_in: usize) -> Self {
        ExternalSorterBuilder { fan_in, tmp_dir: None }
    }

    /// Sets directory to be used to store temporary data.
    pub fn with_tmp_dir(mut self, path: &Path) -> ExternalSorterBuilder {
        self.tmp_dir = Some(path.into());
        self
    }

    /// Builds an [`ExternalSorter`] instance using provided configuration.
    pub fn build(self) -> Result<ExternalSorter, SortError> {
        ExternalSorter::new(self.fan_in, self.tmp_dir.as_deref())
    }
}

/// External sorter.
/// Sorts an arbitrarily large stream of integer records using bounded working
/// memory: replacement selection turns the input into initial sorted runs,
/// which are then merged `fan_in` at a time until a single run remains. At most
/// O(`fan_in`) records are resident in memory at any point in either phase.
pub struct ExternalSorter {
    /// Fan-in factor.
    fan_in: usize,
    /// Directory holding the run stores; removed when the sorter is dropped.
    tmp_dir: tempfile::TempDir,
}

impl ExternalSorter {
    /// Creates a new external sorter instance.
    ///
    /// # Arguments
    /// * `fan_in` - Fan-in factor, must be at least 2.
    /// * `tmp_path` - Directory to be used to store temporary data. If the parameter is [`None`]
    ///   the default OS temporary directory will be used.
    pub fn new(fan_in: usize, tmp_path: Option<&Path>) -> Result<Self, SortError> {
        if fan_in < 2 {
            return Err(SortError::InvalidFanIn(fan_in));
        }

        Ok(ExternalSorter {
            fan_in,
            tmp_dir: Self::init_tmp_directory(tmp_path)?,
        })
    }

    fn init_tmp_directory(tmp_path: Option<&Path>) -> Result<tempfile::TempDir, SortError> {
        let tmp_dir = if let Some(tmp_path) = tmp_path {
            tempfile::tempdir_in(tmp_path)
        } else {
            tempfile::tempdir()
        }
        .map_err(SortError::TempDir)?;

        log::info!("using {} as a temporary directory", tmp_dir.path().display());

        Ok(tmp_dir)
    }

    /// Sorts records from the input stream into a file at `output`, written
    /// one record per line in non-decreasing order.
    /// Returns the sort statistics on success.
    ///
    /// # Arguments
    /// * `input` - Input stream records are fetched from
    /// * `output` - Path the fully sorted store is relocated to
    pub fn sort<I>(&self, input: I, output: &Path) -> Result<SortReport, SortError>
    where
        I: IntoIterator<Item = io::Result<i64>>,
    {
        let generator = RunGenerator::new(self.fan_in);
        let batch = generator.generate(input, self.tmp_dir.path())?;

        if batch.runs.is_empty() {
            return Err(SortError::NoRuns);
        }
        let initial_runs = batch.runs.len();

        let merger = RunMerger::new(self.fan_in);
        let merge_passes = merger.merge(batch.runs, self.tmp_dir.path(), output)?;

        log::info!(
            "external sort done ({} records, {} runs, {} passes)",
            batch.records,
            initial_runs,
            merge_passes
        );

        Ok(SortReport {
            records: batch.records,
            fan_in: self.fan_in,
            initial_runs,
            merge_passes,
        })
    }
}
