//! Iterative p-way tournament merging.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::error::Error;
use std::path::Path;

use log;

use crate::run::{Run, RunWriter};
use crate::sort::SortError;

/// Tournament merger for a single merge group.
/// Merges multiple sorted inputs into a single sorted output by popping the
/// global minimum among the current heads and refilling from its source.
/// Time complexity is *m* \* log(*n*) in worst case where *m* is the number
/// of records, *n* is the number of sources.
pub struct TournamentMerger<E, C>
where
    E: Error,
    C: IntoIterator<Item = Result<i64, E>>,
{
    // heap entries are (value, source index) pairs ordered by value only;
    // binary heap is max-heap by default so the value is reversed
    items: BinaryHeap<(Reverse<i64>, usize)>,
    sources: Vec<C::IntoIter>,
    // number of sources whose head has been pulled; priming resumes here
    // after an error so no source head is read twice
    primed: usize,
}

impl<E, C> TournamentMerger<E, C>
where
    E: Error,
    C: IntoIterator<Item = Result<i64, E>>,
{
    /// Creates a merger over the given sources.
    /// Source records must be sorted in ascending order otherwise the result
    /// is undefined.
    ///
    /// # Arguments
    /// * `sources` - Sorted inputs to be merged into a single sorted output
    pub fn new<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = C>,
    {
        let sources = Vec::from_iter(sources.into_iter().map(|s| s.into_iter()));
        let items = BinaryHeap::with_capacity(sources.len());

        TournamentMerger {
            items,
            sources,
            primed: 0,
        }
    }
}

impl<E, C> Iterator for TournamentMerger<E, C>
where
    E: Error,
    C: IntoIterator<Item = Result<i64, E>>,
{
    type Item = Result<i64, E>;

    /// Returns the next record from the sources in ascending order.
    /// A source that yields an error contributes no further records; the
    /// remaining sources are unaffected.
    fn next(&mut self) -> Option<Self::Item> {
        while self.primed < self.sources.len() {
            let idx = self.primed;
            self.primed += 1;
            if let Some(record) = self.sources[idx].next() {
                match record {
                    Ok(record) => self.items.push((Reverse(record), idx)),
                    Err(err) => return Some(Err(err)),
                }
            }
        }

        let (Reverse(result), idx) = self.items.pop()?;
        if let Some(record) = self.sources[idx].next() {
            match record {
                Ok(record) => self.items.push((Reverse(record), idx)),
                Err(err) => return Some(Err(err)),
            }
        }

        Some(Ok(result))
    }
}

/// Merge pass driver.
/// Repeatedly merges groups of up to `fan_in` consecutive runs into new runs
/// until a single fully sorted run remains, then relocates it to the output
/// path.
pub struct RunMerger {
    fan_in: usize,
}

impl RunMerger {
    /// Creates a merger with the given fan-in factor.
    pub fn new(fan_in: usize) -> Self {
        RunMerger { fan_in }
    }

    /// Merges `runs` down to a single store at `output`, creating the
    /// intermediate stores under `tmp_dir`. Returns the number of passes
    /// performed; an empty run list performs zero passes and leaves `output`
    /// untouched.
    ///
    /// Unreadable sources within a group are skipped, and a failure to delete
    /// a consumed store is reported but does not abort the pass.
    pub fn merge(&self, runs: Vec<Run>, tmp_dir: &Path, output: &Path) -> Result<u64, SortError> {
        let mut current = runs;
        let mut passes: u64 = 0;

        while current.len() > 1 {
            passes += 1;
            let mut next_pass = Vec::with_capacity((current.len() + self.fan_in - 1) / self.fan_in);

            for (group_idx, group) in current.chunks(self.fan_in).enumerate() {
                let path = tmp_dir.join(format!("temp_pass_{}_{}", passes, group_idx));
                let mut writer = RunWriter::create(path).map_err(SortError::Io)?;

                let mut sources = Vec::with_capacity(group.len());
                for run in group {
                    match run.open() {
                        Ok(reader) => sources.push(reader),
                        // partial-failure tolerant: merge the remaining sources
                        Err(err) => {
                            log::warn!("run store {} not readable, skipped: {}", run.path().display(), err)
                        }
                    }
                }

                for record in TournamentMerger::new(sources) {
                    let record = record.map_err(SortError::Io)?;
                    writer.push(record).map_err(SortError::Io)?;
                }

                next_pass.push(writer.finish().map_err(SortError::Io)?);
            }

            for run in current {
                if let Err(err) = run.remove() {
                    log::warn!("consumed run store not deleted: {}", err);
                }
            }

            log::debug!("merge pass {} done ({} runs remain)", passes, next_pass.len());
            current = next_pass;
        }

        if let Some(run) = current.pop() {
            run.persist(output).map_err(SortError::Io)?;
        }

        Ok(passes)
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::io::{self, ErrorKind};

    use rstest::*;

    use super::{RunMerger, TournamentMerger};
    use crate::run::{Run, RunWriter};

    #[rstest]
    #[case(
        vec![],
        vec![],
    )]
    #[case(
        vec![
            vec![],
            vec![]
        ],
        vec![],
    )]
    #[case(
        vec![
            vec![Ok(4), Ok(5), Ok(7)],
            vec![Ok(1), Ok(6)],
            vec![Ok(3)],
            vec![],
        ],
        vec![Ok(1), Ok(3), Ok(4), Ok(5), Ok(6), Ok(7)],
    )]
    #[case(
        vec![
            vec![Ok(1), Ok(2), Ok(2)],
            vec![Ok(2), Ok(3)],
        ],
        vec![Ok(1), Ok(2), Ok(2), Ok(2), Ok(3)],
    )]
    #[case(
        vec![
            vec![Result::Err(io::Error::new(ErrorKind::Other, "test error"))]
        ],
        vec![
            Result::Err(io::Error::new(ErrorKind::Other, "test error"))
        ],
    )]
    #[case(
        vec![
            vec![Ok(3), Result::Err(io::Error::new(ErrorKind::Other, "test error"))],
            vec![Ok(1), Ok(2)],
        ],
        vec![
            Ok(1),
            Ok(2),
            Result::Err(io::Error::new(ErrorKind::Other, "test error")),
        ],
    )]
    fn test_tournament_merger(
        #[case] sources: Vec<Vec<io::Result<i64>>>,
        #[case] expected_result: Vec<io::Result<i64>>,
    ) {
        let merger = TournamentMerger::new(sources);
        let actual_result = merger.collect();
        assert!(
            compare_vectors_of_result::<_, io::Error>(&actual_result, &expected_result),
            "actual={:?}, expected={:?}",
            actual_result,
            expected_result
        );
    }

    #[rstest]
    fn test_merger_resumes_priming_after_error_without_rereading_heads() {
        let sources = vec![
            vec![Result::Err(io::Error::new(ErrorKind::Other, "test error")), Ok(9)],
            vec![Ok(1), Ok(2)],
        ];

        let mut merger = TournamentMerger::new(sources);
        assert!(merger.next().unwrap().is_err());

        // the failed source is out of the tournament; the others merge once each
        let rest: Vec<i64> = merger.map(Result::unwrap).collect();
        assert_eq!(rest, vec![1, 2]);
    }

    fn compare_vectors_of_result<T: PartialEq, E: Error + 'static>(
        actual: &Vec<Result<T, E>>,
        expected: &Vec<Result<T, E>>,
    ) -> bool {
        actual.len() == expected.len()
            && actual
                .into_iter()
                .zip(expected)
                .all(
                    |(actual_result, expected_result)| match (actual_result, expected_result) {
                        (Ok(actual_result), Ok(expected_result)) if actual_result == expected_result => true,
                        (Err(actual_err), Err(expected_err)) => actual_err.to_string() == expected_err.to_string(),
                        _ => false,
                    },
                )
    }

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn write_run(dir: &tempfile::TempDir, name: &str, records: &[i64]) -> Run {
        let mut writer = RunWriter::create(dir.path().join(name)).unwrap();
        for &record in records {
            writer.push(record).unwrap();
        }
        writer.finish().unwrap()
    }

    fn read_output(path: &std::path::Path) -> Vec<i64> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| line.parse().unwrap())
            .collect()
    }

    #[rstest]
    fn test_merge_single_run_performs_no_pass(tmp_dir: tempfile::TempDir) {
        let runs = vec![write_run(&tmp_dir, "run_0", &[1, 2, 3])];
        let output = tmp_dir.path().join("sorted.txt");

        let passes = RunMerger::new(2).merge(runs, tmp_dir.path(), &output).unwrap();

        assert_eq!(passes, 0);
        assert_eq!(read_output(&output), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_merge_no_runs_performs_no_pass(tmp_dir: tempfile::TempDir) {
        let output = tmp_dir.path().join("sorted.txt");

        let passes = RunMerger::new(2).merge(vec![], tmp_dir.path(), &output).unwrap();

        assert_eq!(passes, 0);
        assert!(!output.exists());
    }

    #[rstest]
    fn test_merge_three_runs_two_ways(tmp_dir: tempfile::TempDir) {
        let runs = vec![
            write_run(&tmp_dir, "run_0", &[3, 5, 8, 9]),
            write_run(&tmp_dir, "run_1", &[1, 2, 7]),
            write_run(&tmp_dir, "run_2", &[0, 4, 6]),
        ];
        let output = tmp_dir.path().join("sorted.txt");

        let passes = RunMerger::new(2).merge(runs, tmp_dir.path(), &output).unwrap();

        assert_eq!(passes, 2);
        assert_eq!(read_output(&output), Vec::from_iter(0..10));
    }

    #[rstest]
    fn test_consumed_stores_are_deleted(tmp_dir: tempfile::TempDir) {
        let runs = vec![
            write_run(&tmp_dir, "run_0", &[1, 3]),
            write_run(&tmp_dir, "run_1", &[2, 4]),
        ];
        let consumed: Vec<_> = runs.iter().map(|run| run.path().to_path_buf()).collect();
        let output = tmp_dir.path().join("sorted.txt");

        RunMerger::new(2).merge(runs, tmp_dir.path(), &output).unwrap();

        assert!(consumed.iter().all(|path| !path.exists()));
    }

    #[rstest]
    fn test_missing_source_is_skipped(tmp_dir: tempfile::TempDir) {
        let runs = vec![
            write_run(&tmp_dir, "run_0", &[1, 3]),
            write_run(&tmp_dir, "run_1", &[2, 4]),
        ];
        std::fs::remove_file(runs[0].path()).unwrap();
        let output = tmp_dir.path().join("sorted.txt");

        let passes = RunMerger::new(2).merge(runs, tmp_dir.path(), &output).unwrap();

        assert_eq!(passes, 1);
        assert_eq!(read_output(&output), vec![2, 4]);
    }
}
