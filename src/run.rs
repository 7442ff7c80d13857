//! Run storage.
//!
//! A run is a sorted sequence of records materialized as a sequential store
//! on the file system. Every store has exactly one writer during its creation
//! and, once closed, is read back at most once by the following merge pass,
//! so no store is ever read while still being written.

use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

/// Write handle for a run store under construction.
/// Records must be pushed in non-decreasing order; the writer does not check.
pub struct RunWriter {
    writer: io::BufWriter<fs::File>,
    path: PathBuf,
}

impl RunWriter {
    /// Creates a new store at `path`, truncating any previous file.
    pub fn create(path: PathBuf) -> io::Result<Self> {
        let file = fs::File::create(&path)?;
        Ok(RunWriter {
            writer: io::BufWriter::new(file),
            path,
        })
    }

    /// Appends a record to the store, one text line per record.
    pub fn push(&mut self, record: i64) -> io::Result<()> {
        writeln!(self.writer, "{}", record)
    }

    /// Flushes and closes the store, returning an immutable handle to it.
    pub fn finish(mut self) -> io::Result<Run> {
        self.writer.flush()?;
        Ok(Run { path: self.path })
    }
}

/// Handle to a closed, immutable run store.
pub struct Run {
    path: PathBuf,
}

impl Run {
    /// Opens the store for reading.
    pub fn open(&self) -> io::Result<RunReader> {
        let file = fs::File::open(&self.path)?;
        Ok(RunReader {
            lines: io::BufReader::new(file).lines(),
        })
    }

    /// Deletes the store's backing file, consuming the handle.
    pub fn remove(self) -> io::Result<()> {
        fs::remove_file(&self.path)
    }

    /// Relocates the store to `dest`, creating or overwriting it.
    /// Falls back to copy-and-delete when `dest` is on another file system.
    pub fn persist(self, dest: &Path) -> io::Result<()> {
        match fs::rename(&self.path, dest) {
            Ok(()) => Ok(()),
            Err(_) => {
                fs::copy(&self.path, dest)?;
                fs::remove_file(&self.path)
            }
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Iterator over the records of a run store, in write order.
pub struct RunReader {
    lines: io::Lines<io::BufReader<fs::File>>,
}

impl Iterator for RunReader {
    type Item = io::Result<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(err) => return Some(Err(err)),
        };

        match line.trim().parse() {
            Ok(record) => Some(Ok(record)),
            Err(err) => Some(Err(io::Error::new(io::ErrorKind::InvalidData, err))),
        }
    }
}
