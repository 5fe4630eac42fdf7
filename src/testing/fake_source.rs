//! In-memory [`RecordSource`] for testing.
//!
//! Files live in a shared map keyed by path, so no filesystem is needed. Every
//! `open` and every `close` is appended to an event log, which lets tests
//! assert which containers were touched and that each handle was released.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{ErrorKind, ReaderError, Result};
use crate::record::{RawRecord, StreamPosition};
use crate::source::{RecordIterator, RecordSource};

type FileStorage = Arc<Mutex<HashMap<PathBuf, FakeFile>>>;
type EventLog = Arc<Mutex<Vec<SourceEvent>>>;

/// One entry of the fake's open/close log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    Open { path: PathBuf, start: u64 },
    Close { path: PathBuf },
}

#[derive(Debug, Clone)]
enum FakeFile {
    Records {
        records: Vec<RawRecord>,
        fail_at: Option<usize>,
    },
    Unreadable,
}

#[derive(Clone, Default)]
pub struct FakeRecordSource {
    files: FileStorage,
    events: EventLog,
}

impl FakeRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(self, path: impl AsRef<Path>, records: Vec<RawRecord>) -> Self {
        self.insert_file(path, records);
        self
    }

    pub fn insert_file(&self, path: impl AsRef<Path>, records: Vec<RawRecord>) {
        lock(&self.files).insert(
            path.as_ref().to_path_buf(),
            FakeFile::Records {
                records,
                fail_at: None,
            },
        );
    }

    /// Store `(key, value)` text pairs as a file.
    pub fn insert_text_file(&self, path: impl AsRef<Path>, records: &[(&str, &str)]) {
        let records = records.iter().map(|(k, v)| RawRecord::pair(*k, *v)).collect();
        self.insert_file(path, records);
    }

    /// A path whose `open` fails with `Format`.
    pub fn insert_unreadable(&self, path: impl AsRef<Path>) {
        lock(&self.files).insert(path.as_ref().to_path_buf(), FakeFile::Unreadable);
    }

    /// Make reading the element at `index` of `path` fail with `Io`.
    pub fn fail_at(&self, path: impl AsRef<Path>, index: usize) {
        if let Some(FakeFile::Records { fail_at, .. }) = lock(&self.files).get_mut(path.as_ref()) {
            *fail_at = Some(index);
        }
    }

    pub fn events(&self) -> Vec<SourceEvent> {
        lock(&self.events).clone()
    }

    /// Paths in the order they were opened.
    pub fn opened_paths(&self) -> Vec<PathBuf> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                SourceEvent::Open { path, .. } => Some(path.clone()),
                SourceEvent::Close { .. } => None,
            })
            .collect()
    }

    /// Opens minus closes.
    pub fn open_handles(&self) -> usize {
        lock(&self.events).iter().fold(0usize, |n, e| match e {
            SourceEvent::Open { .. } => n + 1,
            SourceEvent::Close { .. } => n.saturating_sub(1),
        })
    }

    fn record(&self, event: SourceEvent) {
        lock(&self.events).push(event);
    }
}

impl RecordSource for FakeRecordSource {
    fn name(&self) -> &str {
        "fake"
    }

    fn open(&self, path: &Path, start: u64) -> Result<Box<dyn RecordIterator>> {
        let file = lock(&self.files)
            .get(path)
            .cloned()
            .ok_or_else(|| ReaderError::not_found(path))?;
        let (records, fail_at) = match file {
            FakeFile::Records { records, fail_at } => (records, fail_at),
            FakeFile::Unreadable => {
                return Err(ReaderError::format("not a record container").with_path(path));
            }
        };
        let start_index = usize::try_from(start).unwrap_or(usize::MAX);
        if start_index > records.len() {
            return Err(ReaderError::new(
                ErrorKind::OutOfRange,
                format!("start {start} beyond {} records", records.len()),
            )
            .with_path(path));
        }
        self.record(SourceEvent::Open {
            path: path.to_path_buf(),
            start,
        });
        Ok(Box::new(FakeIterator {
            path: path.to_path_buf(),
            records,
            index: start_index,
            fail_at,
            events: Arc::clone(&self.events),
            closed: false,
        }))
    }
}

struct FakeIterator {
    path: PathBuf,
    records: Vec<RawRecord>,
    index: usize,
    fail_at: Option<usize>,
    events: EventLog,
    closed: bool,
}

impl RecordIterator for FakeIterator {
    fn has_next(&mut self) -> Result<bool> {
        Ok(!self.closed && self.index < self.records.len())
    }

    fn next_record(&mut self) -> Result<RawRecord> {
        if self.closed || self.index >= self.records.len() {
            return Err(ReaderError::new(ErrorKind::Exhausted, "no more records").with_path(&self.path));
        }
        if self.fail_at == Some(self.index) {
            return Err(ReaderError::new(
                ErrorKind::Io,
                format!("injected failure at record {}", self.index),
            )
            .with_path(&self.path));
        }
        let record = self.records[self.index].clone();
        self.index += 1;
        Ok(record)
    }

    fn position(&self) -> StreamPosition {
        StreamPosition {
            path: self.path.clone(),
            record: self.index as u64,
            byte: 0,
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            lock(&self.events).push(SourceEvent::Close {
                path: self.path.clone(),
            });
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_and_close_are_logged() {
        let fake = FakeRecordSource::new();
        fake.insert_text_file("a", &[("k", "v")]);
        let mut it = fake.open(Path::new("a"), 0).unwrap();
        assert!(it.has_next().unwrap());
        it.close();
        it.close();
        assert_eq!(
            fake.events(),
            vec![
                SourceEvent::Open { path: "a".into(), start: 0 },
                SourceEvent::Close { path: "a".into() },
            ]
        );
        assert_eq!(fake.open_handles(), 0);
    }

    #[test]
    fn failures_on_open() {
        let fake = FakeRecordSource::new();
        fake.insert_text_file("a", &[("k", "v")]);
        fake.insert_unreadable("bad");
        assert_eq!(fake.open(Path::new("missing"), 0).err().unwrap().kind, ErrorKind::NotFound);
        assert_eq!(fake.open(Path::new("bad"), 0).err().unwrap().kind, ErrorKind::Format);
        assert_eq!(fake.open(Path::new("a"), 2).err().unwrap().kind, ErrorKind::OutOfRange);
        assert!(fake.events().is_empty());
    }

    #[test]
    fn injected_failure() {
        let fake = FakeRecordSource::new();
        fake.insert_text_file("a", &[("1", "x"), ("2", "y")]);
        fake.fail_at("a", 1);
        let mut it = fake.open(Path::new("a"), 0).unwrap();
        assert!(it.next_record().is_ok());
        assert_eq!(it.next_record().unwrap_err().kind, ErrorKind::Io);
    }
}
