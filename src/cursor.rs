//! Single-file cursors.
//!
//! [`RawCursor`] turns a [`RecordIterator`] into a standard [`Iterator`] of raw
//! records; [`StreamCursor`] decodes each of them into a `(key, Document)` pair.
//! Both are lazy, forward-only and single-pass: every `next` pulls exactly one
//! record from the source and nothing is cached.
//!
//! The source handle is released exactly once, on whichever comes first:
//! exhaustion, the first error, an explicit [`close`](RawCursor::close), or drop.
//! After that the cursor only yields `None`.

use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::decode::decode;
use crate::error::Result;
use crate::record::{Document, RawRecord, StreamPosition, Writable};
use crate::source::{RecordIterator, RecordSource};

/// Lazy sequence of undecoded records from one container.
pub struct RawCursor {
    iter: Option<Box<dyn RecordIterator>>,
    path: PathBuf,
    last_position: StreamPosition,
}

impl RawCursor {
    /// Open `path` on `source`, positioned at record `start`.
    ///
    /// # Errors
    /// Whatever the source reports on open (`NotFound`, `Format`, `OutOfRange`).
    pub fn open(source: &dyn RecordSource, path: impl AsRef<Path>, start: u64) -> Result<Self> {
        let path = path.as_ref();
        let iter = source.open(path, start).map_err(|e| e.or_path(path))?;
        debug!(backend = source.name(), path = %path.display(), start, "opened cursor");
        Ok(Self::new(iter, path))
    }

    /// Wrap an already positioned iterator.
    pub fn new(iter: Box<dyn RecordIterator>, path: impl AsRef<Path>) -> Self {
        let last_position = iter.position();
        Self {
            iter: Some(iter),
            path: path.as_ref().to_path_buf(),
            last_position,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the underlying handle is still held.
    pub fn is_open(&self) -> bool {
        self.iter.is_some()
    }

    /// Position of the next record, or the final position once released.
    pub fn position(&self) -> StreamPosition {
        match &self.iter {
            Some(iter) => iter.position(),
            None => self.last_position.clone(),
        }
    }

    /// Release the source handle. Further calls are no-ops.
    pub fn close(&mut self) {
        if let Some(mut iter) = self.iter.take() {
            self.last_position = iter.position();
            iter.close();
            debug!(
                path = %self.path.display(),
                record = self.last_position.record,
                "released cursor"
            );
        }
    }

    fn pull(&mut self) -> Option<Result<RawRecord>> {
        let iter = self.iter.as_mut()?;
        let step = match iter.has_next() {
            Ok(true) => iter.next_record().map(Some),
            Ok(false) => Ok(None),
            Err(e) => Err(e),
        };
        match step {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.close();
                None
            }
            Err(e) => {
                self.close();
                Some(Err(e.or_path(&self.path)))
            }
        }
    }
}

impl Iterator for RawCursor {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pull()
    }
}

impl FusedIterator for RawCursor {}

impl Drop for RawCursor {
    fn drop(&mut self) {
        self.close();
    }
}

/// Lazy sequence of decoded `(key, Document)` pairs from one container.
///
/// A decode failure (`MalformedRecord`) is yielded once and ends the cursor.
pub struct StreamCursor {
    raw: RawCursor,
}

impl StreamCursor {
    /// Open `path` on `source`, positioned at record `start`.
    ///
    /// # Errors
    /// Whatever the source reports on open.
    pub fn open(source: &dyn RecordSource, path: impl AsRef<Path>, start: u64) -> Result<Self> {
        Ok(Self {
            raw: RawCursor::open(source, path, start)?,
        })
    }

    pub fn path(&self) -> &Path {
        self.raw.path()
    }

    pub fn is_open(&self) -> bool {
        self.raw.is_open()
    }

    pub fn position(&self) -> StreamPosition {
        self.raw.position()
    }

    pub fn close(&mut self) {
        self.raw.close();
    }
}

impl Iterator for StreamCursor {
    type Item = Result<(Writable, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.raw.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };
        match decode(record) {
            Ok(pair) => Some(Ok(pair)),
            Err(e) => {
                self.raw.close();
                Some(Err(e.or_path(self.raw.path())))
            }
        }
    }
}

impl FusedIterator for StreamCursor {}
