//! The backing-store contract consumed by the cursors.
//!
//! A [`RecordSource`] knows how a container is laid out on disk (or wherever it
//! lives) and hands out [`RecordIterator`]s yielding [`RawRecord`]s. Nothing
//! above this layer sees byte-level framing.

use std::path::Path;

use crate::error::Result;
use crate::record::{RawRecord, StreamPosition};

/// Pull-based iteration over the raw records of one opened container.
///
/// `has_next` may block on I/O while it fetches the next frame. Calling
/// `next_record` after `has_next` returned `false` fails with `Exhausted`.
pub trait RecordIterator {
    fn has_next(&mut self) -> Result<bool>;

    fn next_record(&mut self) -> Result<RawRecord>;

    /// Position of the next unread record.
    fn position(&self) -> StreamPosition;

    /// Release the underlying handle. Called once by the owning cursor.
    fn close(&mut self) {}
}

/// A backing store able to open containers by path.
pub trait RecordSource: Send + Sync {
    /// Name of the backend, used in log events.
    fn name(&self) -> &str;

    /// Open `path` positioned at record ordinal `start` (0 = beginning).
    ///
    /// # Errors
    /// `NotFound` when the path does not resolve, `Format` when the container
    /// header is unreadable, `OutOfRange` when `start` exceeds the container.
    fn open(&self, path: &Path, start: u64) -> Result<Box<dyn RecordIterator>>;

    /// Number of records in `path`.
    ///
    /// The default drains a raw iterator without decoding any value text.
    fn count(&self, path: &Path) -> Result<u64> {
        let mut iter = self.open(path, 0)?;
        let mut n = 0u64;
        let outcome = loop {
            match iter.has_next() {
                Ok(true) => {}
                Ok(false) => break Ok(n),
                Err(e) => break Err(e),
            }
            if let Err(e) = iter.next_record() {
                break Err(e);
            }
            n += 1;
        };
        iter.close();
        outcome
    }
}
