//! One logical cursor over an ordered list of containers.

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::cursor::StreamCursor;
use crate::error::Result;
use crate::record::{Document, Writable};
use crate::source::RecordSource;

/// Concatenates the [`StreamCursor`]s of several paths, in order.
///
/// Every file is opened at the same `start` record, so offsets are
/// file-relative. Files are opened lazily, one at a time: a file is only opened
/// once the previous one is exhausted, and its handle is released before the
/// next open.
///
/// With `limit = Some(n)` at most `n` pairs are yielded in total; once the
/// n-th pair is out no further record is pulled and no further file is opened.
///
/// The first failure (open or pull) is yielded and ends the whole sequence;
/// the remaining files are not tried.
pub struct MultiFileCursor {
    source: Arc<dyn RecordSource>,
    pending: VecDeque<PathBuf>,
    current: Option<StreamCursor>,
    start: u64,
    limit: Option<usize>,
    emitted: usize,
    done: bool,
}

impl MultiFileCursor {
    pub fn new<I, P>(source: Arc<dyn RecordSource>, paths: I, start: u64, limit: Option<usize>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            source,
            pending: paths.into_iter().map(Into::into).collect(),
            current: None,
            start,
            limit,
            emitted: 0,
            done: false,
        }
    }

    /// Pairs yielded so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Paths not opened yet.
    pub fn pending_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.pending.iter()
    }

    /// Release the open file, if any, and end the sequence.
    pub fn close(&mut self) {
        if let Some(mut cursor) = self.current.take() {
            cursor.close();
        }
        self.pending.clear();
        self.done = true;
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.emitted >= limit)
    }
}

impl Iterator for MultiFileCursor {
    type Item = Result<(Writable, Document)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if self.limit_reached() {
                debug!(emitted = self.emitted, "record limit reached");
                self.close();
                return None;
            }

            if self.current.is_none() {
                let Some(path) = self.pending.pop_front() else {
                    self.done = true;
                    return None;
                };
                match StreamCursor::open(self.source.as_ref(), &path, self.start) {
                    Ok(cursor) => {
                        debug!(path = %path.display(), remaining = self.pending.len(), "advancing to next file");
                        self.current = Some(cursor);
                    }
                    Err(e) => {
                        self.close();
                        return Some(Err(e));
                    }
                }
            }

            let cursor = self.current.as_mut()?;
            match cursor.next() {
                Some(Ok(pair)) => {
                    self.emitted += 1;
                    return Some(Ok(pair));
                }
                Some(Err(e)) => {
                    self.close();
                    return Some(Err(e));
                }
                None => self.current = None,
            }
        }
    }
}

impl FusedIterator for MultiFileCursor {}
