//! Error type shared by every reader component.
//!
//! Failures are reported synchronously at the point where they happen: on open,
//! on each pull from a cursor, or while decoding a record. Nothing is retried.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

/// Classification of a [`ReaderError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The path does not resolve to a readable container.
    NotFound,
    /// The container header or framing is unreadable.
    Format,
    /// The requested start offset lies beyond the container's extent.
    OutOfRange,
    /// A raw record is not a `(key, value)` pair; carries the actual arity.
    MalformedRecord { arity: usize },
    /// An I/O failure after the container was opened.
    Io,
    /// `next_record` was called on an iterator that reported no more records.
    Exhausted,
    /// The container needs a codec that is unknown or compiled out.
    Unsupported,
}

/// Error returned by sources, cursors and the bulk readers.
#[derive(Debug)]
pub struct ReaderError {
    pub kind: ErrorKind,
    pub message: String,
    pub path: Option<PathBuf>,
    source: Option<Box<dyn Error + Send + Sync>>,
}

pub type Result<T> = std::result::Result<T, ReaderError>;

impl ReaderError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: None,
            source: None,
        }
    }

    pub fn not_found(path: impl AsRef<Path>) -> Self {
        Self::new(ErrorKind::NotFound, "no such container").with_path(path)
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, message)
    }

    pub fn malformed(arity: usize) -> Self {
        Self::new(
            ErrorKind::MalformedRecord { arity },
            format!("expected a [key, value] record, got {arity} element(s)"),
        )
    }

    #[must_use]
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Attach the path only if none is set yet.
    #[must_use]
    pub fn or_path(self, path: impl AsRef<Path>) -> Self {
        if self.path.is_some() {
            self
        } else {
            self.with_path(path)
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Map an I/O error raised while opening `path`.
    pub(crate) fn from_open(err: std::io::Error, path: &Path) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                ErrorKind::NotFound
            }
            _ => ErrorKind::Io,
        };
        Self::new(kind, format!("open failed: {err}"))
            .with_path(path)
            .with_source(err)
    }

    /// Map an I/O error raised while reading framing bytes.
    ///
    /// A short read in the middle of a frame means the container is truncated.
    pub(crate) fn from_read(err: std::io::Error, what: &str) -> Self {
        let kind = if err.kind() == std::io::ErrorKind::UnexpectedEof {
            ErrorKind::Format
        } else {
            ErrorKind::Io
        };
        Self::new(kind, format!("read {what}: {err}")).with_source(err)
    }
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)?;
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl Error for ReaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn Error + 'static))
    }
}
