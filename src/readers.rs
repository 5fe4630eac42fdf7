//! Reader variants and the registry that binds them to backends.
//!
//! Three readers are exposed, one per [`ReaderKind`]:
//! - [`SequenceReader`] for arbitrary `field: value` records, with the
//!   streaming surface (`read_iterator`, `read_raw_iterator`, `read_all`);
//! - a link-graph [`GraphReader`] producing [`LINK_SCHEMA`] tuples;
//! - a node-graph [`GraphReader`] producing [`NODE_SCHEMA`] tuples.
//!
//! Each reader takes its backend from a [`BackendRegistry`] when it is built.
//!
//! ```no_run
//! use seqreader::readers::{BackendRegistry, SequenceReader};
//!
//! let reader = SequenceReader::new(&BackendRegistry::default());
//! for item in reader.read_all(["part-00000", "part-00001"], 0, Some(100)) {
//!     let (key, doc) = item?;
//!     println!("{key}: {:?}", doc.get("Status"));
//! }
//! # Ok::<(), seqreader::ReaderError>(())
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bulk::{BulkReader, MapConversion, TupleConversion};
use crate::config::ReaderConfig;
use crate::cursor::{RawCursor, StreamCursor};
use crate::error::Result;
use crate::io::seqfile::SequenceFileSource;
use crate::multi::MultiFileCursor;
use crate::record::Record;
use crate::schema::{LINK_SCHEMA, NODE_SCHEMA, SEQUENCE_SCHEMA, Schema, Tuple};
use crate::source::RecordSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReaderKind {
    Sequence,
    Link,
    Node,
}

impl ReaderKind {
    pub const ALL: [ReaderKind; 3] = [ReaderKind::Sequence, ReaderKind::Link, ReaderKind::Node];

    pub fn schema(self) -> &'static Schema {
        match self {
            ReaderKind::Sequence => &SEQUENCE_SCHEMA,
            ReaderKind::Link => &LINK_SCHEMA,
            ReaderKind::Node => &NODE_SCHEMA,
        }
    }
}

/// Maps each [`ReaderKind`] to the [`RecordSource`] its reader uses.
#[derive(Clone)]
pub struct BackendRegistry {
    config: ReaderConfig,
    backends: HashMap<ReaderKind, Arc<dyn RecordSource>>,
}

impl BackendRegistry {
    /// Bind every kind to a [`SequenceFileSource`] built from `config`.
    pub fn new(config: ReaderConfig) -> Self {
        let source: Arc<dyn RecordSource> = Arc::new(SequenceFileSource::new(config.clone()));
        Self::with_source(config, source)
    }

    /// Bind every kind to `source`.
    pub fn with_source(config: ReaderConfig, source: Arc<dyn RecordSource>) -> Self {
        let backends = ReaderKind::ALL
            .into_iter()
            .map(|kind| (kind, Arc::clone(&source)))
            .collect();
        Self { config, backends }
    }

    /// Rebind one kind.
    #[must_use]
    pub fn bind(mut self, kind: ReaderKind, source: Arc<dyn RecordSource>) -> Self {
        self.backends.insert(kind, source);
        self
    }

    pub fn source(&self, kind: ReaderKind) -> Arc<dyn RecordSource> {
        match self.backends.get(&kind) {
            Some(source) => Arc::clone(source),
            None => Arc::new(SequenceFileSource::new(self.config.clone())),
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new(ReaderConfig::default())
    }
}

/// Generic key → document reader.
pub struct SequenceReader {
    bulk: BulkReader<MapConversion>,
    default_head_rows: usize,
}

impl SequenceReader {
    pub fn new(registry: &BackendRegistry) -> Self {
        Self {
            bulk: BulkReader::new(registry.source(ReaderKind::Sequence), MapConversion),
            default_head_rows: registry.config().default_head_rows,
        }
    }

    pub fn schema(&self) -> &'static Schema {
        ReaderKind::Sequence.schema()
    }

    /// Whole file, eagerly.
    ///
    /// # Errors
    /// Any open, read or decode failure.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Vec<Record>> {
        self.bulk.read_all(path)
    }

    /// # Errors
    /// Any open, read or decode failure.
    pub fn head(&self, n: usize, path: impl AsRef<Path>) -> Result<Vec<Record>> {
        self.bulk.head(n, path)
    }

    /// `head` with the configured default row count.
    ///
    /// # Errors
    /// Any open, read or decode failure.
    pub fn head_default(&self, path: impl AsRef<Path>) -> Result<Vec<Record>> {
        self.bulk.head(self.default_head_rows, path)
    }

    /// # Errors
    /// Any open, read or decode failure.
    pub fn slice(&self, start: usize, stop: usize, path: impl AsRef<Path>) -> Result<Vec<Record>> {
        self.bulk.slice(start, stop, path)
    }

    /// # Errors
    /// Any open or read failure.
    pub fn count(&self, path: impl AsRef<Path>) -> Result<u64> {
        self.bulk.count(path)
    }

    /// Lazily read every path in order, each from record `start`, stopping
    /// after `limit` pairs in total.
    pub fn read_all<I, P>(&self, paths: I, start: u64, limit: Option<usize>) -> MultiFileCursor
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        MultiFileCursor::new(Arc::clone(self.bulk.source()), paths, start, limit)
    }

    /// Lazily decode `path` from record `start`.
    ///
    /// # Errors
    /// Whatever the backend reports on open.
    pub fn read_iterator(&self, path: impl AsRef<Path>, start: u64) -> Result<StreamCursor> {
        StreamCursor::open(self.bulk.source().as_ref(), path, start)
    }

    /// Lazily stream undecoded records of `path` from record `start`.
    ///
    /// # Errors
    /// Whatever the backend reports on open.
    pub fn read_raw_iterator(&self, path: impl AsRef<Path>, start: u64) -> Result<RawCursor> {
        RawCursor::open(self.bulk.source().as_ref(), path, start)
    }
}

/// Link- or node-graph reader producing schema-ordered tuples.
pub struct GraphReader {
    kind: ReaderKind,
    bulk: BulkReader<TupleConversion>,
    default_head_rows: usize,
}

impl GraphReader {
    /// Reader for WebGraph link outputs (`LinkDatum` values, [`LINK_SCHEMA`]).
    pub fn links(registry: &BackendRegistry) -> Self {
        Self::for_kind(ReaderKind::Link, registry)
    }

    /// Reader for WebGraph node outputs (`Node` values, [`NODE_SCHEMA`]).
    pub fn nodes(registry: &BackendRegistry) -> Self {
        Self::for_kind(ReaderKind::Node, registry)
    }

    fn for_kind(kind: ReaderKind, registry: &BackendRegistry) -> Self {
        Self {
            kind,
            bulk: BulkReader::new(registry.source(kind), TupleConversion::new(kind.schema())),
            default_head_rows: registry.config().default_head_rows,
        }
    }

    pub fn kind(&self) -> ReaderKind {
        self.kind
    }

    pub fn schema(&self) -> &'static Schema {
        self.kind.schema()
    }

    /// # Errors
    /// Any open, read or decode failure.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Vec<Tuple>> {
        self.bulk.read_all(path)
    }

    /// # Errors
    /// Any open, read or decode failure.
    pub fn head(&self, n: usize, path: impl AsRef<Path>) -> Result<Vec<Tuple>> {
        self.bulk.head(n, path)
    }

    /// # Errors
    /// Any open, read or decode failure.
    pub fn head_default(&self, path: impl AsRef<Path>) -> Result<Vec<Tuple>> {
        self.bulk.head(self.default_head_rows, path)
    }

    /// # Errors
    /// Any open, read or decode failure.
    pub fn slice(&self, start: usize, stop: usize, path: impl AsRef<Path>) -> Result<Vec<Tuple>> {
        self.bulk.slice(start, stop, path)
    }

    /// # Errors
    /// Any open or read failure.
    pub fn count(&self, path: impl AsRef<Path>) -> Result<u64> {
        self.bulk.count(path)
    }
}

/// [`SequenceReader`] over local SequenceFiles with default settings.
pub fn sequence_reader() -> SequenceReader {
    SequenceReader::new(&BackendRegistry::default())
}

/// Link-graph [`GraphReader`] over local SequenceFiles with default settings.
pub fn link_reader() -> GraphReader {
    GraphReader::links(&BackendRegistry::default())
}

/// Node-graph [`GraphReader`] over local SequenceFiles with default settings.
pub fn node_reader() -> GraphReader {
    GraphReader::nodes(&BackendRegistry::default())
}
