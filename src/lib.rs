//! # seqreader
//!
//! Streaming readers for Hadoop **SequenceFile** containers and the crawl
//! databases Apache Nutch stores in them (CrawlDB, WebGraph links and nodes).
//!
//! Records are `(key, value)` pairs whose value text is a list of
//! `field: value` lines. Nutch's binary `CrawlDatum`, `LinkDatum` and `Node`
//! values are decoded natively and rendered in that same layout. The crate
//! decodes records into a key plus a [`Document`], or projects them onto a
//! fixed [`Schema`] as a [`Tuple`].
//!
//! ## Key Features
//!
//! - **Lazy cursors** - [`RawCursor`] and [`StreamCursor`] pull one record at a
//!   time and release the file handle on exhaustion, error, close or drop
//! - **Multi-file reads** - [`MultiFileCursor`] chains part files, opens each
//!   only when it is reached and stops after a global limit
//! - **Bulk helpers** - read-all, head, slice and count over single files
//! - **Graph readers** - link and node readers with typed tuple output
//! - **Compression** - record- and block-compressed files via pluggable codecs
//!   (zlib, gzip, bzip2 and zstd behind feature flags)
//! - **Test support** - a fixture writer and an in-memory fake backend in
//!   [`testing`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use seqreader::readers::{link_reader, sequence_reader};
//!
//! # fn main() -> seqreader::Result<()> {
//! let crawl = sequence_reader();
//! println!("{} records", crawl.count("crawldb/current/part-00000/data")?);
//! for record in crawl.head(3, "crawldb/current/part-00000/data")? {
//!     println!("{} -> {:?}", record.key, record.document.get("Status"));
//! }
//!
//! let links = link_reader();
//! println!("schema: {}", links.schema());
//! for tuple in links.slice(10, 20, "webgraph/outlinks/current/part-00000/data")? {
//!     println!("{:?}", tuple.values());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Streaming Many Files
//!
//! ```no_run
//! use seqreader::io::glob::expand_paths;
//! use seqreader::readers::sequence_reader;
//!
//! # fn main() -> anyhow::Result<()> {
//! let parts = expand_paths(&["crawldb/current/part-*/data"])?;
//! for item in sequence_reader().read_all(parts, 0, Some(1_000)) {
//!     let (key, doc) = item?;
//!     println!("{key}: {}", doc.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Layers
//!
//! - [`source`] - the backend contract ([`RecordSource`], [`RecordIterator`])
//! - [`io::seqfile`] - the SequenceFile backend
//! - [`cursor`] and [`multi`] - lazy iteration
//! - [`bulk`] - eager operations and conversion strategies
//! - [`readers`] - reader variants and the [`BackendRegistry`]
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (`debug` on open and release, `trace`
//! per block, `warn` on sync mismatches). Install any subscriber to see them.

pub mod bulk;
pub mod config;
pub mod cursor;
pub mod decode;
pub mod error;
pub mod io;
pub mod multi;
pub mod readers;
pub mod record;
pub mod schema;
pub mod source;
pub mod testing;

pub use bulk::{BulkReader, Conversion, MapConversion, TupleConversion};
pub use config::ReaderConfig;
pub use cursor::{RawCursor, StreamCursor};
pub use decode::{decode, parse_document};
pub use error::{ErrorKind, ReaderError, Result};
pub use io::seqfile::nutch::{CrawlDatum, LinkDatum, NodeDatum};
pub use multi::MultiFileCursor;
pub use readers::{
    BackendRegistry, GraphReader, ReaderKind, SequenceReader, link_reader, node_reader,
    sequence_reader,
};
pub use record::{Document, RawRecord, Record, StreamPosition, Writable};
pub use schema::{
    Field, FieldType, FieldValue, LINK_SCHEMA, NODE_SCHEMA, SEQUENCE_SCHEMA, Schema, Tuple,
};
pub use source::{RecordIterator, RecordSource};
