//! Testing utilities for SequenceFile readers.
//!
//! This module provides what the crate's own tests use, and what downstream
//! users need to test code built on the readers:
//!
//! - **Fixture writer**: [`SequenceFileWriter`] produces real SequenceFiles,
//!   uncompressed, record-compressed or block-compressed
//! - **Temporary files**: [`mock_sequence_file`] and friends write containers
//!   to paths that are removed on drop
//! - **Fake backend**: [`FakeRecordSource`] serves records from memory and logs
//!   every open and close
//! - **Fixtures**: sample link, node and crawl records
//! - **Assertions**: key sequences, error kinds and handle release
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use seqreader::readers::{BackendRegistry, SequenceReader};
//! use seqreader::testing::*;
//! use seqreader::ReaderConfig;
//!
//! let fake = FakeRecordSource::new();
//! fake.insert_text_file("part-0", &[("http://a/", "Status: 1"), ("http://b/", "Status: 2")]);
//!
//! let registry = BackendRegistry::with_source(ReaderConfig::default(), Arc::new(fake.clone()));
//! let records = SequenceReader::new(&registry).head(1, "part-0").unwrap();
//!
//! assert_keys(&records, &["http://a/"]);
//! assert_all_released(&fake);
//! ```
//!
//! # Tracing
//!
//! [`init_tracing`] installs a test writer subscriber filtered by `RUST_LOG`,
//! so reader events show up in `cargo test -- --nocapture` output.

pub mod assertions;
pub mod fake_source;
pub mod fixtures;
pub mod mock_io;
pub mod writer;

pub use assertions::*;
pub use fake_source::{FakeRecordSource, SourceEvent};
pub use fixtures::*;
pub use mock_io::*;
pub use writer::{SequenceFileWriter, WriterOptions};

/// Install a global `tracing` subscriber for tests. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
