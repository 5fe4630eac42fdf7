//! Native Hadoop SequenceFile backend.
//!
//! Supports header versions 4-6 with uncompressed, record-compressed and
//! block-compressed layouts. Codecs are resolved by class name through
//! [`crate::io::compression`]; keys and values are decoded by [`writable`],
//! with the Nutch crawl-database classes in [`nutch`].

pub mod header;
pub mod nutch;
pub mod reader;
pub mod vint;
pub mod writable;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::config::ReaderConfig;
use crate::error::{ReaderError, Result};
use crate::source::{RecordIterator, RecordSource};

pub use header::{CompressionMode, Header};
pub use reader::SequenceFileReader;

/// [`RecordSource`] reading SequenceFiles from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct SequenceFileSource {
    config: ReaderConfig,
}

impl SequenceFileSource {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Open `path` and parse its header without positioning.
    ///
    /// # Errors
    /// `NotFound` if the file cannot be opened, `Format`/`Unsupported` for a
    /// bad header.
    pub fn open_reader(&self, path: &Path) -> Result<SequenceFileReader<BufReader<File>>> {
        let file = File::open(path).map_err(|e| ReaderError::from_open(e, path))?;
        let input = BufReader::with_capacity(self.config.buffer_size, file);
        SequenceFileReader::new(input, path, self.config.clone())
    }
}

impl RecordSource for SequenceFileSource {
    fn name(&self) -> &str {
        "sequencefile"
    }

    fn open(&self, path: &Path, start: u64) -> Result<Box<dyn RecordIterator>> {
        let mut reader = self.open_reader(path)?;
        reader.skip_records(start)?;
        Ok(Box::new(reader))
    }

    fn count(&self, path: &Path) -> Result<u64> {
        let mut reader = self.open_reader(path)?;
        let mut n = 0u64;
        while reader.skip_record()? {
            n += 1;
        }
        reader.close();
        Ok(n)
    }
}
