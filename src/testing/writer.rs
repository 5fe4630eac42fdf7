//! A minimal SequenceFile writer for building test containers.
//!
//! It produces the same framing Hadoop's `SequenceFile.Writer` does (sync
//! markers, record and block compression) so tests exercise the real reader.

use anyhow::{Context, Result, anyhow};
use byteorder::{BigEndian, WriteBytesExt};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use crate::io::compression::{CompressionCodec, codec_for_class};
use crate::io::seqfile::header::{CompressionMode, Header, SYNC_ESCAPE, SYNC_SIZE};
use crate::io::seqfile::vint::write_vint;
use crate::io::seqfile::writable::{class_of, encode_writable};
use crate::record::Writable;

/// Options for [`SequenceFileWriter`].
#[derive(Clone, Debug)]
pub struct WriterOptions {
    pub compression: CompressionMode,
    /// Codec class; `None` means `DefaultCodec` when compressing.
    pub codec_class: Option<String>,
    /// Records buffered per block in block mode.
    pub block_records: usize,
    /// Records between sync markers in record mode.
    pub sync_interval: usize,
    pub metadata: BTreeMap<String, String>,
    pub sync: [u8; SYNC_SIZE],
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            compression: CompressionMode::None,
            codec_class: None,
            block_records: 100,
            sync_interval: 100,
            metadata: BTreeMap::new(),
            sync: *b"seqreader-sync!!",
        }
    }
}

impl WriterOptions {
    pub fn record_compressed(codec_class: &str) -> Self {
        Self {
            compression: CompressionMode::Record,
            codec_class: Some(codec_class.to_string()),
            ..Default::default()
        }
    }

    pub fn block_compressed(codec_class: &str, block_records: usize) -> Self {
        Self {
            compression: CompressionMode::Block,
            codec_class: Some(codec_class.to_string()),
            block_records: block_records.max(1),
            ..Default::default()
        }
    }

    pub fn sync_interval(mut self, records: usize) -> Self {
        self.sync_interval = records.max(1);
        self
    }
}

pub struct SequenceFileWriter<W: Write> {
    out: W,
    header: Header,
    codec: Option<Arc<dyn CompressionCodec>>,
    options: WriterOptions,
    block: Vec<(Vec<u8>, Vec<u8>)>,
    since_sync: usize,
}

impl<W: Write> SequenceFileWriter<W> {
    /// Write the header and return a writer ready for `append`.
    ///
    /// # Errors
    /// Returns an error if the codec is not registered or the header cannot be written.
    pub fn new(mut out: W, key_class: &str, value_class: &str, options: WriterOptions) -> Result<Self> {
        let codec_class = match options.compression {
            CompressionMode::None => None,
            _ => Some(
                options
                    .codec_class
                    .clone()
                    .unwrap_or_else(|| crate::io::seqfile::header::DEFAULT_CODEC.to_string()),
            ),
        };
        let codec = match &codec_class {
            None => None,
            Some(class) => Some(codec_for_class(class).ok_or_else(|| anyhow!("no codec for {class}"))?),
        };
        let header = Header {
            version: 6,
            key_class: key_class.to_string(),
            value_class: value_class.to_string(),
            compression: options.compression,
            codec_class,
            metadata: options.metadata.clone(),
            sync: options.sync,
        };
        header.write(&mut out).context("write header")?;
        Ok(Self {
            out,
            header,
            codec,
            options,
            block: Vec::new(),
            since_sync: 0,
        })
    }

    /// Append one record. Key and value must match the header classes.
    ///
    /// # Errors
    /// Returns an error on a class mismatch or a failed write.
    pub fn append(&mut self, key: &Writable, value: &Writable) -> Result<()> {
        if class_of(key) != self.header.key_class || class_of(value) != self.header.value_class {
            return Err(anyhow!(
                "record ({}, {}) does not match ({}, {})",
                class_of(key),
                class_of(value),
                self.header.key_class,
                self.header.value_class
            ));
        }
        let key = encode_writable(key)?;
        let value = encode_writable(value)?;
        match self.header.compression {
            CompressionMode::Block => {
                self.block.push((key, value));
                if self.block.len() >= self.options.block_records {
                    self.flush_block()?;
                }
                Ok(())
            }
            CompressionMode::Record => {
                let value = self.compress(&value)?;
                self.write_record(&key, &value)
            }
            CompressionMode::None => self.write_record(&key, &value),
        }
    }

    /// Flush pending data and hand back the underlying writer.
    ///
    /// # Errors
    /// Returns an error if the final block or flush fails.
    pub fn finish(mut self) -> Result<W> {
        if !self.block.is_empty() {
            self.flush_block()?;
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match &self.codec {
            Some(codec) => codec
                .compress(data)
                .with_context(|| format!("compress with {}", codec.name())),
            None => Ok(data.to_vec()),
        }
    }

    fn write_sync(&mut self) -> Result<()> {
        self.out.write_i32::<BigEndian>(SYNC_ESCAPE)?;
        self.out.write_all(&self.header.sync)?;
        Ok(())
    }

    fn write_record(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if self.since_sync >= self.options.sync_interval {
            self.write_sync()?;
            self.since_sync = 0;
        }
        self.out.write_i32::<BigEndian>((key.len() + value.len()) as i32)?;
        self.out.write_i32::<BigEndian>(key.len() as i32)?;
        self.out.write_all(key)?;
        self.out.write_all(value)?;
        self.since_sync += 1;
        Ok(())
    }

    fn flush_block(&mut self) -> Result<()> {
        let block = std::mem::take(&mut self.block);
        let mut key_lens = Vec::new();
        let mut keys = Vec::new();
        let mut value_lens = Vec::new();
        let mut values = Vec::new();
        for (k, v) in &block {
            write_vint(&mut key_lens, k.len() as i32)?;
            keys.extend_from_slice(k);
            write_vint(&mut value_lens, v.len() as i32)?;
            values.extend_from_slice(v);
        }
        self.write_sync()?;
        write_vint(&mut self.out, block.len() as i32)?;
        for buf in [key_lens, keys, value_lens, values] {
            let compressed = self.compress(&buf)?;
            write_vint(&mut self.out, compressed.len() as i32)?;
            self.out.write_all(&compressed)?;
        }
        Ok(())
    }
}
