//! Frame-level reader for SequenceFile containers.

use byteorder::{BigEndian, ReadBytesExt};
use std::collections::VecDeque;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::header::{CompressionMode, Header, SYNC_ESCAPE, SYNC_SIZE};
use super::vint::read_vint;
use super::writable::decode_writable;
use crate::config::ReaderConfig;
use crate::error::{ErrorKind, ReaderError, Result};
use crate::io::compression::{CompressionCodec, codec_for_class, decompress};
use crate::record::{RawRecord, StreamPosition};
use crate::source::RecordIterator;

/// Counts bytes pulled from the inner reader.
struct CountingReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.offset += n as u64;
        Ok(n)
    }
}

/// Serialized key and value bytes of one record.
type Frame = (Vec<u8>, Vec<u8>);

/// Streams records out of one SequenceFile.
///
/// Frames are read one at a time; for block-compressed files one decompressed
/// block is held in memory. Key and value bytes are only turned into
/// [`Writable`](crate::record::Writable)s by `next_record`, so skipping and
/// counting never decode payloads.
pub struct SequenceFileReader<R: Read> {
    input: Option<CountingReader<R>>,
    header: Header,
    codec: Option<Arc<dyn CompressionCodec>>,
    config: ReaderConfig,
    path: PathBuf,
    pending: VecDeque<Frame>,
    eof: bool,
    record: u64,
    closed_at: u64,
}

impl<R: Read> SequenceFileReader<R> {
    /// Parse the header from `input` and prepare to stream records.
    ///
    /// `path` is only used in errors and log events.
    ///
    /// # Errors
    /// `Format` for a malformed header, `Unsupported` when the codec named in
    /// the header is not registered.
    pub fn new(input: R, path: impl AsRef<Path>, config: ReaderConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut input = CountingReader { inner: input, offset: 0 };
        let header = Header::read(&mut input, config.max_record_len)
            .map_err(|e| e.or_path(&path))?;
        let codec = match &header.codec_class {
            None => None,
            Some(class) => Some(codec_for_class(class).ok_or_else(|| {
                ReaderError::new(
                    ErrorKind::Unsupported,
                    format!("no codec registered for {class}"),
                )
                .with_path(&path)
            })?),
        };
        debug!(
            path = %path.display(),
            version = header.version,
            key_class = %header.key_class,
            value_class = %header.value_class,
            compression = ?header.compression,
            codec = codec.as_ref().map(|c| c.name()),
            "opened sequence file"
        );
        Ok(Self {
            input: Some(input),
            header,
            codec,
            config,
            path,
            pending: VecDeque::new(),
            eof: false,
            record: 0,
            closed_at: 0,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Skip `n` records without decoding them.
    ///
    /// # Errors
    /// `OutOfRange` if the container holds fewer than `n` records.
    pub fn skip_records(&mut self, n: u64) -> Result<()> {
        for skipped in 0..n {
            if !self.skip_record()? {
                return Err(ReaderError::new(
                    ErrorKind::OutOfRange,
                    format!("start offset {n} exceeds record count {skipped}"),
                )
                .with_path(&self.path));
            }
        }
        Ok(())
    }

    /// Consume one record without decoding it. Returns `false` at end of file.
    pub fn skip_record(&mut self) -> Result<bool> {
        if !self.fill()? {
            return Ok(false);
        }
        self.pending.pop_front();
        self.record += 1;
        Ok(true)
    }

    /// Make sure a frame is buffered. Returns `false` at end of file.
    fn fill(&mut self) -> Result<bool> {
        if !self.pending.is_empty() {
            return Ok(true);
        }
        if self.eof || self.input.is_none() {
            return Ok(false);
        }
        let read = match self.header.compression {
            CompressionMode::Block => self.read_block(),
            _ => self.read_frame().map(|frame| {
                if let Some(frame) = frame {
                    self.pending.push_back(frame);
                }
            }),
        };
        read.map_err(|e| e.or_path(&self.path))?;
        if self.pending.is_empty() {
            self.eof = true;
        }
        Ok(!self.pending.is_empty())
    }

    fn input(&mut self) -> Result<&mut CountingReader<R>> {
        self.input
            .as_mut()
            .ok_or_else(|| ReaderError::new(ErrorKind::Exhausted, "reader closed"))
    }

    /// Read a big-endian `i32`, or `None` on a clean end of file.
    fn read_i32_or_eof(&mut self) -> Result<Option<i32>> {
        let input = self.input()?;
        let mut buf = [0u8; 4];
        let mut filled = 0;
        while filled < buf.len() {
            match input.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(ReaderError::format(format!(
                        "truncated frame length ({filled} of 4 bytes)"
                    )));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(ReaderError::from_read(e, "frame length")),
            }
        }
        Ok(Some(i32::from_be_bytes(buf)))
    }

    fn check_sync(&mut self) -> Result<()> {
        let mut sync = [0u8; SYNC_SIZE];
        self.input()?
            .read_exact(&mut sync)
            .map_err(|e| ReaderError::from_read(e, "sync marker"))?;
        if sync != self.header.sync {
            warn!(path = %self.path.display(), record = self.record, "sync marker mismatch");
            if self.config.verify_sync {
                return Err(ReaderError::format("sync marker does not match header"));
            }
        }
        Ok(())
    }

    fn check_len(&self, len: i64, what: &str) -> Result<usize> {
        match usize::try_from(len) {
            Ok(n) if n <= self.config.max_record_len => Ok(n),
            _ => Err(ReaderError::format(format!("bad {what} length {len}"))),
        }
    }

    fn read_exact_vec(&mut self, len: usize, what: &str) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.input()?
            .read_exact(&mut buf)
            .map_err(|e| ReaderError::from_read(e, what))?;
        Ok(buf)
    }

    fn inflate(&self, data: Vec<u8>, what: &str) -> Result<Vec<u8>> {
        let Some(codec) = &self.codec else {
            return Ok(data);
        };
        decompress(codec.as_ref(), data, self.config.max_record_len)
            .map_err(|e| ReaderError::format(format!("{what}: {e:#}")))
    }

    /// Read one record frame of an uncompressed or record-compressed file.
    fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            let Some(len) = self.read_i32_or_eof()? else {
                return Ok(None);
            };
            if len == SYNC_ESCAPE {
                self.check_sync()?;
                continue;
            }
            let record_len = self.check_len(i64::from(len), "record")?;
            let key_len = self
                .input()?
                .read_i32::<BigEndian>()
                .map_err(|e| ReaderError::from_read(e, "key length"))?;
            let key_len = self.check_len(i64::from(key_len), "key")?;
            if key_len > record_len {
                return Err(ReaderError::format(format!(
                    "key length {key_len} exceeds record length {record_len}"
                )));
            }
            let key = self.read_exact_vec(key_len, "key")?;
            let value = self.read_exact_vec(record_len - key_len, "value")?;
            let value = match self.header.compression {
                CompressionMode::Record => self.inflate(value, "value")?,
                _ => value,
            };
            return Ok(Some((key, value)));
        }
    }

    fn read_buffer(&mut self, what: &str) -> Result<Vec<u8>> {
        let len = read_vint(self.input()?).map_err(|e| ReaderError::from_read(e, what))?;
        let len = self.check_len(i64::from(len), what)?;
        let raw = self.read_exact_vec(len, what)?;
        self.inflate(raw, what)
    }

    /// Read and split one block of a block-compressed file.
    fn read_block(&mut self) -> Result<()> {
        let Some(escape) = self.read_i32_or_eof()? else {
            return Ok(());
        };
        if escape != SYNC_ESCAPE {
            return Err(ReaderError::format(format!(
                "expected sync escape before block, found {escape}"
            )));
        }
        self.check_sync()?;
        let count = read_vint(self.input()?).map_err(|e| ReaderError::from_read(e, "block size"))?;
        let count = self.check_len(i64::from(count), "block record count")?;

        let key_lens = self.read_buffer("key lengths")?;
        let keys = self.read_buffer("keys")?;
        let value_lens = self.read_buffer("value lengths")?;
        let values = self.read_buffer("values")?;
        trace!(path = %self.path.display(), records = count, "read block");

        let (mut key_lens, mut keys) = (key_lens.as_slice(), keys.as_slice());
        let (mut value_lens, mut values) = (value_lens.as_slice(), values.as_slice());
        for _ in 0..count {
            let key = split_prefixed(&mut key_lens, &mut keys, "key")?;
            let value = split_prefixed(&mut value_lens, &mut values, "value")?;
            self.pending.push_back((key, value));
        }
        Ok(())
    }
}

/// Take the next vint length from `lens` and that many bytes from `data`.
fn split_prefixed(lens: &mut &[u8], data: &mut &[u8], what: &str) -> Result<Vec<u8>> {
    let len = read_vint(lens).map_err(|e| ReaderError::from_read(e, what))?;
    let len = usize::try_from(len)
        .map_err(|_| ReaderError::format(format!("negative {what} length {len}")))?;
    if len > data.len() {
        return Err(ReaderError::format(format!(
            "{what} length {len} exceeds block buffer ({} bytes left)",
            data.len()
        )));
    }
    let current: &[u8] = *data;
    let (head, tail) = current.split_at(len);
    *data = tail;
    Ok(head.to_vec())
}

impl<R: Read> RecordIterator for SequenceFileReader<R> {
    fn has_next(&mut self) -> Result<bool> {
        self.fill()
    }

    fn next_record(&mut self) -> Result<RawRecord> {
        if !self.fill()? {
            return Err(ReaderError::new(ErrorKind::Exhausted, "no more records")
                .with_path(&self.path));
        }
        let Some((key, value)) = self.pending.pop_front() else {
            return Err(ReaderError::new(ErrorKind::Exhausted, "no more records"));
        };
        self.record += 1;
        let key = decode_writable(&self.header.key_class, &key).map_err(|e| e.or_path(&self.path))?;
        let value =
            decode_writable(&self.header.value_class, &value).map_err(|e| e.or_path(&self.path))?;
        Ok(RawRecord::pair(key, value))
    }

    fn position(&self) -> StreamPosition {
        StreamPosition {
            path: self.path.clone(),
            record: self.record,
            byte: self.input.as_ref().map_or(self.closed_at, |i| i.offset),
        }
    }

    fn close(&mut self) {
        if let Some(input) = self.input.take() {
            self.closed_at = input.offset;
            debug!(path = %self.path.display(), records = self.record, "closed sequence file");
        }
        self.pending.clear();
    }
}
