//! SequenceFile header.
//!
//! Layout: `SEQ`, version byte, key class, value class, `compressed` flag,
//! `blockCompressed` flag (v4+), codec class (v5+, when compressed), metadata
//! (v6), then the 16-byte sync marker.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::collections::BTreeMap;
use std::io::{self, Read, Write};

use super::vint::{read_vint, write_vint};
use crate::error::{ReaderError, Result};

pub const MAGIC: [u8; 3] = *b"SEQ";
pub const SYNC_SIZE: usize = 16;
pub const SYNC_ESCAPE: i32 = -1;

const BLOCK_COMPRESS_VERSION: u8 = 4;
const CUSTOM_COMPRESS_VERSION: u8 = 5;
const VERSION_WITH_METADATA: u8 = 6;

pub const DEFAULT_CODEC: &str = "org.apache.hadoop.io.compress.DefaultCodec";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    None,
    Record,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub key_class: String,
    pub value_class: String,
    pub compression: CompressionMode,
    pub codec_class: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub sync: [u8; SYNC_SIZE],
}

impl Header {
    /// Parse a header, rejecting strings longer than `max_len` bytes.
    pub fn read<R: Read + ?Sized>(r: &mut R, max_len: usize) -> Result<Self> {
        let mut magic = [0u8; 3];
        r.read_exact(&mut magic)
            .map_err(|e| ReaderError::from_read(e, "magic"))?;
        if magic != MAGIC {
            return Err(ReaderError::format(format!(
                "not a sequence file (magic {magic:02x?})"
            )));
        }
        let version = r.read_u8().map_err(|e| ReaderError::from_read(e, "version"))?;
        if !(BLOCK_COMPRESS_VERSION..=VERSION_WITH_METADATA).contains(&version) {
            return Err(ReaderError::format(format!(
                "unsupported sequence file version {version}"
            )));
        }

        let key_class = read_text(r, max_len, "key class")?;
        let value_class = read_text(r, max_len, "value class")?;
        let compressed = read_bool(r, "compressed flag")?;
        let block = read_bool(r, "block flag")?;
        let compression = match (compressed, block) {
            (false, _) => CompressionMode::None,
            (true, false) => CompressionMode::Record,
            (true, true) => CompressionMode::Block,
        };
        let codec_class = match (compressed, version >= CUSTOM_COMPRESS_VERSION) {
            (false, _) => None,
            (true, true) => Some(read_text(r, max_len, "codec class")?),
            (true, false) => Some(DEFAULT_CODEC.to_string()),
        };

        let mut metadata = BTreeMap::new();
        if version >= VERSION_WITH_METADATA {
            let n = r
                .read_i32::<BigEndian>()
                .map_err(|e| ReaderError::from_read(e, "metadata count"))?;
            if n < 0 {
                return Err(ReaderError::format(format!("negative metadata count {n}")));
            }
            for _ in 0..n {
                let k = read_text(r, max_len, "metadata key")?;
                let v = read_text(r, max_len, "metadata value")?;
                metadata.insert(k, v);
            }
        }

        let mut sync = [0u8; SYNC_SIZE];
        r.read_exact(&mut sync)
            .map_err(|e| ReaderError::from_read(e, "sync marker"))?;

        Ok(Self {
            version,
            key_class,
            value_class,
            compression,
            codec_class,
            metadata,
            sync,
        })
    }

    /// Serialize the header in the version-6 layout.
    pub fn write<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_u8(VERSION_WITH_METADATA)?;
        write_text(w, &self.key_class)?;
        write_text(w, &self.value_class)?;
        w.write_u8(u8::from(self.compression != CompressionMode::None))?;
        w.write_u8(u8::from(self.compression == CompressionMode::Block))?;
        if self.compression != CompressionMode::None {
            write_text(w, self.codec_class.as_deref().unwrap_or(DEFAULT_CODEC))?;
        }
        w.write_i32::<BigEndian>(self.metadata.len() as i32)?;
        for (k, v) in &self.metadata {
            write_text(w, k)?;
            write_text(w, v)?;
        }
        w.write_all(&self.sync)
    }
}

fn read_bool<R: Read + ?Sized>(r: &mut R, what: &str) -> Result<bool> {
    Ok(r.read_u8().map_err(|e| ReaderError::from_read(e, what))? != 0)
}

/// `Text.readString`: vint length then UTF-8 bytes.
fn read_text<R: Read + ?Sized>(r: &mut R, max_len: usize, what: &str) -> Result<String> {
    let len = read_vint(r).map_err(|e| ReaderError::from_read(e, what))?;
    if len < 0 || len as usize > max_len {
        return Err(ReaderError::format(format!("bad {what} length {len}")));
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)
        .map_err(|e| ReaderError::from_read(e, what))?;
    String::from_utf8(buf)
        .map_err(|e| ReaderError::format(format!("{what} is not UTF-8")).with_source(e))
}

fn write_text<W: Write + ?Sized>(w: &mut W, s: &str) -> io::Result<()> {
    write_vint(w, s.len() as i32)?;
    w.write_all(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sample(compression: CompressionMode) -> Header {
        Header {
            version: VERSION_WITH_METADATA,
            key_class: "org.apache.hadoop.io.Text".into(),
            value_class: "org.apache.hadoop.io.Text".into(),
            compression,
            codec_class: match compression {
                CompressionMode::None => None,
                _ => Some(DEFAULT_CODEC.into()),
            },
            metadata: [("source".to_string(), "test".to_string())].into(),
            sync: [7u8; SYNC_SIZE],
        }
    }

    #[test]
    fn written_header_parses() {
        for mode in [CompressionMode::None, CompressionMode::Record, CompressionMode::Block] {
            let header = sample(mode);
            let mut bytes = Vec::new();
            header.write(&mut bytes).unwrap();
            let parsed = Header::read(&mut bytes.as_slice(), 1024).unwrap();
            assert_eq!(parsed, header);
        }
    }

    #[test]
    fn version_four_compressed_uses_default_codec() {
        let mut bytes = b"SEQ\x04".to_vec();
        write_text(&mut bytes, "K").unwrap();
        write_text(&mut bytes, "V").unwrap();
        bytes.extend_from_slice(&[1, 0]);
        bytes.extend_from_slice(&[9u8; SYNC_SIZE]);
        let parsed = Header::read(&mut bytes.as_slice(), 1024).unwrap();
        assert_eq!(parsed.compression, CompressionMode::Record);
        assert_eq!(parsed.codec_class.as_deref(), Some(DEFAULT_CODEC));
        assert!(parsed.metadata.is_empty());
    }

    #[test]
    fn rejects_bad_magic_and_truncation() {
        let err = Header::read(&mut b"PK\x03\x04".as_slice(), 1024).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Format);

        let mut bytes = Vec::new();
        sample(CompressionMode::None).write(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 4);
        let err = Header::read(&mut bytes.as_slice(), 1024).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Format);
    }

    #[test]
    fn rejects_oversized_class_name() {
        let mut bytes = Vec::new();
        sample(CompressionMode::None).write(&mut bytes).unwrap();
        let err = Header::read(&mut bytes.as_slice(), 4).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Format);
    }
}
