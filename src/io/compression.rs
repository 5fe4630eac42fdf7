//! Pluggable compression codecs for SequenceFile payloads.
//!
//! A compressed container names its codec by Hadoop class name in the header
//! (for example `org.apache.hadoop.io.compress.GzipCodec`). This module keeps a
//! global registry that maps those class names to [`CompressionCodec`]
//! implementations.
//!
//! ## Built-in Codecs
//!
//! When enabled via feature flags, the following codecs are available:
//! - **Default / Deflate** (zlib) - via `flate2` (feature: `compression-gzip`)
//! - **Gzip** - via `flate2` (feature: `compression-gzip`)
//! - **BZip2** - via `bzip2` (feature: `compression-bzip2`)
//! - **ZStandard** - via `zstd` (feature: `compression-zstd`)
//!
//! ## Custom Codecs
//! ```
//! use seqreader::io::compression::{register_codec, CompressionCodec};
//! use std::io::Read;
//! use std::sync::Arc;
//!
//! struct Identity;
//!
//! impl CompressionCodec for Identity {
//!     fn name(&self) -> &str { "identity" }
//!     fn class_names(&self) -> &[&str] { &["com.example.IdentityCodec"] }
//!     fn wrap_reader_dyn(&self, r: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
//!         Ok(r)
//!     }
//!     fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
//!         Ok(data.to_vec())
//!     }
//! }
//!
//! register_codec(Arc::new(Identity));
//! ```
//!
//! Record- and block-compressed containers compress each value (or each block
//! buffer) independently, so codecs work on whole buffers: one decompressing
//! reader per buffer, and `compress` for the fixture writer.

use anyhow::{Context, Result, bail};
use std::io::Read;
use std::sync::{Arc, PoisonError, RwLock};

/// Global codec registry.
static CODEC_REGISTRY: RwLock<Option<Vec<Arc<dyn CompressionCodec>>>> = RwLock::new(None);

fn init_registry() -> Vec<Arc<dyn CompressionCodec>> {
    vec![
        #[cfg(feature = "compression-gzip")]
        Arc::new(DefaultCodec),
        #[cfg(feature = "compression-gzip")]
        Arc::new(GzipCodec),
        #[cfg(feature = "compression-bzip2")]
        Arc::new(Bzip2Codec),
        #[cfg(feature = "compression-zstd")]
        Arc::new(ZstdCodec),
    ]
}

fn registry() -> Vec<Arc<dyn CompressionCodec>> {
    let mut lock = CODEC_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    lock.get_or_insert_with(init_registry).clone()
}

/// Register a codec. Later registrations take precedence for shared class names.
pub fn register_codec(codec: Arc<dyn CompressionCodec>) {
    let mut lock = CODEC_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    lock.get_or_insert_with(init_registry).insert(0, codec);
}

/// A compression algorithm identified by one or more Hadoop codec classes.
pub trait CompressionCodec: Send + Sync {
    /// Short name for logs (e.g. "gzip").
    fn name(&self) -> &str;

    /// Fully-qualified Hadoop class names this codec reads.
    fn class_names(&self) -> &[&str];

    /// Wrap a reader over one compressed buffer with decompression.
    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>>;

    /// Compress one buffer.
    fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>>;
}

/// Find the codec registered for a Hadoop class name.
pub fn codec_for_class(class: &str) -> Option<Arc<dyn CompressionCodec>> {
    registry()
        .into_iter()
        .find(|codec| codec.class_names().contains(&class))
}

/// Decompress one buffer, refusing to inflate past `limit` bytes.
pub fn decompress(codec: &dyn CompressionCodec, data: Vec<u8>, limit: usize) -> Result<Vec<u8>> {
    let reader = codec
        .wrap_reader_dyn(Box::new(std::io::Cursor::new(data)))
        .with_context(|| format!("wrap reader with {} codec", codec.name()))?;
    let mut out = Vec::new();
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .with_context(|| format!("decompress {} buffer", codec.name()))?;
    if out.len() > limit {
        bail!("{} buffer inflates past {limit} bytes", codec.name());
    }
    Ok(out)
}

// ============================================================================
// Built-in Codec Implementations
// ============================================================================

#[cfg(feature = "compression-gzip")]
struct DefaultCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for DefaultCodec {
    fn name(&self) -> &str {
        "deflate"
    }

    fn class_names(&self) -> &[&str] {
        &[
            "org.apache.hadoop.io.compress.DefaultCodec",
            "org.apache.hadoop.io.compress.DeflateCodec",
        ]
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        Ok(Box::new(flate2::read::ZlibDecoder::new(reader)))
    }

    fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        use std::io::Write;
        let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(data)?;
        enc.finish()
    }
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn class_names(&self) -> &[&str] {
        &["org.apache.hadoop.io.compress.GzipCodec"]
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }

    fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        use std::io::Write;
        let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(data)?;
        enc.finish()
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &str {
        "bzip2"
    }

    fn class_names(&self) -> &[&str] {
        &["org.apache.hadoop.io.compress.BZip2Codec"]
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader)))
    }

    fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        use std::io::Write;
        let mut enc = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        enc.write_all(data)?;
        enc.finish()
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn class_names(&self) -> &[&str] {
        &["org.apache.hadoop.io.compress.ZStandardCodec"]
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read>)
    }

    fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        zstd::stream::encode_all(data, 3)
    }
}
