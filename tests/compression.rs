//! Record- and block-compressed containers through every built-in codec.

use seqreader::io::compression::{CompressionCodec, codec_for_class, register_codec};
use seqreader::testing::*;
use seqreader::{ErrorKind, Record, sequence_reader};
use std::io::Read;
use std::sync::Arc;

#[cfg(feature = "compression-gzip")]
const DEFAULT: &str = "org.apache.hadoop.io.compress.DefaultCodec";
#[cfg(feature = "compression-gzip")]
const DEFLATE: &str = "org.apache.hadoop.io.compress.DeflateCodec";
#[cfg(feature = "compression-gzip")]
const GZIP: &str = "org.apache.hadoop.io.compress.GzipCodec";
#[cfg(feature = "compression-bzip2")]
const BZIP2: &str = "org.apache.hadoop.io.compress.BZip2Codec";
#[cfg(feature = "compression-zstd")]
const ZSTD: &str = "org.apache.hadoop.io.compress.ZStandardCodec";

fn baseline(n: usize) -> anyhow::Result<Vec<Record>> {
    let file = mock_sequence_file(&as_str_pairs(&sample_crawl_records(n)))?;
    Ok(sequence_reader().read(file.path())?)
}

fn check_codec(codec_class: &str) -> anyhow::Result<()> {
    let records = text_records(&as_str_pairs(&sample_crawl_records(10)));
    let expected = baseline(10)?;
    let reader = sequence_reader();

    let per_record = mock_sequence_file_with(&records, WriterOptions::record_compressed(codec_class))?;
    assert_eq!(reader.read(per_record.path())?, expected, "{codec_class} record mode");
    assert_eq!(reader.count(per_record.path())?, 10);

    let blocks = mock_sequence_file_with(&records, WriterOptions::block_compressed(codec_class, 3))?;
    assert_eq!(reader.read(blocks.path())?, expected, "{codec_class} block mode");
    assert_eq!(reader.count(blocks.path())?, 10);
    // crosses the first block boundary
    assert_eq!(reader.slice(2, 5, blocks.path())?, expected[2..5]);
    let from_four: Vec<_> = reader
        .read_iterator(blocks.path(), 4)?
        .collect::<Result<_, _>>()?;
    assert_eq!(from_four.len(), 6);
    assert_eq!(from_four[0].0.to_text(), "http://host/4");
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_default_codec() -> anyhow::Result<()> {
    check_codec(DEFAULT)
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_deflate_codec() -> anyhow::Result<()> {
    check_codec(DEFLATE)
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_gzip_codec() -> anyhow::Result<()> {
    check_codec(GZIP)
}

#[cfg(feature = "compression-bzip2")]
#[test]
fn test_bzip2_codec() -> anyhow::Result<()> {
    check_codec(BZIP2)
}

#[cfg(feature = "compression-zstd")]
#[test]
fn test_zstd_codec() -> anyhow::Result<()> {
    check_codec(ZSTD)
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_single_block_file() -> anyhow::Result<()> {
    let records = text_records(&[("a", "n: 1"), ("b", "n: 2")]);
    let file = mock_sequence_file_with(&records, WriterOptions::block_compressed(GZIP, 100))?;
    let read = sequence_reader().read(file.path())?;
    assert_keys(&read, &["a", "b"]);
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_corrupt_compressed_value() -> anyhow::Result<()> {
    let records = text_records(&[("a", "n: 1")]);
    let file = mock_sequence_file_with(&records, WriterOptions::record_compressed(DEFAULT))?;
    let empty = mock_sequence_file_with(&[], WriterOptions::record_compressed(DEFAULT))?;
    let header_len = std::fs::metadata(empty.path())?.len() as usize;

    let mut bytes = std::fs::read(file.path())?;
    let key_len = i32::from_be_bytes(bytes[header_len + 4..header_len + 8].try_into()?) as usize;
    bytes[header_len + 8 + key_len..].fill(0xff);
    std::fs::write(file.path(), &bytes)?;
    assert_error_kind(sequence_reader().read(file.path()), &ErrorKind::Format);
    Ok(())
}

struct Identity;

impl CompressionCodec for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    fn class_names(&self) -> &[&str] {
        &["com.example.IdentityCodec"]
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        Ok(reader)
    }

    fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

#[test]
fn test_custom_codec_registration() -> anyhow::Result<()> {
    register_codec(Arc::new(Identity));
    assert!(codec_for_class("com.example.IdentityCodec").is_some());
    check_codec("com.example.IdentityCodec")
}

#[test]
fn test_unregistered_codec_lookup() {
    assert!(codec_for_class("com.example.MissingCodec").is_none());
}
