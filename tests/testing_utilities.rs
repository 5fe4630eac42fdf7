//! Integration tests demonstrating the testing utilities.

use anyhow::Result;
use seqreader::io::seqfile::header::CompressionMode;
use seqreader::io::seqfile::SequenceFileSource;
use seqreader::testing::*;
use seqreader::*;

#[test]
fn test_writer_produces_readable_container() -> Result<()> {
    init_tracing();
    let mut out = Vec::new();
    {
        let mut writer = SequenceFileWriter::new(
            &mut out,
            "org.apache.hadoop.io.Text",
            "org.apache.hadoop.io.Text",
            WriterOptions::default(),
        )?;
        writer.append(&"k".into(), &"a: 1".into())?;
        writer.finish()?;
    }
    assert_eq!(&out[..3], b"SEQ");
    assert_eq!(out[3], 6);

    let dir = TempDirPath::new()?;
    let path = dir.file_path("out.seq");
    std::fs::write(&path, &out)?;
    assert_keys(&sequence_reader().read(&path)?, &["k"]);
    Ok(())
}

#[test]
fn test_writer_rejects_mismatched_classes() -> Result<()> {
    let mut writer = SequenceFileWriter::new(
        Vec::new(),
        "org.apache.hadoop.io.Text",
        "org.apache.hadoop.io.Text",
        WriterOptions::default(),
    )?;
    assert!(writer.append(&Writable::Long(1), &"v".into()).is_err());
    Ok(())
}

#[test]
fn test_writer_rejects_unknown_codec() {
    let result = SequenceFileWriter::new(
        Vec::new(),
        "org.apache.hadoop.io.Text",
        "org.apache.hadoop.io.Text",
        WriterOptions::record_compressed("com.example.NoSuchCodec"),
    );
    assert!(result.is_err());
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_block_options_set_header() -> Result<()> {
    let file = mock_sequence_file_with(
        &text_records(&[("a", "b: c")]),
        WriterOptions::block_compressed("org.apache.hadoop.io.compress.GzipCodec", 10),
    )?;
    let reader = SequenceFileSource::default().open_reader(file.path())?;
    assert_eq!(reader.header().compression, CompressionMode::Block);
    assert_eq!(
        reader.header().codec_class.as_deref(),
        Some("org.apache.hadoop.io.compress.GzipCodec")
    );
    Ok(())
}

#[test]
fn test_fixtures_decode_cleanly() -> Result<()> {
    for (key, value) in sample_crawl_records(3) {
        let (k, doc) = decode(RawRecord::pair(key.as_str(), value.as_str()))?;
        assert_eq!(k.to_text(), key);
        assert_eq!(doc.get("Version"), Some("7"));
    }
    for (_, value) in sample_link_records() {
        assert_eq!(parse_document(&value).len(), 5);
    }
    for (_, value) in sample_node_records() {
        assert_eq!(parse_document(&value).len(), 5);
    }
    Ok(())
}

#[test]
fn test_fake_source_event_log() -> Result<()> {
    let fake = FakeRecordSource::new().with_file("p", vec![RawRecord::pair("k", "v: 1")]);
    {
        let cursor = StreamCursor::open(&fake, "p", 0)?;
        assert_eq!(fake.open_handles(), 1);
        drop(cursor);
    }
    assert_all_released(&fake);
    assert_eq!(fake.opened_paths(), [std::path::PathBuf::from("p")]);
    Ok(())
}

#[test]
#[should_panic(expected = "Key mismatch")]
fn test_assert_keys_reports_mismatch() {
    let record = Record {
        key: "a".into(),
        document: Document::new(),
    };
    assert_keys(&[record], &["b"]);
}

#[test]
#[should_panic(expected = "Unreleased handles")]
fn test_assert_all_released_detects_leak() {
    let fake = FakeRecordSource::new().with_file("p", vec![RawRecord::pair("k", "v")]);
    let cursor = StreamCursor::open(&fake, "p", 0).unwrap();
    assert_all_released(&fake);
    drop(cursor);
}
