//! Integration tests for the native SequenceFile backend.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use seqreader::io::seqfile::header::{CompressionMode, Header};
use seqreader::io::seqfile::vint::write_vint;
use seqreader::io::seqfile::SequenceFileSource;
use seqreader::testing::*;
use seqreader::{
    BackendRegistry, CrawlDatum, ErrorKind, RawRecord, ReaderConfig, SequenceReader, Writable,
    sequence_reader,
};

const SYNC: &[u8; 16] = b"seqreader-sync!!";

fn write_text(out: &mut Vec<u8>, s: &str) {
    write_vint(out, s.len() as i32).unwrap();
    out.extend_from_slice(s.as_bytes());
}

/// Version-5 header for an uncompressed Text/Text file, built by hand.
fn v5_text_file(records: &[(&str, &str)]) -> Vec<u8> {
    let mut out = b"SEQ".to_vec();
    out.push(5);
    write_text(&mut out, "org.apache.hadoop.io.Text");
    write_text(&mut out, "org.apache.hadoop.io.Text");
    out.push(0);
    out.push(0);
    out.extend_from_slice(SYNC);
    for (k, v) in records {
        let mut key = Vec::new();
        write_text(&mut key, k);
        let mut value = Vec::new();
        write_text(&mut value, v);
        out.write_i32::<BigEndian>((key.len() + value.len()) as i32).unwrap();
        out.write_i32::<BigEndian>(key.len() as i32).unwrap();
        out.extend_from_slice(&key);
        out.extend_from_slice(&value);
    }
    out
}

#[test]
fn test_reads_text_records() -> anyhow::Result<()> {
    let file = mock_sequence_file(&[
        ("http://a/", "Version: 7\nStatus: 2 (db_fetched)\nScore: 1.5"),
        ("http://b/", "Status: 1 (db_unfetched)"),
    ])?;
    let records = sequence_reader().read(file.path())?;
    assert_keys(&records, &["http://a/", "http://b/"]);
    assert_eq!(records[0].document.get("Status"), Some("2 (db_fetched)"));
    assert_eq!(records[0].document.get("Score"), Some("1.5"));
    assert_eq!(records[1].document.len(), 1);
    Ok(())
}

#[test]
fn test_reads_version_five_header() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path("v5.seq");
    fs::write(&path, v5_text_file(&[("k1", "a: 1"), ("k2", "a: 2")]))?;

    let reader = SequenceFileSource::default().open_reader(&path)?;
    assert_eq!(reader.header().version, 5);
    assert!(reader.header().metadata.is_empty());
    assert_eq!(sequence_reader().count(&path)?, 2);
    let last = sequence_reader().slice(1, 2, &path)?;
    assert_eq!(last[0].document.get("a"), Some("2"));
    Ok(())
}

#[test]
fn test_header_metadata_round_trip() -> anyhow::Result<()> {
    let mut options = WriterOptions::default();
    options.metadata = BTreeMap::from([("writer".to_string(), "nutch".to_string())]);
    let file = mock_sequence_file_with(&text_records(&[("k", "v: 1")]), options)?;
    let reader = SequenceFileSource::default().open_reader(file.path())?;
    let header = reader.header();
    assert_eq!(header.version, 6);
    assert_eq!(header.compression, CompressionMode::None);
    assert_eq!(header.codec_class, None);
    assert_eq!(header.metadata.get("writer").map(String::as_str), Some("nutch"));
    assert_eq!(&header.sync, SYNC);
    Ok(())
}

#[test]
fn test_sync_markers_between_records() -> anyhow::Result<()> {
    let records = sample_crawl_records(9);
    let file = mock_sequence_file_with(
        &text_records(&as_str_pairs(&records)),
        WriterOptions::default().sync_interval(2),
    )?;
    let reader = sequence_reader();
    assert_eq!(reader.count(file.path())?, 9);
    assert_eq!(reader.read(file.path())?.len(), 9);
    let tail = reader.read_iterator(file.path(), 5)?.collect::<Result<Vec<_>, _>>()?;
    assert_eq!(tail.len(), 4);
    assert_eq!(tail[0].0.to_text(), "http://host/5");
    Ok(())
}

#[test]
fn test_corrupt_sync_marker() -> anyhow::Result<()> {
    let records = sample_crawl_records(5);
    let file = mock_sequence_file_with(
        &text_records(&as_str_pairs(&records)),
        WriterOptions::default().sync_interval(2),
    )?;
    let mut bytes = fs::read(file.path())?;
    let hits: Vec<usize> = bytes
        .windows(SYNC.len())
        .enumerate()
        .filter(|(_, w)| *w == SYNC)
        .map(|(i, _)| i)
        .collect();
    // header sync, then one after every two records
    assert_eq!(hits.len(), 3);
    bytes[hits[1]] ^= 0xff;
    fs::write(file.path(), &bytes)?;

    assert_error_kind(sequence_reader().read(file.path()), &ErrorKind::Format);

    let lenient = BackendRegistry::new(ReaderConfig::default().verify_sync(false));
    assert_eq!(SequenceReader::new(&lenient).read(file.path())?.len(), 5);
    Ok(())
}

#[test]
fn test_start_offsets() -> anyhow::Result<()> {
    let records = sample_crawl_records(3);
    let file = mock_sequence_file(&as_str_pairs(&records))?;
    let reader = sequence_reader();

    let from_one: Vec<_> = reader.read_iterator(file.path(), 1)?.collect::<Result<_, _>>()?;
    assert_eq!(from_one.len(), 2);

    assert!(reader.read_iterator(file.path(), 3)?.next().is_none());
    assert_error_kind(reader.read_iterator(file.path(), 4).map(|_| ()), &ErrorKind::OutOfRange);
    Ok(())
}

#[test]
fn test_position_tracks_records_and_bytes() -> anyhow::Result<()> {
    let file = mock_sequence_file(&[("a", "x: 1"), ("b", "x: 2")])?;
    let size = fs::metadata(file.path())?.len();
    let mut cursor = sequence_reader().read_iterator(file.path(), 0)?;
    let start = cursor.position();
    assert_eq!(start.record, 0);
    assert!(start.byte > 0);
    assert_eq!(start.path, file.path());

    cursor.next();
    assert_eq!(cursor.position().record, 1);
    assert!(cursor.position().byte > start.byte);

    cursor.next();
    assert!(cursor.next().is_none());
    let end = cursor.position();
    assert_eq!(end.record, 2);
    assert_eq!(end.byte, size);
    Ok(())
}

#[test]
fn test_bad_magic_and_version() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let not_seq = dir.file_path("plain.txt");
    fs::write(&not_seq, "hello world, not a container")?;
    assert_error_kind(sequence_reader().read(&not_seq), &ErrorKind::Format);

    let tiny = dir.file_path("tiny");
    fs::write(&tiny, "SE")?;
    assert_error_kind(sequence_reader().count(&tiny), &ErrorKind::Format);

    let mut old = v5_text_file(&[]);
    old[3] = 3;
    let old_path = dir.file_path("old.seq");
    fs::write(&old_path, old)?;
    assert_error_kind(sequence_reader().read(&old_path), &ErrorKind::Format);
    Ok(())
}

#[test]
fn test_truncated_record() -> anyhow::Result<()> {
    let records = sample_crawl_records(4);
    let file = mock_sequence_file(&as_str_pairs(&records))?;
    let bytes = fs::read(file.path())?;
    fs::write(file.path(), &bytes[..bytes.len() - 3])?;

    let reader = sequence_reader();
    assert_error_kind(reader.count(file.path()), &ErrorKind::Format);
    assert_eq!(reader.head(3, file.path())?.len(), 3);

    let mut cursor = reader.read_iterator(file.path(), 0)?;
    let results: Vec<_> = cursor.by_ref().collect();
    assert_eq!(results.len(), 4);
    assert!(results[3].as_ref().is_err_and(|e| e.kind() == &ErrorKind::Format));
    assert!(!cursor.is_open());
    Ok(())
}

#[test]
fn test_unknown_codec_is_unsupported() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path("lzo.seq");
    let header = Header {
        version: 6,
        key_class: "org.apache.hadoop.io.Text".into(),
        value_class: "org.apache.hadoop.io.Text".into(),
        compression: CompressionMode::Block,
        codec_class: Some("com.hadoop.compression.lzo.LzoCodec".into()),
        metadata: BTreeMap::new(),
        sync: *SYNC,
    };
    let mut out = Vec::new();
    header.write(&mut out)?;
    fs::File::create(&path)?.write_all(&out)?;

    assert_error_kind(sequence_reader().read(&path), &ErrorKind::Unsupported);
    Ok(())
}

#[test]
fn test_non_text_writables() -> anyhow::Result<()> {
    let records = vec![
        (Writable::Long(10), Writable::Int(7)),
        (Writable::Long(-3), Writable::Int(0)),
    ];
    let file = mock_sequence_file_with(&records, WriterOptions::default())?;
    let reader = sequence_reader();

    let raw: Vec<RawRecord> = reader.read_raw_iterator(file.path(), 0)?.collect::<Result<_, _>>()?;
    assert_eq!(raw[0], RawRecord::pair(Writable::Long(10), Writable::Int(7)));

    let decoded = reader.read(file.path())?;
    assert_eq!(decoded[1].key, Writable::Long(-3));
    assert!(decoded[1].document.is_empty());
    Ok(())
}

#[test]
fn test_unknown_value_class_is_opaque() -> anyhow::Result<()> {
    let datum = Writable::Opaque {
        class: "org.example.PlainTextWritable".into(),
        bytes: b"Status: 5\nScore: 0.5".to_vec(),
    };
    let file = mock_sequence_file_with(&[(Writable::from("http://a/"), datum.clone())], WriterOptions::default())?;
    let raw: Vec<RawRecord> = sequence_reader()
        .read_raw_iterator(file.path(), 0)?
        .collect::<Result<_, _>>()?;
    assert_eq!(raw[0].fields()[1], datum);

    let records = sequence_reader().read(file.path())?;
    assert_eq!(records[0].document.get("Status"), Some("5"));
    Ok(())
}

#[test]
fn test_crawl_datum_values() -> anyhow::Result<()> {
    let fetched = CrawlDatum {
        status: 2,
        fetch_time: 1_700_000_000_000,
        modified_time: 1_690_000_000_000,
        score: 1.5,
        signature: Some(vec![0xde, 0xad, 0xbe, 0xef]),
        metadata: vec![
            (Writable::from("_depth_"), Writable::Int(1)),
            (Writable::from("Content-Type"), Writable::from("text/html")),
        ],
        ..CrawlDatum::default()
    };
    let records = vec![
        (Writable::from("http://a/"), Writable::Crawl(fetched.clone())),
        (Writable::from("http://b/"), Writable::Crawl(CrawlDatum::default())),
    ];
    let file = mock_sequence_file_with(&records, WriterOptions::default())?;
    let reader = sequence_reader();

    let raw: Vec<RawRecord> = reader.read_raw_iterator(file.path(), 0)?.collect::<Result<_, _>>()?;
    assert_eq!(raw[0].fields()[1], Writable::Crawl(fetched));

    let decoded = reader.read(file.path())?;
    let doc = &decoded[0].document;
    assert_eq!(doc.get("Version"), Some("7"));
    assert_eq!(doc.get("Status"), Some("2 (db_fetched)"));
    assert_eq!(doc.get("Score"), Some("1.5"));
    assert_eq!(doc.get("Retry interval"), Some("2592000 seconds (30 days)"));
    assert_eq!(doc.get("Signature"), Some("deadbeef"));
    assert_eq!(doc.get("Fetch time"), Some("1700000000000"));
    assert_eq!(decoded[1].document.get("Status"), Some("1 (db_unfetched)"));
    assert_eq!(decoded[1].document.get("Signature"), Some("null"));
    Ok(())
}

#[test]
fn test_oversized_record_is_rejected() -> anyhow::Result<()> {
    let big = "x".repeat(4096);
    let file = mock_sequence_file(&[("k", big.as_str())])?;
    let strict = BackendRegistry::new(ReaderConfig::default().max_record_len(1024));
    assert_error_kind(SequenceReader::new(&strict).read(file.path()), &ErrorKind::Format);
    assert_eq!(sequence_reader().count(file.path())?, 1);
    Ok(())
}
