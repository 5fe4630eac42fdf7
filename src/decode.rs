//! Record decoding: raw `(key, value)` pairs into `(key, Document)`.
//!
//! The value's text is read as `field: value` lines. Parsing is permissive: the
//! only failure is a record that is not a pair.

use crate::error::Result;
use crate::record::{Document, RawRecord, Writable};

/// Decode one raw record.
///
/// # Errors
/// Returns `MalformedRecord` when the record does not have exactly two fields.
pub fn decode(record: RawRecord) -> Result<(Writable, Document)> {
    let (key, value) = record.into_pair()?;
    let document = parse_document(&value.to_text());
    Ok((key, document))
}

/// Parse `field: value` lines into a [`Document`].
///
/// Each line is trimmed and split on its first colon; name and value are
/// trimmed again. Lines without a colon are skipped. A repeated field name
/// keeps the last value seen.
pub fn parse_document(text: &str) -> Document {
    let mut doc = Document::new();
    for line in text.split('\n') {
        if let Some((name, value)) = line.trim().split_once(':') {
            doc.insert(name.trim(), value.trim());
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn last_occurrence_wins() {
        let doc = parse_document("a:1\na:2\nb:3");
        assert_eq!(doc.get("a"), Some("2"));
        assert_eq!(doc.get("b"), Some("3"));
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn splits_on_first_colon_only() {
        let doc = parse_document("url: http://example.com:8080/x");
        assert_eq!(doc.get("url"), Some("http://example.com:8080/x"));
    }

    #[test]
    fn lines_without_colon_are_skipped() {
        let doc = parse_document("Version: 7\njust some text\n\n   \nStatus: 2 (db_fetched)");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get("just some text"), None);
        assert_eq!(doc.get("Status"), Some("2 (db_fetched)"));
    }

    #[test]
    fn handles_crlf_and_empty_values() {
        let doc = parse_document("a: x\r\nb:\r\n");
        assert_eq!(doc.get("a"), Some("x"));
        assert_eq!(doc.get("b"), Some(""));
    }

    #[test]
    fn decode_pair() -> Result<()> {
        let (key, doc) = decode(RawRecord::pair("k", "a: x\nb: y"))?;
        assert_eq!(key, Writable::from("k"));
        let expected: Document = [("a", "x"), ("b", "y")].into_iter().collect();
        assert_eq!(doc, expected);
        Ok(())
    }

    #[test]
    fn decode_is_deterministic() -> Result<()> {
        let rec = RawRecord::pair("k", "z: 1\ny: 2\nz: 3");
        assert_eq!(decode(rec.clone())?, decode(rec)?);
        Ok(())
    }

    #[test]
    fn decode_rejects_three_fields() {
        let rec = RawRecord::from_fields(vec!["k".into(), "a: 1".into(), "extra".into()]);
        let err = decode(rec).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedRecord { arity: 3 });
    }

    #[test]
    fn non_text_values_never_fail() -> Result<()> {
        let (_, doc) = decode(RawRecord::from_fields(vec![
            Writable::Int(1),
            Writable::Bytes(vec![0xde, 0xad]),
        ]))?;
        assert!(doc.is_empty());
        Ok(())
    }
}
