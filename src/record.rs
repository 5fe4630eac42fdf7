//! Record types moved between sources, the decoder and the cursors.

use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::{ReaderError, Result};
use crate::io::seqfile::nutch::{CrawlDatum, LinkDatum, NodeDatum};

/// One deserialized Hadoop `Writable`.
///
/// Keys and values of a container are decoded into this enum according to the
/// class names in the container header. The Nutch crawl-database classes get
/// typed variants; classes the crate does not know are kept as
/// [`Writable::Opaque`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Writable {
    Text(String),
    Bytes(Vec<u8>),
    Int(i32),
    Long(i64),
    Bool(bool),
    Float(f32),
    Double(f64),
    Null,
    Link(LinkDatum),
    Node(NodeDatum),
    Crawl(CrawlDatum),
    Opaque { class: String, bytes: Vec<u8> },
}

impl Writable {
    /// Textual form of the value, as Hadoop's `toString()` renders it.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Writable::Text(s) => Cow::Borrowed(s),
            Writable::Bytes(bytes) => Cow::Owned(
                bytes
                    .iter()
                    .map(|b| format!("{b:02x}"))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Writable::Int(v) => Cow::Owned(v.to_string()),
            Writable::Long(v) => Cow::Owned(v.to_string()),
            Writable::Bool(v) => Cow::Owned(v.to_string()),
            Writable::Float(v) => Cow::Owned(format!("{v:?}")),
            Writable::Double(v) => Cow::Owned(format!("{v:?}")),
            Writable::Null => Cow::Borrowed("(null)"),
            Writable::Link(link) => Cow::Owned(link.to_string()),
            Writable::Node(node) => Cow::Owned(node.to_string()),
            Writable::Crawl(datum) => Cow::Owned(datum.to_string()),
            Writable::Opaque { bytes, .. } => String::from_utf8_lossy(bytes),
        }
    }

    /// Named field of a structured value, for the graph schemas.
    pub fn field(&self, name: &str) -> Option<Writable> {
        match self {
            Writable::Link(link) => link.field(name),
            Writable::Node(node) => node.field(name),
            _ => None,
        }
    }

    /// Whether the value carries its own named fields.
    pub fn is_structured(&self) -> bool {
        matches!(self, Writable::Link(_) | Writable::Node(_))
    }
}

impl fmt::Display for Writable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for Writable {
    fn from(s: &str) -> Self {
        Writable::Text(s.to_string())
    }
}

impl From<String> for Writable {
    fn from(s: String) -> Self {
        Writable::Text(s)
    }
}

/// A raw record as produced by a [`RecordSource`](crate::source::RecordSource).
///
/// Well-formed records have exactly two fields, key then value. The arity is
/// only checked when the record is decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    fields: Vec<Writable>,
}

impl RawRecord {
    pub fn pair(key: impl Into<Writable>, value: impl Into<Writable>) -> Self {
        Self {
            fields: vec![key.into(), value.into()],
        }
    }

    pub fn from_fields(fields: Vec<Writable>) -> Self {
        Self { fields }
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[Writable] {
        &self.fields
    }

    /// Split into `(key, value)`, failing with `MalformedRecord` on any other arity.
    pub fn into_pair(self) -> Result<(Writable, Writable)> {
        let arity = self.fields.len();
        let mut fields = self.fields.into_iter();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(key), Some(value), None) => Ok((key, value)),
            _ => Err(ReaderError::malformed(arity)),
        }
    }
}

/// Decoded form of a record value: field name to field value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Document(BTreeMap<String, String>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or(serde_json::Value::Null)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Document {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A decoded `(key, document)` pair in map form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub key: Writable,
    pub document: Document,
}

/// Where a cursor would resume reading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamPosition {
    pub path: PathBuf,
    /// Records consumed from the container so far, skipped ones included.
    pub record: u64,
    /// Offset of the next unread frame in the container stream.
    pub byte: u64,
}
