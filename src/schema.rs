//! Schema descriptors and typed field tuples for the graph readers.
//!
//! Descriptors are informational: they document what a reader produces and
//! drive the best-effort typing in [`Tuple`] conversion, but decoded data is
//! never validated against them.

use ordered_float::OrderedFloat;
use serde::Serialize;
use std::fmt;

use crate::record::Writable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int64,
    Float64,
    Document,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldType::String => "string",
            FieldType::Int64 => "int64",
            FieldType::Float64 => "float64",
            FieldType::Document => "document",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

const fn field(name: &'static str, ty: FieldType) -> Field {
    Field { name, ty }
}

/// A named, ordered list of `(field, type)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [Field],
    /// Field filled from the record key when the document lacks it.
    #[serde(skip)]
    pub key_field: Option<&'static str>,
}

impl Schema {
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|f| f.name)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", field.name, field.ty)?;
        }
        f.write_str("}")
    }
}

pub static SEQUENCE_SCHEMA: Schema = Schema {
    name: "sequence",
    fields: &[field("key", FieldType::String), field("value", FieldType::Document)],
    key_field: Some("key"),
};

pub static LINK_SCHEMA: Schema = Schema {
    name: "link",
    fields: &[
        field("key_url", FieldType::String),
        field("url", FieldType::String),
        field("anchor", FieldType::String),
        field("score", FieldType::Float64),
        field("timestamp", FieldType::Int64),
        field("linktype", FieldType::String),
    ],
    key_field: Some("key_url"),
};

pub static NODE_SCHEMA: Schema = Schema {
    name: "node",
    fields: &[
        field("key_url", FieldType::String),
        field("num_inlinks", FieldType::Int64),
        field("num_outlinks", FieldType::Int64),
        field("inlink_score", FieldType::Float64),
        field("outlink_score", FieldType::Float64),
        field("metadata", FieldType::String),
    ],
    key_field: Some("key_url"),
};

/// One typed field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(OrderedFloat<f64>),
    Null,
}

impl FieldValue {
    /// Parse `raw` as `ty`; unparsable numbers become `Null`.
    pub fn parse(ty: FieldType, raw: &str) -> Self {
        let raw = raw.trim();
        match ty {
            FieldType::String | FieldType::Document => FieldValue::Str(raw.to_string()),
            FieldType::Int64 => raw.parse().map_or(FieldValue::Null, FieldValue::Int),
            FieldType::Float64 => raw
                .parse::<f64>()
                .map_or(FieldValue::Null, |v| FieldValue::Float(OrderedFloat(v))),
        }
    }

    /// Type a raw field value as `ty`.
    ///
    /// Numbers convert between integer and float columns; text goes through
    /// [`FieldValue::parse`]; `NullWritable` and anything else unusable for
    /// `ty` become `Null`.
    pub fn from_writable(ty: FieldType, value: &Writable) -> Self {
        match (ty, value) {
            (_, Writable::Null) => FieldValue::Null,
            (FieldType::Int64, Writable::Int(v)) => FieldValue::Int(i64::from(*v)),
            (FieldType::Int64, Writable::Long(v)) => FieldValue::Int(*v),
            (FieldType::Float64, Writable::Int(v)) => FieldValue::Float(OrderedFloat(f64::from(*v))),
            (FieldType::Float64, Writable::Long(v)) => FieldValue::Float(OrderedFloat(*v as f64)),
            // through the shortest decimal form so 0.1f32 stays 0.1
            (FieldType::Float64, Writable::Float(v)) => FieldValue::parse(ty, &v.to_string()),
            (FieldType::Float64, Writable::Double(v)) => FieldValue::Float(OrderedFloat(*v)),
            (FieldType::Int64, Writable::Float(_) | Writable::Double(_)) => FieldValue::Null,
            (_, other) => FieldValue::parse(ty, &other.to_text()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(v.0),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// Ordered field values, one per schema field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Tuple(pub Vec<FieldValue>);

impl Tuple {
    pub fn values(&self) -> &[FieldValue] {
        &self.0
    }

    /// Look up a value by field name.
    pub fn get(&self, schema: &Schema, name: &str) -> Option<&FieldValue> {
        schema.index_of(name).and_then(|i| self.0.get(i))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_strings() {
        assert_eq!(
            LINK_SCHEMA.to_string(),
            "{key_url: string, url: string, anchor: string, score: float64, \
             timestamp: int64, linktype: string}"
        );
        assert_eq!(
            NODE_SCHEMA.to_string(),
            "{key_url: string, num_inlinks: int64, num_outlinks: int64, \
             inlink_score: float64, outlink_score: float64, metadata: string}"
        );
        assert_eq!(SEQUENCE_SCHEMA.to_string(), "{key: string, value: document}");
    }

    #[test]
    fn parse_is_best_effort() {
        assert_eq!(FieldValue::parse(FieldType::Int64, " 42 "), FieldValue::Int(42));
        assert_eq!(FieldValue::parse(FieldType::Int64, "4.2"), FieldValue::Null);
        assert_eq!(
            FieldValue::parse(FieldType::Float64, "0.25"),
            FieldValue::Float(OrderedFloat(0.25))
        );
        assert_eq!(FieldValue::parse(FieldType::Float64, "n/a"), FieldValue::Null);
        assert_eq!(
            FieldValue::parse(FieldType::String, " inlink "),
            FieldValue::Str("inlink".into())
        );
    }

    #[test]
    fn typing_raw_writables() {
        assert_eq!(FieldValue::from_writable(FieldType::Int64, &Writable::Int(3)), FieldValue::Int(3));
        assert_eq!(
            FieldValue::from_writable(FieldType::Float64, &Writable::Float(0.1)),
            FieldValue::Float(OrderedFloat(0.1))
        );
        assert_eq!(
            FieldValue::from_writable(FieldType::Float64, &Writable::Long(2)),
            FieldValue::Float(OrderedFloat(2.0))
        );
        assert_eq!(FieldValue::from_writable(FieldType::Int64, &Writable::Double(1.5)), FieldValue::Null);
        assert_eq!(FieldValue::from_writable(FieldType::Int64, &Writable::from("12")), FieldValue::Int(12));
        assert_eq!(FieldValue::from_writable(FieldType::String, &Writable::Null), FieldValue::Null);
        assert_eq!(
            FieldValue::from_writable(FieldType::String, &Writable::Long(7)),
            FieldValue::Str("7".into())
        );
    }

    #[test]
    fn tuple_lookup_by_name() {
        let t = Tuple(vec![
            FieldValue::Str("http://a/".into()),
            FieldValue::Int(3),
            FieldValue::Int(1),
            FieldValue::Float(OrderedFloat(0.5)),
            FieldValue::Null,
            FieldValue::Str(String::new()),
        ]);
        assert_eq!(t.get(&NODE_SCHEMA, "num_inlinks").and_then(FieldValue::as_i64), Some(3));
        assert_eq!(t.get(&NODE_SCHEMA, "inlink_score").and_then(FieldValue::as_f64), Some(0.5));
        assert!(t.get(&NODE_SCHEMA, "outlink_score").is_some_and(FieldValue::is_null));
        assert!(t.get(&NODE_SCHEMA, "nope").is_none());
    }

    #[test]
    fn tuple_serializes_as_array() {
        let t = Tuple(vec![FieldValue::Str("a".into()), FieldValue::Int(1), FieldValue::Null]);
        assert_eq!(serde_json::to_value(&t).unwrap(), serde_json::json!(["a", 1, null]));
    }
}
