//! Eager read operations built on [`RawCursor`].
//!
//! [`BulkReader`] materializes whole files or ranges of them. What each raw
//! record turns into is decided by a [`Conversion`] strategy: [`MapConversion`]
//! decodes it and keeps the key and the field map, [`TupleConversion`]
//! projects it onto a [`Schema`]. Any closure `Fn(Writable, Document) -> T` is
//! a conversion too, applied after decoding.
//!
//! Errors abort the whole call; records already pulled are discarded.

use std::path::Path;
use std::sync::Arc;

use crate::cursor::RawCursor;
use crate::decode::{decode, parse_document};
use crate::error::{ErrorKind, Result};
use crate::record::{Document, RawRecord, Record, Writable};
use crate::schema::{Field, FieldValue, Schema, Tuple};
use crate::source::RecordSource;

/// Per-record conversion applied by [`BulkReader`].
pub trait Conversion {
    type Output;

    /// # Errors
    /// `MalformedRecord` when the record has a shape the conversion rejects.
    fn convert(&self, record: RawRecord) -> Result<Self::Output>;
}

impl<F, T> Conversion for F
where
    F: Fn(Writable, Document) -> T,
{
    type Output = T;

    fn convert(&self, record: RawRecord) -> Result<T> {
        let (key, document) = decode(record)?;
        Ok(self(key, document))
    }
}

/// Keeps records in map form.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapConversion;

impl Conversion for MapConversion {
    type Output = Record;

    fn convert(&self, record: RawRecord) -> Result<Record> {
        let (key, document) = decode(record)?;
        Ok(Record { key, document })
    }
}

/// Projects records onto the fields of a schema, in schema order.
///
/// A raw record with one element per schema field is taken positionally. A
/// `(key, value)` pair is projected by field name: from the value's own fields
/// when it is a structured writable, otherwise from its decoded document. The
/// schema's key field falls back to the record key when the value does not
/// carry it. Missing fields and unparsable numbers become `Null`.
#[derive(Debug, Clone, Copy)]
pub struct TupleConversion {
    schema: &'static Schema,
}

impl TupleConversion {
    pub fn new(schema: &'static Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    fn project(&self, key: &Writable, lookup: impl Fn(&Field) -> Option<FieldValue>) -> Tuple {
        let values = self
            .schema
            .fields
            .iter()
            .map(|field| match lookup(field) {
                Some(value) => value,
                None if self.schema.key_field == Some(field.name) => {
                    FieldValue::from_writable(field.ty, key)
                }
                None => FieldValue::Null,
            })
            .collect();
        Tuple(values)
    }
}

impl Conversion for TupleConversion {
    type Output = Tuple;

    fn convert(&self, record: RawRecord) -> Result<Tuple> {
        if record.arity() != 2 && record.arity() == self.schema.fields.len() {
            let values = self
                .schema
                .fields
                .iter()
                .zip(record.fields())
                .map(|(field, value)| FieldValue::from_writable(field.ty, value))
                .collect();
            return Ok(Tuple(values));
        }

        let (key, value) = record.into_pair()?;
        if value.is_structured() {
            return Ok(self.project(&key, |field| {
                value.field(field.name).map(|w| FieldValue::from_writable(field.ty, &w))
            }));
        }
        let document = parse_document(&value.to_text());
        Ok(self.project(&key, |field| {
            document.get(field.name).map(|raw| FieldValue::parse(field.ty, raw))
        }))
    }
}

/// Read-all / head / slice / count over single files.
pub struct BulkReader<C> {
    source: Arc<dyn RecordSource>,
    conversion: C,
}

impl<C: Conversion> BulkReader<C> {
    pub fn new(source: Arc<dyn RecordSource>, conversion: C) -> Self {
        Self { source, conversion }
    }

    pub fn source(&self) -> &Arc<dyn RecordSource> {
        &self.source
    }

    pub fn conversion(&self) -> &C {
        &self.conversion
    }

    /// Every record of `path`, in file order.
    ///
    /// # Errors
    /// Any open, read or decode failure.
    pub fn read_all(&self, path: impl AsRef<Path>) -> Result<Vec<C::Output>> {
        let cursor = RawCursor::open(self.source.as_ref(), path, 0)?;
        self.collect(cursor, None)
    }

    /// The first `n` records of `path`. `n == 0` yields an empty vector.
    ///
    /// # Errors
    /// Any open, read or decode failure.
    pub fn head(&self, n: usize, path: impl AsRef<Path>) -> Result<Vec<C::Output>> {
        self.slice(0, n, path)
    }

    /// Records at positions `[start, stop)`.
    ///
    /// `start >= stop` yields an empty vector; `stop` past the end truncates.
    /// The file is still opened, so a missing path fails even for an empty
    /// range. Records before `start` are skipped by the backend and never
    /// converted.
    ///
    /// # Errors
    /// Any open, read or decode failure.
    pub fn slice(&self, start: usize, stop: usize, path: impl AsRef<Path>) -> Result<Vec<C::Output>> {
        let path = path.as_ref();
        if start >= stop {
            RawCursor::open(self.source.as_ref(), path, 0)?;
            return Ok(Vec::new());
        }
        let cursor = match RawCursor::open(self.source.as_ref(), path, start as u64) {
            Ok(cursor) => cursor,
            Err(e) if e.kind() == &ErrorKind::OutOfRange => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        self.collect(cursor, Some(stop - start))
    }

    /// Number of records in `path`, counted without decoding documents.
    ///
    /// # Errors
    /// Any open or read failure.
    pub fn count(&self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        self.source.count(path).map_err(|e| e.or_path(path))
    }

    fn collect(&self, cursor: RawCursor, take: Option<usize>) -> Result<Vec<C::Output>> {
        let path = cursor.path().to_path_buf();
        let take = take.unwrap_or(usize::MAX);
        let mut out = Vec::new();
        for item in cursor.take(take) {
            let converted = self.conversion.convert(item?).map_err(|e| e.or_path(&path))?;
            out.push(converted);
        }
        Ok(out)
    }
}
