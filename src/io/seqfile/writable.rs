//! Decoding of serialized Hadoop `Writable`s by class name.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io;

use super::nutch::{self, CrawlDatum, LinkDatum, NodeDatum};
use super::vint::{read_vint, read_vlong, write_vint};
use crate::error::{ErrorKind, ReaderError, Result};
use crate::record::Writable;

pub const TEXT: &str = "org.apache.hadoop.io.Text";
pub const UTF8: &str = "org.apache.hadoop.io.UTF8";
pub const BYTES: &str = "org.apache.hadoop.io.BytesWritable";
pub const INT: &str = "org.apache.hadoop.io.IntWritable";
pub const LONG: &str = "org.apache.hadoop.io.LongWritable";
pub const VINT: &str = "org.apache.hadoop.io.VIntWritable";
pub const VLONG: &str = "org.apache.hadoop.io.VLongWritable";
pub const BOOLEAN: &str = "org.apache.hadoop.io.BooleanWritable";
pub const FLOAT: &str = "org.apache.hadoop.io.FloatWritable";
pub const DOUBLE: &str = "org.apache.hadoop.io.DoubleWritable";
pub const NULL: &str = "org.apache.hadoop.io.NullWritable";
pub const MAP: &str = "org.apache.hadoop.io.MapWritable";

/// Class ids `AbstractMapWritable` assigns without writing them out.
const MAP_CLASS_IDS: &[(i8, &str)] = &[
    (-127, "org.apache.hadoop.io.ArrayWritable"),
    (-126, BOOLEAN),
    (-125, BYTES),
    (-124, FLOAT),
    (-123, INT),
    (-122, LONG),
    (-121, MAP),
    (-120, "org.apache.hadoop.io.MD5Hash"),
    (-119, NULL),
    (-118, "org.apache.hadoop.io.ObjectWritable"),
    (-117, "org.apache.hadoop.io.SortedMapWritable"),
    (-116, TEXT),
    (-115, "org.apache.hadoop.io.TwoDArrayWritable"),
    (-114, VINT),
    (-113, VLONG),
];

/// Decode `bytes` as an instance of `class`.
///
/// Unknown classes are returned as [`Writable::Opaque`]. Text is decoded
/// lossily; only truncated buffers of known classes fail.
pub fn decode_writable(class: &str, bytes: &[u8]) -> Result<Writable> {
    let mut r = bytes;
    Ok(read_writable(class, &mut r)?.unwrap_or_else(|| Writable::Opaque {
        class: class.to_string(),
        bytes: bytes.to_vec(),
    }))
}

/// Read one `class` instance from the front of `r`.
///
/// Returns `None`, consuming nothing, when the class is not known and its
/// serialized size therefore cannot be determined.
pub(crate) fn read_writable(class: &str, r: &mut &[u8]) -> Result<Option<Writable>> {
    let value = match class {
        TEXT => Writable::Text(read_text(r, class)?),
        UTF8 => {
            let len = r.read_u16::<BigEndian>().map_err(|e| bad(class, e))?;
            Writable::Text(String::from_utf8_lossy(take(r, i32::from(len), class)?).into_owned())
        }
        BYTES => {
            let len = r.read_i32::<BigEndian>().map_err(|e| bad(class, e))?;
            Writable::Bytes(take(r, len, class)?.to_vec())
        }
        INT => Writable::Int(r.read_i32::<BigEndian>().map_err(|e| bad(class, e))?),
        LONG => Writable::Long(r.read_i64::<BigEndian>().map_err(|e| bad(class, e))?),
        VINT => Writable::Int(read_vint(r).map_err(|e| bad(class, e))?),
        VLONG => Writable::Long(read_vlong(r).map_err(|e| bad(class, e))?),
        BOOLEAN => Writable::Bool(r.read_u8().map_err(|e| bad(class, e))? != 0),
        FLOAT => Writable::Float(r.read_f32::<BigEndian>().map_err(|e| bad(class, e))?),
        DOUBLE => Writable::Double(r.read_f64::<BigEndian>().map_err(|e| bad(class, e))?),
        NULL => Writable::Null,
        nutch::LINK_DATUM => Writable::Link(LinkDatum::read(r)?),
        nutch::NODE => Writable::Node(NodeDatum::read(r)?),
        nutch::CRAWL_DATUM => Writable::Crawl(CrawlDatum::read(r)?),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Hadoop class name used to store `w`.
pub fn class_of(w: &Writable) -> &str {
    match w {
        Writable::Text(_) => TEXT,
        Writable::Bytes(_) => BYTES,
        Writable::Int(_) => INT,
        Writable::Long(_) => LONG,
        Writable::Bool(_) => BOOLEAN,
        Writable::Float(_) => FLOAT,
        Writable::Double(_) => DOUBLE,
        Writable::Null => NULL,
        Writable::Link(_) => nutch::LINK_DATUM,
        Writable::Node(_) => nutch::NODE,
        Writable::Crawl(_) => nutch::CRAWL_DATUM,
        Writable::Opaque { class, .. } => class,
    }
}

/// Serialize `w` the way [`class_of`]`(w)` expects.
pub fn encode_writable(w: &Writable) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    match w {
        Writable::Text(s) => write_text(&mut out, s)?,
        Writable::Bytes(b) => {
            out.write_i32::<BigEndian>(b.len() as i32)?;
            out.extend_from_slice(b);
        }
        Writable::Int(v) => out.write_i32::<BigEndian>(*v)?,
        Writable::Long(v) => out.write_i64::<BigEndian>(*v)?,
        Writable::Bool(v) => out.write_u8(u8::from(*v))?,
        Writable::Float(v) => out.write_f32::<BigEndian>(*v)?,
        Writable::Double(v) => out.write_f64::<BigEndian>(*v)?,
        Writable::Null => {}
        Writable::Link(link) => link.write(&mut out)?,
        Writable::Node(node) => node.write(&mut out)?,
        Writable::Crawl(datum) => datum.write(&mut out)?,
        Writable::Opaque { bytes, .. } => out.extend_from_slice(bytes),
    }
    Ok(out)
}

/// `Text.readString`: vint length then UTF-8 bytes.
pub(crate) fn read_text(r: &mut &[u8], class: &str) -> Result<String> {
    let len = read_vint(r).map_err(|e| bad(class, e))?;
    Ok(String::from_utf8_lossy(take(r, len, class)?).into_owned())
}

pub(crate) fn write_text(out: &mut Vec<u8>, s: &str) -> io::Result<()> {
    write_vint(out, s.len() as i32)?;
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

enum MapItem {
    Value(Writable),
    Unsized(String),
}

/// Entries of a serialized `MapWritable`, in stream order.
///
/// Decoding stops at the first key or value whose class this module cannot
/// size; the unread remainder is kept as an [`Writable::Opaque`] of that class
/// and `r` is left empty.
pub(crate) fn read_map_writable(r: &mut &[u8]) -> Result<Vec<(Writable, Writable)>> {
    let new_classes = r.read_i8().map_err(|e| bad(MAP, e))?;
    let mut custom = Vec::new();
    for _ in 0..new_classes.max(0) {
        let id = r.read_i8().map_err(|e| bad(MAP, e))?;
        let len = r.read_u16::<BigEndian>().map_err(|e| bad(MAP, e))?;
        let name = String::from_utf8_lossy(take(r, i32::from(len), MAP)?).into_owned();
        custom.push((id, name));
    }

    let entries = r.read_i32::<BigEndian>().map_err(|e| bad(MAP, e))?;
    let mut out = Vec::new();
    for _ in 0..entries.max(0) {
        let key = match read_map_item(r, &custom)? {
            MapItem::Value(w) => w,
            MapItem::Unsized(class) => {
                out.push((remainder(r, class), Writable::Null));
                break;
            }
        };
        match read_map_item(r, &custom)? {
            MapItem::Value(value) => out.push((key, value)),
            MapItem::Unsized(class) => {
                out.push((key, remainder(r, class)));
                break;
            }
        }
    }
    Ok(out)
}

fn read_map_item(r: &mut &[u8], custom: &[(i8, String)]) -> Result<MapItem> {
    let id = r.read_i8().map_err(|e| bad(MAP, e))?;
    let class = MAP_CLASS_IDS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, class)| *class)
        .or_else(|| custom.iter().find(|(known, _)| *known == id).map(|(_, c)| c.as_str()))
        .ok_or_else(|| ReaderError::format(format!("unknown class id {id} in {MAP}")))?;
    Ok(match read_writable(class, r)? {
        Some(w) => MapItem::Value(w),
        None => MapItem::Unsized(class.to_string()),
    })
}

fn remainder(r: &mut &[u8], class: String) -> Writable {
    let bytes = r.to_vec();
    *r = &[];
    Writable::Opaque { class, bytes }
}

/// Serialize entries as a `MapWritable`, declaring non-standard classes up front.
pub(crate) fn write_map_writable(out: &mut Vec<u8>, entries: &[(Writable, Writable)]) -> io::Result<()> {
    let items = || entries.iter().flat_map(|(k, v)| [k, v]);
    let mut custom: Vec<&str> = Vec::new();
    for w in items() {
        let class = class_of(w);
        if predefined_id(class).is_none() && !custom.contains(&class) {
            custom.push(class);
        }
    }

    out.write_i8(custom.len() as i8)?;
    for (i, class) in custom.iter().enumerate() {
        out.write_i8(i as i8 + 1)?;
        out.write_u16::<BigEndian>(class.len() as u16)?;
        out.extend_from_slice(class.as_bytes());
    }
    out.write_i32::<BigEndian>(entries.len() as i32)?;
    for w in items() {
        let class = class_of(w);
        let id = predefined_id(class)
            .or_else(|| custom.iter().position(|c| *c == class).map(|i| i as i8 + 1))
            .unwrap_or_default();
        out.write_i8(id)?;
        out.extend_from_slice(&encode_writable(w)?);
    }
    Ok(())
}

fn predefined_id(class: &str) -> Option<i8> {
    MAP_CLASS_IDS.iter().find(|(_, c)| *c == class).map(|(id, _)| *id)
}

pub(crate) fn take<'a>(r: &mut &'a [u8], len: i32, class: &str) -> Result<&'a [u8]> {
    let len = usize::try_from(len)
        .map_err(|_| ReaderError::format(format!("negative length {len} in {class}")))?;
    if len > r.len() {
        return Err(ReaderError::format(format!(
            "{class} needs {len} bytes, {} left",
            r.len()
        )));
    }
    let current: &'a [u8] = *r;
    let (head, tail) = current.split_at(len);
    *r = tail;
    Ok(head)
}

pub(crate) fn bad(class: &str, err: io::Error) -> ReaderError {
    ReaderError::from_read(err, class)
}

pub(crate) fn unsupported(class: &str, what: impl std::fmt::Display) -> ReaderError {
    ReaderError::new(ErrorKind::Unsupported, format!("{class}: {what}"))
}
