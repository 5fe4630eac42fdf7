//! Nutch crawl-database writables.
//!
//! CrawlDB values are `CrawlDatum`s, WebGraph link databases hold `LinkDatum`s
//! and the node database holds `Node`s. Each decodes from its `readFields`
//! layout and renders as `field: value` lines, so the generic document decoder
//! reads them like any text value.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::io;

use super::writable::{bad, read_map_writable, read_text, take, unsupported, write_map_writable, write_text};
use crate::error::{ReaderError, Result};
use crate::record::Writable;

pub const CRAWL_DATUM: &str = "org.apache.nutch.crawl.CrawlDatum";
pub const LINK_DATUM: &str = "org.apache.nutch.scoring.webgraph.LinkDatum";
pub const NODE: &str = "org.apache.nutch.scoring.webgraph.Node";

/// One edge of the web graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkDatum {
    pub url: String,
    pub anchor: String,
    pub score: f32,
    pub timestamp: i64,
    pub link_type: u8,
}

impl LinkDatum {
    pub const INLINK: u8 = 1;
    pub const OUTLINK: u8 = 2;

    pub fn link_type_name(&self) -> &'static str {
        match self.link_type {
            Self::INLINK => "inlink",
            Self::OUTLINK => "outlink",
            _ => "unknown",
        }
    }

    /// Value of a link-schema field.
    pub fn field(&self, name: &str) -> Option<Writable> {
        Some(match name {
            "url" => Writable::Text(self.url.clone()),
            "anchor" => Writable::Text(self.anchor.clone()),
            "score" => Writable::Float(self.score),
            "timestamp" => Writable::Long(self.timestamp),
            "linktype" => Writable::Text(self.link_type_name().to_string()),
            _ => return None,
        })
    }

    pub(crate) fn read(r: &mut &[u8]) -> Result<Self> {
        Ok(Self {
            url: read_text(r, LINK_DATUM)?,
            anchor: read_text(r, LINK_DATUM)?,
            score: r.read_f32::<BigEndian>().map_err(|e| bad(LINK_DATUM, e))?,
            timestamp: r.read_i64::<BigEndian>().map_err(|e| bad(LINK_DATUM, e))?,
            link_type: r.read_u8().map_err(|e| bad(LINK_DATUM, e))?,
        })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) -> io::Result<()> {
        write_text(out, &self.url)?;
        write_text(out, &self.anchor)?;
        out.write_f32::<BigEndian>(self.score)?;
        out.write_i64::<BigEndian>(self.timestamp)?;
        out.write_u8(self.link_type)
    }
}

impl fmt::Display for LinkDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "url: {}", one_line(&self.url))?;
        writeln!(f, "anchor: {}", one_line(&self.anchor))?;
        writeln!(f, "score: {:?}", self.score)?;
        writeln!(f, "timestamp: {}", self.timestamp)?;
        write!(f, "linktype: {}", self.link_type_name())
    }
}

/// Link counts and scores of one web graph node.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NodeDatum {
    pub num_inlinks: i32,
    pub num_outlinks: i32,
    pub inlink_score: f32,
    pub outlink_score: f32,
    /// Nutch `Metadata`: names with one or more values, in stream order.
    pub metadata: Vec<(String, Vec<String>)>,
}

impl NodeDatum {
    /// Metadata as space-separated `name=value` pairs.
    pub fn metadata_text(&self) -> String {
        let mut out = String::new();
        for (name, values) in &self.metadata {
            for value in values {
                if !out.is_empty() {
                    out.push(' ');
                }
                let _ = write!(out, "{name}={value}");
            }
        }
        out
    }

    /// Value of a node-schema field.
    pub fn field(&self, name: &str) -> Option<Writable> {
        Some(match name {
            "num_inlinks" => Writable::Int(self.num_inlinks),
            "num_outlinks" => Writable::Int(self.num_outlinks),
            "inlink_score" => Writable::Float(self.inlink_score),
            "outlink_score" => Writable::Float(self.outlink_score),
            "metadata" => Writable::Text(self.metadata_text()),
            _ => return None,
        })
    }

    pub(crate) fn read(r: &mut &[u8]) -> Result<Self> {
        let num_inlinks = r.read_i32::<BigEndian>().map_err(|e| bad(NODE, e))?;
        let num_outlinks = r.read_i32::<BigEndian>().map_err(|e| bad(NODE, e))?;
        let inlink_score = r.read_f32::<BigEndian>().map_err(|e| bad(NODE, e))?;
        let outlink_score = r.read_f32::<BigEndian>().map_err(|e| bad(NODE, e))?;

        let names = r.read_i32::<BigEndian>().map_err(|e| bad(NODE, e))?;
        let mut metadata = Vec::new();
        for _ in 0..names.max(0) {
            let name = read_text(r, NODE)?;
            let count = r.read_i32::<BigEndian>().map_err(|e| bad(NODE, e))?;
            let values = (0..count.max(0))
                .map(|_| read_text(r, NODE))
                .collect::<Result<Vec<_>>>()?;
            metadata.push((name, values));
        }
        Ok(Self {
            num_inlinks,
            num_outlinks,
            inlink_score,
            outlink_score,
            metadata,
        })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) -> io::Result<()> {
        out.write_i32::<BigEndian>(self.num_inlinks)?;
        out.write_i32::<BigEndian>(self.num_outlinks)?;
        out.write_f32::<BigEndian>(self.inlink_score)?;
        out.write_f32::<BigEndian>(self.outlink_score)?;
        out.write_i32::<BigEndian>(self.metadata.len() as i32)?;
        for (name, values) in &self.metadata {
            write_text(out, name)?;
            out.write_i32::<BigEndian>(values.len() as i32)?;
            for value in values {
                write_text(out, value)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for NodeDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "num_inlinks: {}", self.num_inlinks)?;
        writeln!(f, "num_outlinks: {}", self.num_outlinks)?;
        writeln!(f, "inlink_score: {:?}", self.inlink_score)?;
        writeln!(f, "outlink_score: {:?}", self.outlink_score)?;
        write!(f, "metadata: {}", one_line(&self.metadata_text()))
    }
}

/// Crawl state of one URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlDatum {
    pub version: u8,
    pub status: u8,
    /// Milliseconds since the epoch.
    pub fetch_time: i64,
    pub retries: u8,
    /// Seconds.
    pub fetch_interval: i32,
    pub score: f32,
    /// Milliseconds since the epoch.
    pub modified_time: i64,
    pub signature: Option<Vec<u8>>,
    pub metadata: Vec<(Writable, Writable)>,
}

impl Default for CrawlDatum {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            status: 1,
            fetch_time: 0,
            retries: 0,
            fetch_interval: 2_592_000,
            score: 1.0,
            modified_time: 0,
            signature: None,
            metadata: Vec::new(),
        }
    }
}

const SECONDS_PER_DAY: i32 = 86_400;

impl CrawlDatum {
    pub const CURRENT_VERSION: u8 = 7;

    /// Nutch's name for a status code.
    pub fn status_name(status: u8) -> &'static str {
        match status {
            0x01 => "db_unfetched",
            0x02 => "db_fetched",
            0x03 => "db_gone",
            0x04 => "db_redir_temp",
            0x05 => "db_redir_perm",
            0x06 => "db_notmodified",
            0x07 => "db_duplicate",
            0x08 => "db_orphan",
            0x21 => "fetch_success",
            0x22 => "fetch_retry",
            0x23 => "fetch_redir_temp",
            0x24 => "fetch_redir_perm",
            0x25 => "fetch_gone",
            0x26 => "fetch_notmodified",
            0x41 => "signature",
            0x42 => "injected",
            0x43 => "linked",
            0x44 => "parse_metadata",
            _ => "unknown",
        }
    }

    pub(crate) fn read(r: &mut &[u8]) -> Result<Self> {
        let version = r.read_u8().map_err(|e| bad(CRAWL_DATUM, e))?;
        if version > Self::CURRENT_VERSION {
            return Err(ReaderError::format(format!(
                "{CRAWL_DATUM} version {version} is newer than {}",
                Self::CURRENT_VERSION
            )));
        }
        let status = r.read_u8().map_err(|e| bad(CRAWL_DATUM, e))?;
        let fetch_time = r.read_i64::<BigEndian>().map_err(|e| bad(CRAWL_DATUM, e))?;
        let retries = r.read_u8().map_err(|e| bad(CRAWL_DATUM, e))?;
        let fetch_interval = if version > 5 {
            r.read_i32::<BigEndian>().map_err(|e| bad(CRAWL_DATUM, e))?
        } else {
            r.read_f32::<BigEndian>().map_err(|e| bad(CRAWL_DATUM, e))?.round() as i32
        };
        let score = r.read_f32::<BigEndian>().map_err(|e| bad(CRAWL_DATUM, e))?;

        let mut datum = Self {
            version,
            status,
            fetch_time,
            retries,
            fetch_interval,
            score,
            modified_time: 0,
            signature: None,
            metadata: Vec::new(),
        };
        if version > 2 {
            datum.modified_time = r.read_i64::<BigEndian>().map_err(|e| bad(CRAWL_DATUM, e))?;
            let len = r.read_u8().map_err(|e| bad(CRAWL_DATUM, e))?;
            if len > 0 {
                datum.signature = Some(take(r, i32::from(len), CRAWL_DATUM)?.to_vec());
            }
        }
        if version > 3 && r.read_u8().map_err(|e| bad(CRAWL_DATUM, e))? != 0 {
            if version < Self::CURRENT_VERSION {
                return Err(unsupported(CRAWL_DATUM, format!("metadata of version {version}")));
            }
            datum.metadata = read_map_writable(r)?;
        }
        Ok(datum)
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) -> io::Result<()> {
        out.write_u8(Self::CURRENT_VERSION)?;
        out.write_u8(self.status)?;
        out.write_i64::<BigEndian>(self.fetch_time)?;
        out.write_u8(self.retries)?;
        out.write_i32::<BigEndian>(self.fetch_interval)?;
        out.write_f32::<BigEndian>(self.score)?;
        out.write_i64::<BigEndian>(self.modified_time)?;
        match &self.signature {
            Some(sig) => {
                out.write_u8(sig.len() as u8)?;
                out.extend_from_slice(sig);
            }
            None => out.write_u8(0)?,
        }
        if self.metadata.is_empty() {
            out.write_u8(0)
        } else {
            out.write_u8(1)?;
            write_map_writable(out, &self.metadata)
        }
    }
}

impl fmt::Display for CrawlDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Status: {} ({})", self.status, Self::status_name(self.status))?;
        writeln!(f, "Fetch time: {}", self.fetch_time)?;
        writeln!(f, "Modified time: {}", self.modified_time)?;
        writeln!(f, "Retries since fetch: {}", self.retries)?;
        writeln!(
            f,
            "Retry interval: {} seconds ({} days)",
            self.fetch_interval,
            self.fetch_interval / SECONDS_PER_DAY
        )?;
        writeln!(f, "Score: {:?}", self.score)?;
        match &self.signature {
            Some(sig) => {
                f.write_str("Signature: ")?;
                for b in sig {
                    write!(f, "{b:02x}")?;
                }
                f.write_str("\n")?;
            }
            None => f.write_str("Signature: null\n")?,
        }
        f.write_str("Metadata: ")?;
        for (key, value) in &self.metadata {
            write!(f, "\n \t{}={}", one_line(&key.to_text()), metadata_value(value))?;
        }
        Ok(())
    }
}

fn metadata_value(value: &Writable) -> String {
    match value {
        Writable::Opaque { class, .. } => format!("<{}>", class.rsplit('.').next().unwrap_or(class)),
        other => one_line(&other.to_text()),
    }
}

/// Keep free text on one line so it cannot inject extra fields.
fn one_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}
