//! Pre-built crawl-database records for common testing scenarios.
//!
//! The `sample_*_records` helpers are plain-text fixtures: each value is a
//! string of `field: value` lines named after the reader schemas. The
//! `sample_*_datums` helpers hold the same link and node data as the binary
//! Nutch writables real WebGraph outputs contain.

use crate::io::seqfile::nutch::{LinkDatum, NodeDatum};
use crate::record::Writable;

/// Outlink records keyed by source URL, matching the link schema.
///
/// # Example
///
/// ```
/// use seqreader::testing::sample_link_records;
///
/// let links = sample_link_records();
/// assert_eq!(links.len(), 4);
/// ```
#[must_use]
pub fn sample_link_records() -> Vec<(String, String)> {
    [
        ("http://a.example/", "http://b.example/", "B site", "0.5", "1700000000000", "outlink"),
        ("http://a.example/", "http://c.example/", "see C", "0.25", "1700000001000", "outlink"),
        ("http://b.example/", "http://a.example/", "home", "1.0", "1700000002000", "inlink"),
        ("http://c.example/", "http://a.example/", "", "0.125", "1700000003000", "inlink"),
    ]
    .into_iter()
    .map(|(key, url, anchor, score, ts, ty)| {
        (
            key.to_string(),
            format!("url: {url}\nanchor: {anchor}\nscore: {score}\ntimestamp: {ts}\nlinktype: {ty}"),
        )
    })
    .collect()
}

/// Node score records keyed by URL, matching the node schema.
#[must_use]
pub fn sample_node_records() -> Vec<(String, String)> {
    [
        ("http://a.example/", 2, 2, "1.125", "0.75", "lang=en"),
        ("http://b.example/", 1, 1, "0.5", "1.0", ""),
        ("http://c.example/", 1, 1, "0.25", "0.125", "lang=fr"),
    ]
    .into_iter()
    .map(|(key, inl, outl, ins, outs, meta)| {
        (
            key.to_string(),
            format!(
                "num_inlinks: {inl}\nnum_outlinks: {outl}\ninlink_score: {ins}\n\
                 outlink_score: {outs}\nmetadata: {meta}"
            ),
        )
    })
    .collect()
}

/// `n` text records laid out like CrawlDatum dumps, keyed `http://host/{i}`.
#[must_use]
pub fn sample_crawl_records(n: usize) -> Vec<(String, String)> {
    (0..n)
        .map(|i| {
            (
                format!("http://host/{i}"),
                format!("Version: 7\nStatus: {}\nFetch interval: 2592000\nScore: {i}.0", 1 + i % 3),
            )
        })
        .collect()
}

/// [`sample_link_records`] as `(Text, LinkDatum)` pairs.
#[must_use]
pub fn sample_link_datums() -> Vec<(Writable, Writable)> {
    [
        ("http://a.example/", "http://b.example/", "B site", 0.5, 1_700_000_000_000, LinkDatum::OUTLINK),
        ("http://a.example/", "http://c.example/", "see C", 0.25, 1_700_000_001_000, LinkDatum::OUTLINK),
        ("http://b.example/", "http://a.example/", "home", 1.0, 1_700_000_002_000, LinkDatum::INLINK),
        ("http://c.example/", "http://a.example/", "", 0.125, 1_700_000_003_000, LinkDatum::INLINK),
    ]
    .into_iter()
    .map(|(key, url, anchor, score, timestamp, link_type)| {
        let link = LinkDatum {
            url: url.to_string(),
            anchor: anchor.to_string(),
            score,
            timestamp,
            link_type,
        };
        (Writable::from(key), Writable::Link(link))
    })
    .collect()
}

/// [`sample_node_records`] as `(Text, Node)` pairs.
#[must_use]
pub fn sample_node_datums() -> Vec<(Writable, Writable)> {
    [
        ("http://a.example/", 2, 2, 1.125, 0.75, Some("en")),
        ("http://b.example/", 1, 1, 0.5, 1.0, None),
        ("http://c.example/", 1, 1, 0.25, 0.125, Some("fr")),
    ]
    .into_iter()
    .map(|(key, num_inlinks, num_outlinks, inlink_score, outlink_score, lang)| {
        let node = NodeDatum {
            num_inlinks,
            num_outlinks,
            inlink_score,
            outlink_score,
            metadata: lang
                .map(|l| vec![("lang".to_string(), vec![l.to_string()])])
                .unwrap_or_default(),
        };
        (Writable::from(key), Writable::Node(node))
    })
    .collect()
}

/// Borrow owned pairs as `&str` pairs for the writer helpers.
pub fn as_str_pairs(records: &[(String, String)]) -> Vec<(&str, &str)> {
    records.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}
