//! Path expansion for multi-file reads.
//!
//! Hadoop jobs write one container per reducer (`part-00000`, `part-00001`, ...),
//! and map-file outputs nest the container as `part-XXXXX/data`. These helpers
//! turn patterns and output directories into the ordered path lists consumed by
//! [`MultiFileCursor`](crate::multi::MultiFileCursor).
//!
//! ```no_run
//! use seqreader::io::glob::{expand_paths, segment_parts};
//!
//! let linkdb = segment_parts("crawl/linkdb/current")?;
//! let segments = expand_paths(&["crawl/segments/*/parse_data/part-*/data"])?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result, bail};
use glob::glob;
use std::path::{Path, PathBuf};

/// Expand glob patterns into a sorted, de-duplicated list of files.
///
/// Directories matched by a pattern are ignored. A pattern matching nothing
/// contributes nothing.
///
/// # Errors
/// Returns an error for an invalid pattern or an unreadable glob entry.
pub fn expand_paths<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut result = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let entries = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
            if path.is_file() {
                result.push(path);
            }
        }
    }
    result.sort();
    result.dedup();
    Ok(result)
}

/// List the `part-*` containers of a Hadoop output directory in part order.
///
/// Both plain part files and map-file directories (`part-XXXXX/data`) are
/// recognised. Hidden and underscore-prefixed entries such as `_SUCCESS` or
/// `.part-00000.crc` are skipped.
///
/// # Errors
/// Returns an error if `dir` is not a readable directory or contains no parts.
pub fn segment_parts(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))?;
    let mut parts = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with("part-") {
            continue;
        }
        let path = entry.path();
        if path.is_file() {
            parts.push(path);
        } else if path.join("data").is_file() {
            parts.push(path.join("data"));
        }
    }
    if parts.is_empty() {
        bail!("no part files under {}", dir.display());
    }
    parts.sort();
    Ok(parts)
}
