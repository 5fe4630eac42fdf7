//! Temporary container files for tests.
//!
//! This module provides utilities for testing readers against real
//! SequenceFiles written to temporary locations.

use anyhow::Result;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

use super::writer::{SequenceFileWriter, WriterOptions};
use crate::io::seqfile::writable::{TEXT, class_of};
use crate::record::Writable;

/// A temporary file that is automatically deleted when dropped.
pub struct TempFilePath {
    #[allow(dead_code)]
    temp_file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// Create a new temporary file.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_file = tempfile::Builder::new().suffix(".seq").tempfile()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for TempFilePath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// A temporary directory that is automatically deleted when dropped.
pub struct TempDirPath {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// Create a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A path inside this directory. Parent directories are not created.
    #[must_use]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

/// Write `records` to `path` as a SequenceFile.
///
/// Key and value classes are taken from the first record; an empty slice
/// produces a `Text`/`Text` file with no records.
///
/// # Errors
///
/// Returns an error if the file cannot be written or a record does not match
/// the classes of the first one.
pub fn write_sequence_file(
    path: impl AsRef<Path>,
    records: &[(Writable, Writable)],
    options: WriterOptions,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let (key_class, value_class) = records
        .first()
        .map_or((TEXT, TEXT), |(k, v)| (class_of(k), class_of(v)));
    let out = BufWriter::new(File::create(path)?);
    let mut writer = SequenceFileWriter::new(out, key_class, value_class, options)?;
    for (k, v) in records {
        writer.append(k, v)?;
    }
    writer.finish()?;
    Ok(())
}

/// Write `Text`/`Text` records to `path`, uncompressed.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_text_file(path: impl AsRef<Path>, records: &[(&str, &str)]) -> Result<()> {
    write_sequence_file(path, &text_records(records), WriterOptions::default())
}

/// Create a temporary uncompressed `Text`/`Text` SequenceFile.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written.
///
/// # Example
///
/// ```
/// use seqreader::testing::mock_sequence_file;
/// use seqreader::readers::sequence_reader;
///
/// let file = mock_sequence_file(&[("http://a/", "Status: 2\nScore: 1.0")]).unwrap();
/// assert_eq!(sequence_reader().count(file.path()).unwrap(), 1);
/// ```
pub fn mock_sequence_file(records: &[(&str, &str)]) -> Result<TempFilePath> {
    mock_sequence_file_with(&text_records(records), WriterOptions::default())
}

/// Create a temporary SequenceFile with arbitrary writables and options.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written.
pub fn mock_sequence_file_with(
    records: &[(Writable, Writable)],
    options: WriterOptions,
) -> Result<TempFilePath> {
    let temp = TempFilePath::new()?;
    write_sequence_file(temp.path(), records, options)?;
    Ok(temp)
}

/// Convert string pairs into `Text` writables.
pub fn text_records(records: &[(&str, &str)]) -> Vec<(Writable, Writable)> {
    records
        .iter()
        .map(|(k, v)| (Writable::from(*k), Writable::from(*v)))
        .collect()
}
