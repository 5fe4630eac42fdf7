//! Assertion functions for reader outputs.

use std::fmt::Debug;

use super::fake_source::FakeRecordSource;
use crate::error::{ErrorKind, Result};
use crate::record::Record;

/// Assert that `records` carry exactly `expected` keys, in order.
///
/// # Panics
///
/// Panics if the key sequences differ.
///
/// # Example
///
/// ```
/// use seqreader::{Record, Document, testing::assert_keys};
///
/// let r = Record { key: "a".into(), document: Document::new() };
/// assert_keys(&[r], &["a"]);
/// ```
pub fn assert_keys(records: &[Record], expected: &[&str]) {
    let actual: Vec<String> = records.iter().map(|r| r.key.to_text().into_owned()).collect();
    assert_eq!(
        actual, expected,
        "Key mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert that `result` failed with `kind`.
///
/// # Panics
///
/// Panics if `result` is `Ok` or carries a different kind.
pub fn assert_error_kind<T: Debug>(result: Result<T>, kind: &ErrorKind) {
    match result {
        Ok(v) => panic!("Expected {kind:?} error, got Ok({v:?})"),
        Err(e) => assert_eq!(e.kind(), kind, "Unexpected error: {e}"),
    }
}

/// Assert that every handle the fake source handed out was closed.
///
/// # Panics
///
/// Panics if any opened iterator is still live.
pub fn assert_all_released(source: &FakeRecordSource) {
    assert_eq!(
        source.open_handles(),
        0,
        "Unreleased handles:\n  Events: {:?}",
        source.events()
    );
}
