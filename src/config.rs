//! Reader configuration.

/// Settings applied by the SequenceFile backend and the bulk readers.
///
/// Construct with `ReaderConfig::default()` and override fields directly or
/// through the chained setters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Capacity of the buffered reader wrapped around each container file.
    pub buffer_size: usize,
    /// Compare every sync marker in the stream with the one in the header.
    pub verify_sync: bool,
    /// Upper bound on a single record, block buffer or header string.
    /// Lengths above it are treated as corruption.
    pub max_record_len: usize,
    /// Row count used by `head_default`.
    pub default_head_rows: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024,
            verify_sync: true,
            max_record_len: 64 * 1024 * 1024,
            default_head_rows: 5,
        }
    }
}

impl ReaderConfig {
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    pub fn verify_sync(mut self, enabled: bool) -> Self {
        self.verify_sync = enabled;
        self
    }

    pub fn max_record_len(mut self, len: usize) -> Self {
        self.max_record_len = len;
        self
    }

    pub fn default_head_rows(mut self, rows: usize) -> Self {
        self.default_head_rows = rows;
        self
    }
}
