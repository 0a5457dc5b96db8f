//! Error types produced while scanning vault history.

use crate::vaults::MAX_BLOCK_SPAN;

/// Errors that abort the scan of a single requested block.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The chain-data backend failed to answer a log query.
    #[error("log query [{from}, {to}] failed: {message}")]
    Rpc {
        /// First block of the failed sub-range.
        from: u64,
        /// Last block of the failed sub-range.
        to: u64,
        /// Backend error message.
        message: String,
    },

    /// A log query was asked to cover more blocks than the API accepts.
    #[error("block range [{from}, {to}] exceeds the {MAX_BLOCK_SPAN}-block query cap")]
    SpanTooLarge {
        /// First block of the rejected range.
        from: u64,
        /// Last block of the rejected range.
        to: u64,
    },

    /// A log query whose end lies before its start.
    #[error("inverted block range [{from}, {to}]")]
    InvertedRange {
        /// First block of the rejected range.
        from: u64,
        /// Last block of the rejected range.
        to: u64,
    },

    /// A log could not be decoded into a typed `Transfer` event.
    #[error("malformed Transfer log: {0}")]
    Decode(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = ScanError> = std::result::Result<T, E>;
