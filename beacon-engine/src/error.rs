//! Error types for the Beacon engine
//!
//! Per-provider and per-metric failures are absorbed into score
//! degradation plus warnings; nothing below the batch level escapes as an
//! error. These variants cover the few conditions that do.

use thiserror::Error;

/// Engine error type
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed caller input (bad URL, empty batch)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Page inspection failed; the URL cannot be scored
    #[error("page inspection failed for {url}: {message}")]
    PageInspection { url: String, message: String },

    /// Zero URLs in the batch could be analyzed
    #[error("no URLs could be analyzed: {0}")]
    Exhausted(String),

    /// The batch was cancelled by the caller
    #[error("batch cancelled")]
    Cancelled,

    /// Admission control rejected the batch
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// beacon-common error
    #[error("common error: {0}")]
    Common(#[from] beacon_common::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
