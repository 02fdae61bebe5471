//! Error types for the SiteBrief core.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced by the core pipeline.
///
/// Validation and authorization failures are resolved at the HTTP boundary;
/// upstream provider failures are absorbed into fallback transcript entries by
/// the conversation orchestrator; storage failures are the only class expected
/// to bubble to the end caller as a hard error.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A required request field is missing or blank. Rejected before any
    /// external call.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid, or expired reviewer credential.
    #[error("{0}")]
    Unauthorized(String),

    /// A referenced identity or record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The text-generation provider call failed (network, auth, rate limit).
    #[error("upstream provider error: {0}")]
    Upstream(String),

    /// The record store failed. Inserts are all-or-nothing, so no partial
    /// record is left behind.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// A stored document could not be decoded.
    #[error("malformed stored record: {0}")]
    Codec(#[from] serde_json::Error),
}
