//! Shared error type for the sync pipeline.

use thiserror::Error;

/// Errors surfaced by the reconciliation pipeline and its collaborators.
///
/// Variants carry rendered messages rather than source chains: every
/// external failure is terminal for the node being processed, and the
/// rendered form is what ends up in the per-node error log.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Required configuration is missing or malformed at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// The storage provider rejected or failed a node request.
    #[error("storage provider error: {0}")]
    Provider(String),

    /// The metadata/chunk store rejected or failed a request.
    #[error("metadata store error: {0}")]
    Storage(String),

    /// The embedding provider failed; aborts the whole document.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Transport-level HTTP failure before a status was obtained.
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SyncError {
    /// Renders a non-success HTTP response into a provider error.
    pub fn provider_status(status: reqwest::StatusCode, context: &str) -> Self {
        SyncError::Provider(format!("{context} failed with status {status}"))
    }

    /// Renders a non-success HTTP response into a store error.
    pub fn storage_status(status: reqwest::StatusCode, context: &str) -> Self {
        SyncError::Storage(format!("{context} failed with status {status}"))
    }
}
