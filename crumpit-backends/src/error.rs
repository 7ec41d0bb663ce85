//! Error types for the backends crate.

use crumpit_core::BackendKind;

/// Errors raised while connecting to or querying a backend collaborator.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BackendError {
    /// The store could not be reached.
    #[error("{kind} unavailable: {reason}")]
    Unavailable { kind: BackendKind, reason: String },

    /// The store was reached but the operation failed.
    #[error("query failed: {0}")]
    Query(String),

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
