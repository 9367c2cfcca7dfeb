//! Error types for proof verification.

use std::path::PathBuf;

/// Errors raised while loading, parsing or checking proof artifacts.
///
/// These never escape [`crate::ProofVerifier::verify`]; they are folded into
/// a [`crate::VerificationResult`] with `success = false`.
#[derive(Debug, thiserror::Error)]
pub enum ZkError {
    #[error("unsupported proving system: {0}")]
    UnsupportedSystem(String),

    #[error("verification key not found: {0}")]
    KeyNotFound(String),

    #[error("verification key for circuit '{0}' is already published with different content")]
    KeyAlreadyPublished(String),

    #[error("invalid circuit name {0:?}: use letters, digits, '_' or '-'")]
    InvalidCircuitName(String),

    #[error("no verification key store configured")]
    KeyStoreUnavailable,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed {what}: {reason}")]
    Malformed { what: String, reason: String },

    #[error("{0} is not a canonical field element")]
    FieldOverflow(String),

    #[error("{0} is not a valid curve point")]
    NotWellFormed(String),

    #[error("expected {expected} public signals, got {actual}")]
    PublicInputCount { expected: usize, actual: usize },

    #[error("verification aborted: {0}")]
    Verification(String),

    #[error("verification task failed: {0}")]
    Join(String),
}

impl ZkError {
    pub(crate) fn malformed(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            what: what.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ZkError>;
