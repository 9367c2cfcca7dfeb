//! Ledger error type.

/// Well-known ledger response codes.
pub mod status {
    pub const SUCCESS: i32 = 22;
    /// The contract reverted during execution.
    pub const CONTRACT_REVERT_EXECUTED: i32 = 33;
}

/// Failures talking to the ledger.
///
/// Chain failures are propagated to the caller; nothing in this workspace
/// retries them automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Network error: {0}")]
    Network(String),

    /// A receipt or query came back with a non-success status code.
    #[error("Ledger status {name} ({code})")]
    Status { code: i32, name: String },

    /// The ledger refused the transaction before consensus.
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    pub fn status(code: i32, name: impl Into<String>) -> Self {
        Self::Status {
            code,
            name: name.into(),
        }
    }

    /// True for `CONTRACT_REVERT_EXECUTED`.
    pub fn is_contract_revert(&self) -> bool {
        matches!(self, Self::Status { code, .. } if *code == status::CONTRACT_REVERT_EXECUTED)
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
