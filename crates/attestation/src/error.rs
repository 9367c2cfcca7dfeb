//! Errors surfaced by the attestation pipeline.

use ledger_core::{ContractId, LedgerError, TokenId};
use thiserror::Error;
use zk::ZkError;

pub type Result<T> = std::result::Result<T, AttestationError>;

#[derive(Debug, Error)]
pub enum AttestationError {
    /// The verifier contract reverted: the proof is invalid on-chain.
    #[error("proof verification failed on-chain: contract {contract} reverted")]
    VerificationFailedOnChain { contract: ContractId },

    #[error("consensus topic not initialized; create or configure a topic first")]
    TopicNotInitialized,

    #[error("topic creation receipt carried no topic id")]
    TopicCreationFailed,

    #[error("token class creation for level '{level}' failed: {reason}")]
    TokenCreationFailed { level: String, reason: String },

    #[error("mint on token {token} failed: {reason}")]
    MintFailed { token: TokenId, reason: String },

    #[error("transfer of {token} #{serial} failed: {reason}")]
    TransferFailed {
        token: TokenId,
        serial: u64,
        reason: String,
    },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Zk(#[from] ZkError),
}

impl From<serde_json::Error> for AttestationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encoding(e.to_string())
    }
}
