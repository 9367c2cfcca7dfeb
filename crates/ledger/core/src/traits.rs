//! Ledger abstraction traits.
//!
//! - Layer 0: [`LedgerConnector`] opens a [`LedgerSession`] (pure infrastructure)
//! - Layer 1: [`SubmissionIndex`] (attestation history reads)

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::types::{
    AccountId, ContractExecution, ContractId, MintReceipt, OperatorCredentials, SubmissionListing,
    TokenClassSpec, TokenId, TopicId, TransactionId,
};

// ============================================================================
// Layer 0: Pure Infrastructure
// ============================================================================

/// Opens ledger sessions for a configured network.
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    /// Network name as used in explorer URLs (`testnet`, `mainnet`, ...).
    fn network(&self) -> &str;

    /// Opens a session signing with `credentials`.
    ///
    /// The returned session owns its network client and releases it on drop.
    async fn connect(
        &self,
        credentials: &OperatorCredentials,
    ) -> Result<Box<dyn LedgerSession>, LedgerError>;
}

/// One operator-bound client handle, scoped to a single logical operation.
///
/// Every transaction method waits for the receipt; a non-success receipt
/// status surfaces as [`LedgerError::Status`].
#[async_trait]
pub trait LedgerSession: Send + Sync {
    /// Account paying for and signing transactions.
    fn operator(&self) -> &AccountId;

    /// Executes raw, selector-prefixed call data against a contract.
    async fn execute_contract(
        &self,
        contract: &ContractId,
        call_data: &[u8],
        gas: u64,
    ) -> Result<ContractExecution, LedgerError>;

    /// Read-only call with raw call data; returns the raw return bytes.
    async fn call_contract(
        &self,
        contract: &ContractId,
        call_data: &[u8],
        gas: u64,
    ) -> Result<Vec<u8>, LedgerError>;

    /// Creates a topic with the operator key as admin and submit key.
    ///
    /// `Ok(None)` when the receipt carries no topic id.
    async fn create_topic(&self, memo: &str) -> Result<Option<TopicId>, LedgerError>;

    /// Appends one message to a topic.
    async fn submit_message(
        &self,
        topic: &TopicId,
        message: &[u8],
    ) -> Result<TransactionId, LedgerError>;

    /// Creates a non-fungible token class. `Ok(None)` when the receipt
    /// carries no token id.
    async fn create_token(&self, spec: &TokenClassSpec) -> Result<Option<TokenId>, LedgerError>;

    /// Mints one token carrying `metadata`.
    async fn mint(&self, token: &TokenId, metadata: Vec<u8>) -> Result<MintReceipt, LedgerError>;

    /// Moves one NFT from the operator to `recipient`, paired with a
    /// `fee_tinybars` transfer of the native unit in the same direction.
    async fn transfer_nft(
        &self,
        token: &TokenId,
        serial: u64,
        recipient: &AccountId,
        fee_tinybars: u64,
    ) -> Result<TransactionId, LedgerError>;
}

// ============================================================================
// Layer 1: Domain Traits
// ============================================================================

/// Read access to attestation history.
#[async_trait]
pub trait SubmissionIndex: Send + Sync {
    /// Up to `limit` submissions on `topic`, newest first.
    ///
    /// Never fails: an unreadable index yields [`SubmissionListing::Degraded`].
    async fn list_submissions(&self, topic: &TopicId, limit: usize) -> SubmissionListing;
}
