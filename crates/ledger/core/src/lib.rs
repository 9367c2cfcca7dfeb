//! Ledger abstraction for the attestation pipeline.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: SubmissionIndex (domain reads: attestation history)
//!
//! Layer 0: LedgerConnector → LedgerSession (pure infrastructure)
//!          contract execute/call, topics, token classes, mint, transfer
//! ```
//!
//! A [`LedgerSession`] is bound to one set of operator credentials and is
//! scoped to a single logical operation. Implementations release their
//! network client when the session is dropped, so every exit path closes it.
//!
//! # Usage
//!
//! ```ignore
//! use ledger_core::{LedgerConnector, OperatorCredentials};
//!
//! async fn submit(connector: &dyn LedgerConnector, creds: &OperatorCredentials) {
//!     let session = connector.connect(creds).await?;
//!     let tx = session.submit_message(&topic, b"{}").await?;
//! } // session dropped here, client released
//! ```

pub mod error;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{LedgerError, status};
pub use traits::{LedgerConnector, LedgerSession, SubmissionIndex};
pub use types::{
    AccountId, ContractExecution, ContractId, LedgerStatus, MintReceipt, OperatorCredentials,
    ProofSubmission, SubmissionListing, TokenClassSpec, TokenId, TopicId, TransactionId,
    explorer_url,
};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{ContractOutcome, MockFailure, MockLedger, RecordedMessage};
