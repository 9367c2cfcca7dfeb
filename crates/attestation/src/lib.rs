//! Ledger attestation pipeline for verified proofs.
//!
//! Builds on the proof verifier in `zk` and the chain-agnostic ledger traits
//! in `ledger-core`:
//! - [`bridge`] re-checks a Groth16 proof through an EVM verifier contract
//! - [`consensus`] appends proof submissions to a consensus topic
//! - [`rewards`] manages per-level NFT classes, minting, and transfers
//! - [`orchestrator`] sequences attestation and reward issuance for one level
//! - [`leaderboard`] aggregates attestation history per user
//! - [`services`] wires one instance of everything per process configuration
pub mod bridge;
pub mod config;
pub mod consensus;
pub mod error;
pub mod leaderboard;
pub mod orchestrator;
pub mod rewards;
pub mod services;

pub use bridge::{OnChainVerification, OnChainVerificationBridge, ResultSource, encode_verify_proof};
pub use config::AttestationConfig;
pub use consensus::ConsensusLogSubmitter;
pub use error::{AttestationError, Result};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use orchestrator::{CompletionReport, LevelCompletion, LevelCompletionOrchestrator, TransferOutcome};
pub use rewards::{MAX_METADATA_BYTES, NftMetadata, RewardIssuer, TokenClassRegistry};
pub use services::{LedgerServices, Services, ServicesBuilder};
