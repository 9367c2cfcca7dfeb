//! Hedera implementation of the ledger abstraction.
//!
//! - [`HederaConfig`]: network selection, operator, mirror and explorer hosts
//! - [`MirrorIndexReader`]: attestation history from the mirror node REST API
//! - [`sdk::HederaConnector`] (feature `sdk`): sessions over the Hedera SDK
//!
//! The mirror reader is plain HTTP and never signs anything, so it is
//! available without the SDK.

pub mod config;
pub mod mirror;

#[cfg(feature = "sdk")]
pub mod sdk;

pub use config::{HederaConfig, HederaNetwork};
pub use mirror::MirrorIndexReader;

#[cfg(feature = "sdk")]
pub use sdk::HederaConnector;
