//! Zero-knowledge proof verification for snarkjs-format artifacts.
//!
//! This crate checks proofs produced by the snarkjs toolchain against their
//! verification keys, entirely off-chain:
//! - **Structure validation**: cheap shape checks before any cryptography
//! - **Verification**: Groth16 and PLONK pairing checks on BN254 (arkworks)
//! - **Key store**: file-backed verification keys addressed by circuit name
//!
//! # Result semantics
//!
//! Every verification produces a [`VerificationResult`]. A verification that
//! *ran* reports `success = true` with the cryptographic outcome in
//! `verified`. A verification that could not run (malformed input, missing
//! key, unsupported system) reports `success = false, verified = false`
//! and never panics.
//!
//! # Examples
//!
//! ```no_run
//! use zk::{ProofVerifier, ProvingSystem};
//!
//! # async fn run(vk: serde_json::Value, proof: serde_json::Value) {
//! let verifier = ProofVerifier::new();
//! let result = verifier
//!     .verify(&vk, &["33".to_string()], &proof, ProvingSystem::Groth16)
//!     .await;
//! assert!(!result.verified() || result.success());
//! # }
//! ```

pub mod content_id;
pub mod error;
pub mod key_store;
pub mod result;
pub mod snarkjs;
pub mod solidity;
pub mod system;
pub mod validate;
pub mod verifier;

pub use content_id::content_id;
pub use error::{Result, ZkError};
pub use key_store::{KeyStoreConfig, VerificationKeyStore};
pub use result::{BatchSummary, VerificationDetails, VerificationResult};
pub use solidity::SolidityCallArgs;
pub use system::ProvingSystem;
pub use validate::{
    ValidationReport, validate_proof, validate_public_signals, validate_verification_key,
};
pub use verifier::{ProofBundle, ProofVerifier, VerificationRequest};
