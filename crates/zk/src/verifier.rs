//! Asynchronous proof verification.
//!
//! Pairing checks are CPU-bound, so every verification runs on tokio's
//! blocking pool and is timed there. Failures of any kind are folded into
//! the returned [`VerificationResult`]; nothing here panics on bad input.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::snarkjs::{groth16, plonk};
use crate::system::VerificationRoutine;
use crate::{
    ProvingSystem, Result, VerificationDetails, VerificationKeyStore, VerificationResult, ZkError,
    content_id,
};

/// One proof with its public signals, as submitted in a batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofBundle {
    pub proof: Value,
    pub public_signals: Vec<String>,
}

/// A self-contained verification request, with the system still as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub verification_key: Value,
    pub public_signals: Vec<String>,
    pub proof: Value,
    #[serde(default = "default_system")]
    pub system: String,
}

fn default_system() -> String {
    ProvingSystem::Groth16.protocol_tag().to_string()
}

/// Verifies proofs against verification keys.
///
/// Cheap to clone; the optional key store is shared.
#[derive(Clone, Default)]
pub struct ProofVerifier {
    key_store: Option<Arc<VerificationKeyStore>>,
}

impl ProofVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables [`ProofVerifier::verify_with_stored_key`].
    pub fn with_key_store(key_store: Arc<VerificationKeyStore>) -> Self {
        Self {
            key_store: Some(key_store),
        }
    }

    pub fn key_store(&self) -> Option<&Arc<VerificationKeyStore>> {
        self.key_store.as_ref()
    }

    /// Verifies one proof.
    ///
    /// `success = false` whenever the proof, key or signals cannot be
    /// interpreted; otherwise `verified` is the pairing-check outcome.
    pub async fn verify(
        &self,
        verification_key: &Value,
        public_signals: &[String],
        proof: &Value,
        system: ProvingSystem,
    ) -> VerificationResult {
        let details = VerificationDetails {
            public_signals: public_signals.to_vec(),
            proof_hash: content_id(proof),
            verification_key_hash: content_id(verification_key),
        };

        let vk = verification_key.clone();
        let signals = public_signals.to_vec();
        let proof = proof.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let result = run_routine(system.routine(), &vk, &signals, &proof);
            (result, start.elapsed())
        })
        .await;

        match outcome {
            Ok((Ok(verified), elapsed)) => {
                let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
                info!(
                    %system,
                    verified,
                    elapsed_ms,
                    proof = %details.proof_hash,
                    "Proof verification completed"
                );
                VerificationResult::completed(verified, elapsed_ms, details)
            }
            Ok((Err(e), _)) => {
                warn!(%system, proof = %details.proof_hash, error = %e, "Proof verification failed to run");
                VerificationResult::failed_with(vec![e.to_string()], Some(details))
            }
            Err(join) => {
                let e = ZkError::Join(join.to_string());
                warn!(%system, error = %e, "Proof verification task aborted");
                VerificationResult::failed_with(vec![e.to_string()], Some(details))
            }
        }
    }

    /// Verifies a request whose proving system is still a string.
    pub async fn verify_request(&self, request: &VerificationRequest) -> VerificationResult {
        match request.system.parse::<ProvingSystem>() {
            Ok(system) => {
                self.verify(
                    &request.verification_key,
                    &request.public_signals,
                    &request.proof,
                    system,
                )
                .await
            }
            Err(e) => {
                warn!(system = %request.system, "Rejected verification request");
                VerificationResult::failed(e.to_string())
            }
        }
    }

    /// Verifies proofs one after another against the same key.
    ///
    /// Results are positionally aligned with `proofs`.
    pub async fn batch_verify(
        &self,
        verification_key: &Value,
        proofs: &[ProofBundle],
        system: ProvingSystem,
    ) -> Vec<VerificationResult> {
        debug!(count = proofs.len(), %system, "Starting batch verification");

        let mut results = Vec::with_capacity(proofs.len());
        for bundle in proofs {
            results.push(
                self.verify(verification_key, &bundle.public_signals, &bundle.proof, system)
                    .await,
            );
        }
        results
    }

    /// Loads the key published for `circuit` and verifies against it.
    ///
    /// Fails with [`ZkError::KeyNotFound`] naming the circuit when no key is
    /// stored for it.
    pub async fn verify_with_stored_key(
        &self,
        circuit: &str,
        public_signals: &[String],
        proof: &Value,
        system: ProvingSystem,
    ) -> Result<VerificationResult> {
        let store = self.key_store.as_ref().ok_or(ZkError::KeyStoreUnavailable)?;
        let verification_key = store.load_for_circuit(circuit)?;
        Ok(self
            .verify(&verification_key, public_signals, proof, system)
            .await)
    }
}

fn run_routine(
    routine: VerificationRoutine,
    vk: &Value,
    public_signals: &[String],
    proof: &Value,
) -> Result<bool> {
    match routine {
        VerificationRoutine::Groth16 => groth16::verify(vk, public_signals, proof),
        VerificationRoutine::Plonk => plonk::verify(vk, public_signals, proof),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::BatchSummary;
    use crate::snarkjs::groth16::fixtures::groth16_fixture;
    use crate::snarkjs::plonk::fixtures::plonk_fixture;

    #[tokio::test]
    async fn verifies_groth16_proof() {
        let f = groth16_fixture();
        let result = ProofVerifier::new()
            .verify(&f.vk, &f.public_signals, &f.proof, ProvingSystem::Groth16)
            .await;

        assert!(result.success());
        assert!(result.verified());
        assert!(result.verification_time_ms().is_some());
        let details = result.details().unwrap();
        assert_eq!(details.public_signals, f.public_signals);
        assert_eq!(details.proof_hash, content_id(&f.proof));
    }

    #[tokio::test]
    async fn wrong_signal_runs_but_does_not_verify() {
        let f = groth16_fixture();
        let result = ProofVerifier::new()
            .verify(&f.vk, &["99".to_string()], &f.proof, ProvingSystem::Groth16)
            .await;

        assert!(result.success());
        assert!(!result.verified());
    }

    #[tokio::test]
    async fn malformed_proof_fails_without_panicking() {
        let f = groth16_fixture();
        let proof = json!({ "pi_a": "garbage", "protocol": "groth16" });
        let result = ProofVerifier::new()
            .verify(&f.vk, &f.public_signals, &proof, ProvingSystem::Groth16)
            .await;

        assert!(!result.success());
        assert!(!result.verified());
        assert!(!result.errors().is_empty());
    }

    #[tokio::test]
    async fn overflowing_public_signal_fails() {
        let f = groth16_fixture();
        let too_big = "21888242871839275222246405745257275088548364400416034343698204186575808495617";
        let result = ProofVerifier::new()
            .verify(&f.vk, &[too_big.to_string()], &f.proof, ProvingSystem::Groth16)
            .await;

        assert!(!result.success());
    }

    #[tokio::test]
    async fn fflonk_tag_uses_plonk_routine() {
        let f = plonk_fixture();
        let result = ProofVerifier::new()
            .verify(&f.vk, &f.public_signals, &f.proof, ProvingSystem::Fflonk)
            .await;

        assert!(result.success());
        assert!(result.verified());
    }

    #[tokio::test]
    async fn unsupported_system_request_fails() {
        let f = groth16_fixture();
        let request = VerificationRequest {
            verification_key: f.vk,
            public_signals: f.public_signals,
            proof: f.proof,
            system: "stark".into(),
        };

        let result = ProofVerifier::new().verify_request(&request).await;
        assert!(!result.success());
        assert!(result.errors()[0].contains("stark"));
    }

    #[tokio::test]
    async fn batch_results_are_positionally_aligned() {
        let f = groth16_fixture();
        let bundles = vec![
            ProofBundle {
                proof: f.proof.clone(),
                public_signals: f.public_signals.clone(),
            },
            ProofBundle {
                proof: f.proof.clone(),
                public_signals: vec!["16".into()],
            },
            ProofBundle {
                proof: json!("not a proof"),
                public_signals: f.public_signals.clone(),
            },
        ];

        let results = ProofVerifier::new()
            .batch_verify(&f.vk, &bundles, ProvingSystem::Groth16)
            .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].verified());
        assert!(results[1].success() && !results[1].verified());
        assert!(!results[2].success());

        let summary = BatchSummary::from_results(&results);
        assert_eq!((summary.verified, summary.failed, summary.errors), (1, 1, 1));
    }

    #[tokio::test]
    async fn empty_batch_yields_no_results() {
        let f = groth16_fixture();
        let results = ProofVerifier::new()
            .batch_verify(&f.vk, &[], ProvingSystem::Groth16)
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn stored_key_lookup_names_missing_circuit() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(VerificationKeyStore::new(dir.path()));
        let verifier = ProofVerifier::with_key_store(store.clone());
        let f = groth16_fixture();

        let err = verifier
            .verify_with_stored_key("level_1", &f.public_signals, &f.proof, ProvingSystem::Groth16)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("level_1"));

        store.save("level_1", &f.vk).unwrap();
        let result = verifier
            .verify_with_stored_key("level_1", &f.public_signals, &f.proof, ProvingSystem::Groth16)
            .await
            .unwrap();
        assert!(result.verified());
    }
}
