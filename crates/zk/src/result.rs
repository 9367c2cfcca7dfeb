//! Verification outcomes and batch summaries.

use serde::Serialize;

/// Identifiers and inputs attached to a verification that ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationDetails {
    pub public_signals: Vec<String>,
    pub proof_hash: String,
    pub verification_key_hash: String,
}

/// Outcome of a single proof verification.
///
/// `success` says whether the verification routine ran to completion;
/// `verified` is the cryptographic answer and is only ever true when
/// `success` is true. Fields are private so the constructors can hold that.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    success: bool,
    verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    verification_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<VerificationDetails>,
}

impl VerificationResult {
    /// The routine ran; `verified` carries its answer.
    pub fn completed(verified: bool, elapsed_ms: f64, details: VerificationDetails) -> Self {
        Self {
            success: true,
            verified,
            verification_time_ms: Some(elapsed_ms),
            errors: Vec::new(),
            details: Some(details),
        }
    }

    /// The routine could not run.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::failed_with(vec![error.into()], None)
    }

    pub fn failed_with(errors: Vec<String>, details: Option<VerificationDetails>) -> Self {
        Self {
            success: false,
            verified: false,
            verification_time_ms: None,
            errors,
            details,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    pub fn verification_time_ms(&self) -> Option<f64> {
        self.verification_time_ms
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn details(&self) -> Option<&VerificationDetails> {
        self.details.as_ref()
    }
}

/// Aggregate view over a batch of verification results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub verified: usize,
    /// Ran to completion but the proof was rejected.
    pub failed: usize,
    /// Could not run at all.
    pub errors: usize,
    /// Mean over results that ran; failed-to-run entries are excluded.
    pub average_verification_time_ms: Option<f64>,
}

impl BatchSummary {
    pub fn from_results(results: &[VerificationResult]) -> Self {
        let timings: Vec<f64> = results
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.verification_time_ms)
            .collect();
        let average_verification_time_ms = if timings.is_empty() {
            None
        } else {
            Some(timings.iter().sum::<f64>() / timings.len() as f64)
        };

        Self {
            total: results.len(),
            verified: results.iter().filter(|r| r.verified).count(),
            failed: results.iter().filter(|r| r.success && !r.verified).count(),
            errors: results.iter().filter(|r| !r.success).count(),
            average_verification_time_ms,
        }
    }
}
