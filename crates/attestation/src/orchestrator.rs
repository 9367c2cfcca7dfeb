//! Level completion workflow.
//!
//! `submit attestation -> ensure token class -> mint -> (optional) transfer`,
//! single pass. Only the attestation is mandatory: once it is recorded, later
//! failures are reported in the [`CompletionReport`] instead of failing the call.

use std::collections::BTreeMap;
use std::sync::Arc;

use ledger_core::{AccountId, ProofSubmission, TokenId, TransactionId};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::consensus::ConsensusLogSubmitter;
use crate::error::Result;
use crate::rewards::{NftMetadata, RewardIssuer};

/// A verified completion to attest and reward.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelCompletion {
    pub level: String,
    pub user_id: String,
    pub proof_hash: String,
    /// Milliseconds since the Unix epoch; `None` means now.
    pub timestamp: Option<i64>,
    /// Reward destination; no transfer when absent.
    pub recipient: Option<AccountId>,
    pub image: String,
    pub metadata: BTreeMap<String, Value>,
}

impl LevelCompletion {
    pub fn new(
        level: impl Into<String>,
        user_id: impl Into<String>,
        proof_hash: impl Into<String>,
    ) -> Self {
        Self {
            level: level.into(),
            user_id: user_id.into(),
            proof_hash: proof_hash.into(),
            timestamp: None,
            recipient: None,
            image: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_recipient(mut self, recipient: AccountId) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    fn submission(&self) -> ProofSubmission {
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
        ProofSubmission {
            level: self.level.clone(),
            proof_hash: self.proof_hash.clone(),
            user_id: self.user_id.clone(),
            timestamp,
            metadata: self.metadata.clone(),
        }
    }

    fn nft_metadata(&self) -> NftMetadata {
        NftMetadata::new(
            format!("{} Achievement", self.level),
            format!("Completed {} with a verified proof", self.level),
            self.image.clone(),
        )
        .with_property("level", Value::String(self.level.clone()))
        .with_property("proofHash", Value::String(self.proof_hash.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum TransferOutcome {
    /// Mint did not complete, so there was nothing to transfer.
    NotAttempted,
    /// No recipient was supplied.
    Skipped,
    Transferred(TransactionId),
    /// The minted serial stays in the treasury; retry with [`RewardIssuer::transfer`].
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    /// Attestation transaction; always present.
    pub transaction_id: TransactionId,
    pub token_id: Option<TokenId>,
    pub nft_serial: Option<u64>,
    pub transfer: TransferOutcome,
    /// Why the reward was not minted, when it was not.
    pub reward_error: Option<String>,
}

impl CompletionReport {
    fn attested(transaction_id: TransactionId) -> Self {
        Self {
            transaction_id,
            token_id: None,
            nft_serial: None,
            transfer: TransferOutcome::NotAttempted,
            reward_error: None,
        }
    }

    /// Attestation, mint, and any requested transfer all succeeded.
    pub fn is_complete(&self) -> bool {
        self.nft_serial.is_some()
            && matches!(
                self.transfer,
                TransferOutcome::Skipped | TransferOutcome::Transferred(_)
            )
    }
}

pub struct LevelCompletionOrchestrator {
    submitter: Arc<ConsensusLogSubmitter>,
    issuer: Arc<RewardIssuer>,
}

impl LevelCompletionOrchestrator {
    pub fn new(submitter: Arc<ConsensusLogSubmitter>, issuer: Arc<RewardIssuer>) -> Self {
        Self { submitter, issuer }
    }

    pub fn submitter(&self) -> &ConsensusLogSubmitter {
        &self.submitter
    }

    pub fn issuer(&self) -> &RewardIssuer {
        &self.issuer
    }

    /// Runs the workflow once. Fails only when the attestation is not recorded.
    pub async fn complete_level(&self, completion: &LevelCompletion) -> Result<CompletionReport> {
        let transaction_id = self.submitter.submit(&completion.submission()).await?;
        info!(
            level = %completion.level,
            user_id = %completion.user_id,
            transaction_id = %transaction_id,
            "Attestation recorded"
        );
        let mut report = CompletionReport::attested(transaction_id);

        let token = match self.issuer.ensure_token_class(&completion.level).await {
            Ok(token) => token,
            Err(e) => {
                warn!(level = %completion.level, error = %e, "Reward skipped: no token class");
                report.reward_error = Some(e.to_string());
                return Ok(report);
            }
        };
        report.token_id = Some(token.clone());

        let serial = match self.issuer.mint(&token, &completion.nft_metadata()).await {
            Ok(serial) => serial,
            Err(e) => {
                warn!(level = %completion.level, token_id = %token, error = %e, "Reward mint failed");
                report.reward_error = Some(e.to_string());
                return Ok(report);
            }
        };
        report.nft_serial = Some(serial);

        report.transfer = match &completion.recipient {
            None => TransferOutcome::Skipped,
            Some(recipient) => match self.issuer.transfer(&token, serial, recipient).await {
                Ok(tx) => TransferOutcome::Transferred(tx),
                Err(e) => TransferOutcome::Failed(e.to_string()),
            },
        };

        Ok(report)
    }
}
