//! Appends proof submissions to a consensus topic.

use std::sync::{Arc, PoisonError, RwLock};

use ledger_core::{LedgerConnector, OperatorCredentials, ProofSubmission, TopicId, TransactionId};
use tracing::{debug, info};

use crate::error::{AttestationError, Result};

/// Memo attached to topics created by [`ConsensusLogSubmitter::create_topic`].
pub const TOPIC_MEMO: &str = "zk proof attestations";

/// Writes [`ProofSubmission`]s as UTF-8 JSON messages on one topic.
///
/// The topic is either configured up front or created once; until then every
/// submission fails with [`AttestationError::TopicNotInitialized`].
pub struct ConsensusLogSubmitter {
    connector: Arc<dyn LedgerConnector>,
    operator: OperatorCredentials,
    topic: RwLock<Option<TopicId>>,
}

impl ConsensusLogSubmitter {
    pub fn new(connector: Arc<dyn LedgerConnector>, operator: OperatorCredentials) -> Self {
        Self {
            connector,
            operator,
            topic: RwLock::new(None),
        }
    }

    /// Attaches to an existing topic.
    pub fn with_topic(self, topic: TopicId) -> Self {
        *self.topic.write().unwrap_or_else(PoisonError::into_inner) = Some(topic);
        self
    }

    pub fn topic_id(&self) -> Option<TopicId> {
        self.topic
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Creates a topic with the operator as admin and submit key and
    /// switches subsequent submissions to it.
    pub async fn create_topic(&self, memo: &str) -> Result<TopicId> {
        let session = self.connector.connect(&self.operator).await?;
        let topic = session
            .create_topic(memo)
            .await?
            .ok_or(AttestationError::TopicCreationFailed)?;

        *self.topic.write().unwrap_or_else(PoisonError::into_inner) = Some(topic.clone());
        info!(topic_id = %topic, "Consensus topic created");
        Ok(topic)
    }

    /// Appends one submission; returns the transaction id.
    pub async fn submit(&self, submission: &ProofSubmission) -> Result<TransactionId> {
        let topic = self.topic_id().ok_or(AttestationError::TopicNotInitialized)?;
        let message = serde_json::to_vec(submission)?;

        let session = self.connector.connect(&self.operator).await?;
        let transaction_id = session.submit_message(&topic, &message).await?;

        debug!(
            topic_id = %topic,
            level = %submission.level,
            user_id = %submission.user_id,
            bytes = message.len(),
            "Submission appended"
        );
        Ok(transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use ledger_core::{MockFailure, MockLedger};

    use super::*;

    fn submitter(ledger: &MockLedger) -> ConsensusLogSubmitter {
        ConsensusLogSubmitter::new(
            Arc::new(ledger.clone()),
            OperatorCredentials::new("0.0.2", "302e"),
        )
    }

    #[tokio::test]
    async fn submit_before_topic_fails() {
        let ledger = MockLedger::new();
        let err = submitter(&ledger)
            .submit(&ProofSubmission::new("level-1", "0xabc", "u1", 1000))
            .await
            .unwrap_err();
        assert!(matches!(err, AttestationError::TopicNotInitialized));
        assert_eq!(ledger.sessions_opened(), 0);
    }

    #[tokio::test]
    async fn submissions_are_camel_case_json() {
        let ledger = MockLedger::new();
        let submitter = submitter(&ledger);
        let topic = submitter.create_topic(TOPIC_MEMO).await.unwrap();

        submitter
            .submit(&ProofSubmission::new("level-1", "0xabc", "u1", 1000))
            .await
            .unwrap();

        let messages = ledger.messages(&topic);
        assert_eq!(messages.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&messages[0].contents).unwrap();
        assert_eq!(body["proofHash"], "0xabc");
        assert_eq!(body["userId"], "u1");
        assert_eq!(body["timestamp"], 1000);
        assert_eq!(ledger.open_sessions(), 0);
    }

    #[tokio::test]
    async fn missing_topic_id_in_receipt_is_an_error() {
        let ledger = MockLedger::new();
        ledger.fail(MockFailure::TopicCreation);
        let submitter = submitter(&ledger);

        let err = submitter.create_topic(TOPIC_MEMO).await.unwrap_err();
        assert!(matches!(err, AttestationError::TopicCreationFailed));
        assert!(submitter.topic_id().is_none());
    }
}
