//! Service container.
//!
//! One [`Services`] per process configuration. Components are built once
//! and shared; callers inject a ledger connector and (optionally) a
//! submission index, so tests can run everything against the mock ledger.

use std::sync::Arc;

use ledger_core::{LedgerConnector, OperatorCredentials, SubmissionIndex, TopicId};
use ledger_hedera::{HederaConfig, MirrorIndexReader};
use zk::{KeyStoreConfig, ProofVerifier, VerificationKeyStore};

use crate::bridge::OnChainVerificationBridge;
use crate::config::AttestationConfig;
use crate::consensus::ConsensusLogSubmitter;
use crate::error::{AttestationError, Result};
use crate::leaderboard::Leaderboard;
use crate::orchestrator::LevelCompletionOrchestrator;
use crate::rewards::RewardIssuer;

/// Components that sign ledger transactions.
pub struct LedgerServices {
    pub operator: OperatorCredentials,
    pub bridge: Arc<OnChainVerificationBridge>,
    pub submitter: Arc<ConsensusLogSubmitter>,
    pub issuer: Arc<RewardIssuer>,
    pub orchestrator: Arc<LevelCompletionOrchestrator>,
}

impl LedgerServices {
    fn new(
        connector: Arc<dyn LedgerConnector>,
        operator: OperatorCredentials,
        hedera: &HederaConfig,
        config: &AttestationConfig,
    ) -> Self {
        let bridge = Arc::new(OnChainVerificationBridge::new(
            connector.clone(),
            hedera.explorer_host.clone(),
            config,
        ));

        let mut submitter = ConsensusLogSubmitter::new(connector.clone(), operator.clone());
        if let Some(topic) = &hedera.topic_id {
            submitter = submitter.with_topic(topic.clone());
        }
        let submitter = Arc::new(submitter);

        let issuer = Arc::new(RewardIssuer::new(connector, operator.clone(), config));
        let orchestrator = Arc::new(LevelCompletionOrchestrator::new(
            submitter.clone(),
            issuer.clone(),
        ));

        Self {
            operator,
            bridge,
            submitter,
            issuer,
            orchestrator,
        }
    }
}

pub struct Services {
    hedera: HederaConfig,
    attestation: AttestationConfig,
    key_store: Arc<VerificationKeyStore>,
    verifier: Arc<ProofVerifier>,
    index: Arc<dyn SubmissionIndex>,
    ledger: Option<LedgerServices>,
}

impl Services {
    pub fn builder() -> ServicesBuilder {
        ServicesBuilder::default()
    }

    pub fn hedera(&self) -> &HederaConfig {
        &self.hedera
    }

    pub fn attestation(&self) -> &AttestationConfig {
        &self.attestation
    }

    pub fn key_store(&self) -> &Arc<VerificationKeyStore> {
        &self.key_store
    }

    pub fn verifier(&self) -> &Arc<ProofVerifier> {
        &self.verifier
    }

    pub fn index(&self) -> &Arc<dyn SubmissionIndex> {
        &self.index
    }

    /// Signing components; present when a connector and an operator were configured.
    pub fn ledger(&self) -> Result<&LedgerServices> {
        self.ledger
            .as_ref()
            .ok_or(AttestationError::NotConfigured("ledger operator"))
    }

    /// Topic currently used for attestations.
    pub fn topic_id(&self) -> Option<TopicId> {
        self.ledger
            .as_ref()
            .and_then(|ledger| ledger.submitter.topic_id())
            .or_else(|| self.hedera.topic_id.clone())
    }

    pub async fn leaderboard(&self, limit: usize) -> Result<Leaderboard> {
        let topic = self
            .topic_id()
            .ok_or(AttestationError::TopicNotInitialized)?;
        Ok(Leaderboard::load(self.index.as_ref(), &topic, limit).await)
    }
}

/// Builder for [`Services`].
#[derive(Default)]
pub struct ServicesBuilder {
    hedera: Option<HederaConfig>,
    attestation: Option<AttestationConfig>,
    key_store: Option<KeyStoreConfig>,
    connector: Option<Arc<dyn LedgerConnector>>,
    index: Option<Arc<dyn SubmissionIndex>>,
}

impl ServicesBuilder {
    pub fn hedera(mut self, config: HederaConfig) -> Self {
        self.hedera = Some(config);
        self
    }

    pub fn attestation(mut self, config: AttestationConfig) -> Self {
        self.attestation = Some(config);
        self
    }

    pub fn key_store(mut self, config: KeyStoreConfig) -> Self {
        self.key_store = Some(config);
        self
    }

    /// Ledger used for every signed operation.
    pub fn connector(mut self, connector: Arc<dyn LedgerConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Overrides the mirror node reader built from the Hedera config.
    pub fn index(mut self, index: Arc<dyn SubmissionIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn build(self) -> Result<Services> {
        let hedera = self.hedera.unwrap_or_default();
        hedera.validate()?;
        let attestation = self.attestation.unwrap_or_default();
        attestation.validate()?;

        let key_store = Arc::new(VerificationKeyStore::from_config(
            &self.key_store.unwrap_or_default(),
        ));
        let verifier = Arc::new(ProofVerifier::with_key_store(key_store.clone()));

        let index: Arc<dyn SubmissionIndex> = match self.index {
            Some(index) => index,
            None => Arc::new(MirrorIndexReader::from_config(&hedera)?),
        };

        let ledger = match (self.connector, hedera.operator.clone()) {
            (Some(connector), Some(operator)) => Some(LedgerServices::new(
                connector,
                operator,
                &hedera,
                &attestation,
            )),
            _ => None,
        };

        Ok(Services {
            hedera,
            attestation,
            key_store,
            verifier,
            index,
            ledger,
        })
    }
}
