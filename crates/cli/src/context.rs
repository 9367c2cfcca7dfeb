//! Service construction from the process environment.

use std::sync::Arc;

use anyhow::{Context, Result};
use attestation::{AttestationConfig, Services};
use ledger_core::TopicId;
use ledger_hedera::HederaConfig;
use zk::{KeyStoreConfig, VerificationKeyStore};

pub fn key_store() -> Arc<VerificationKeyStore> {
    Arc::new(VerificationKeyStore::from_config(&KeyStoreConfig::from_env()))
}

/// Builds the service container; with the `hedera` feature, signed
/// operations go through the Hedera SDK.
pub fn services() -> Result<Services> {
    let hedera = HederaConfig::from_env().context("Invalid Hedera configuration")?;
    let attestation = AttestationConfig::from_env().context("Invalid attestation configuration")?;

    let builder = Services::builder()
        .attestation(attestation)
        .key_store(KeyStoreConfig::from_env());

    #[cfg(feature = "hedera")]
    let builder = builder.connector(Arc::new(ledger_hedera::HederaConnector::from_config(
        &hedera,
    )));

    Ok(builder.hedera(hedera).build()?)
}

/// `--topic` when given, else the configured or created topic.
pub fn topic(services: &Services, explicit: Option<String>) -> Result<TopicId> {
    explicit
        .map(TopicId::new)
        .or_else(|| services.topic_id())
        .context("No topic given; pass --topic or set HEDERA_TOPIC_ID")
}
