//! Hedera network configuration.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use ledger_core::{LedgerError, OperatorCredentials, TopicId, TransactionId};

/// Hedera networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HederaNetwork {
    #[default]
    Testnet,
    Mainnet,
    Previewnet,
}

impl HederaNetwork {
    /// Name used by explorers and the SDK.
    pub fn name(&self) -> &'static str {
        match self {
            HederaNetwork::Testnet => "testnet",
            HederaNetwork::Mainnet => "mainnet",
            HederaNetwork::Previewnet => "previewnet",
        }
    }

    /// Public mirror node for this network.
    pub fn default_mirror_url(&self) -> &'static str {
        match self {
            HederaNetwork::Testnet => "https://testnet.mirrornode.hedera.com",
            HederaNetwork::Mainnet => "https://mainnet-public.mirrornode.hedera.com",
            HederaNetwork::Previewnet => "https://previewnet.mirrornode.hedera.com",
        }
    }
}

impl fmt::Display for HederaNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HederaNetwork {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "testnet" => Ok(HederaNetwork::Testnet),
            "mainnet" => Ok(HederaNetwork::Mainnet),
            "previewnet" => Ok(HederaNetwork::Previewnet),
            other => Err(LedgerError::Config(format!(
                "Invalid HEDERA_NETWORK: {other}. Must be testnet, mainnet, or previewnet"
            ))),
        }
    }
}

/// Hedera-specific configuration.
#[derive(Debug, Clone)]
pub struct HederaConfig {
    pub network: HederaNetwork,

    /// Signing operator; required for every write path.
    pub operator: Option<OperatorCredentials>,

    /// Existing consensus topic to attach to.
    pub topic_id: Option<TopicId>,

    /// Custom mirror node URL (overrides network default)
    pub mirror_url: Option<String>,

    pub explorer_host: String,

    /// Per-request timeout for mirror node queries.
    pub mirror_timeout: Duration,
}

impl HederaConfig {
    pub const DEFAULT_EXPLORER_HOST: &'static str = "hashscan.io";
    pub const DEFAULT_MIRROR_TIMEOUT_SECS: u64 = 10;

    pub fn new(network: HederaNetwork) -> Self {
        Self {
            network,
            operator: None,
            topic_id: None,
            mirror_url: None,
            explorer_host: Self::DEFAULT_EXPLORER_HOST.to_string(),
            mirror_timeout: Duration::from_secs(Self::DEFAULT_MIRROR_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `HEDERA_NETWORK` - testnet, mainnet or previewnet (default: testnet)
    /// - `HEDERA_OPERATOR_ID` / `HEDERA_OPERATOR_KEY` - operator account and key (set both or neither)
    /// - `HEDERA_TOPIC_ID` - existing consensus topic
    /// - `HEDERA_MIRROR_URL` - custom mirror node URL
    /// - `HEDERA_EXPLORER_HOST` - explorer host (default: hashscan.io)
    /// - `HEDERA_MIRROR_TIMEOUT_SECS` - mirror request timeout (default: 10)
    pub fn from_env() -> Result<Self, LedgerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`HederaConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LedgerError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let network = match var("HEDERA_NETWORK") {
            Some(name) => name.parse()?,
            None => HederaNetwork::default(),
        };

        let operator = match (var("HEDERA_OPERATOR_ID"), var("HEDERA_OPERATOR_KEY")) {
            (Some(id), Some(key)) => Some(OperatorCredentials::new(id.trim(), key.trim())),
            (None, None) => None,
            _ => {
                return Err(LedgerError::Config(
                    "HEDERA_OPERATOR_ID and HEDERA_OPERATOR_KEY must be set together".into(),
                ));
            }
        };

        let mirror_timeout = match var("HEDERA_MIRROR_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(secs.trim().parse().map_err(|_| {
                LedgerError::Config(format!("Invalid HEDERA_MIRROR_TIMEOUT_SECS: {secs}"))
            })?),
            None => Duration::from_secs(Self::DEFAULT_MIRROR_TIMEOUT_SECS),
        };

        Ok(Self {
            network,
            operator,
            topic_id: var("HEDERA_TOPIC_ID").map(|id| TopicId::new(id.trim())),
            mirror_url: var("HEDERA_MIRROR_URL"),
            explorer_host: var("HEDERA_EXPLORER_HOST")
                .unwrap_or_else(|| Self::DEFAULT_EXPLORER_HOST.to_string()),
            mirror_timeout,
        })
    }

    pub fn with_operator(mut self, operator: OperatorCredentials) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_topic_id(mut self, topic_id: TopicId) -> Self {
        self.topic_id = Some(topic_id);
        self
    }

    pub fn with_mirror_url(mut self, url: impl Into<String>) -> Self {
        self.mirror_url = Some(url.into());
        self
    }

    pub fn with_explorer_host(mut self, host: impl Into<String>) -> Self {
        self.explorer_host = host.into();
        self
    }

    pub fn with_mirror_timeout(mut self, timeout: Duration) -> Self {
        self.mirror_timeout = timeout;
        self
    }

    /// Mirror node base URL (custom or default for network), without a
    /// trailing slash.
    pub fn mirror_url(&self) -> &str {
        self.mirror_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_mirror_url())
            .trim_end_matches('/')
    }

    /// `https://<explorer-host>/<network>/transaction/<transactionId>`
    pub fn explorer_url(&self, transaction_id: &TransactionId) -> String {
        ledger_core::explorer_url(&self.explorer_host, self.network.name(), transaction_id)
    }

    /// Operator credentials, or a configuration error for write paths.
    pub fn require_operator(&self) -> Result<&OperatorCredentials, LedgerError> {
        self.operator.as_ref().ok_or_else(|| {
            LedgerError::Config(
                "No operator configured; set HEDERA_OPERATOR_ID and HEDERA_OPERATOR_KEY".into(),
            )
        })
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        let url = self.mirror_url();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(LedgerError::Config(format!("Invalid mirror URL format: {url}")));
        }

        if self.explorer_host.is_empty() || self.explorer_host.contains('/') {
            return Err(LedgerError::Config(format!(
                "Invalid explorer host: {:?}",
                self.explorer_host
            )));
        }

        if self.mirror_timeout.is_zero() {
            return Err(LedgerError::Config("Mirror timeout must be greater than 0".into()));
        }

        if let Some(operator) = &self.operator
            && operator.account_id.as_str().split('.').count() != 3
        {
            return Err(LedgerError::Config(format!(
                "Invalid operator account id: {}",
                operator.account_id
            )));
        }

        Ok(())
    }
}

impl Default for HederaConfig {
    fn default() -> Self {
        Self::new(HederaNetwork::Testnet)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_testnet() {
        let config = HederaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.network, HederaNetwork::Testnet);
        assert_eq!(config.mirror_url(), "https://testnet.mirrornode.hedera.com");
        assert_eq!(config.mirror_timeout, Duration::from_secs(10));
        assert!(config.operator.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn mainnet_uses_public_mirror() {
        let config = HederaConfig::from_lookup(lookup(&[("HEDERA_NETWORK", "MAINNET")])).unwrap();
        assert_eq!(config.mirror_url(), "https://mainnet-public.mirrornode.hedera.com");
    }

    #[test]
    fn rejects_unknown_network() {
        let err = HederaConfig::from_lookup(lookup(&[("HEDERA_NETWORK", "devnet")])).unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }

    #[test]
    fn operator_id_without_key_is_an_error() {
        let err =
            HederaConfig::from_lookup(lookup(&[("HEDERA_OPERATOR_ID", "0.0.2")])).unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }

    #[test]
    fn explorer_url_includes_network_and_transaction() {
        let config = HederaConfig::new(HederaNetwork::Testnet);
        let url = config.explorer_url(&TransactionId::new("0.0.2@1700000000.000000001"));
        assert_eq!(
            url,
            "https://hashscan.io/testnet/transaction/0.0.2@1700000000.000000001"
        );
    }

    #[test]
    fn custom_mirror_url_drops_trailing_slash() {
        let config = HederaConfig::default().with_mirror_url("http://127.0.0.1:5551/");
        assert_eq!(config.mirror_url(), "http://127.0.0.1:5551");
    }

    #[test]
    fn validate_rejects_bad_mirror_scheme() {
        let config = HederaConfig::default().with_mirror_url("ftp://mirror");
        assert!(config.validate().is_err());
    }
}
