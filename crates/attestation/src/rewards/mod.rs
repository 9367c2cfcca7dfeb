//! Achievement NFTs: one token class per level, one serial per completion.

mod metadata;
mod registry;

use std::sync::Arc;

use ledger_core::{
    AccountId, LedgerConnector, OperatorCredentials, TokenClassSpec, TokenId, TransactionId,
};
use tracing::{info, warn};

use crate::config::AttestationConfig;
use crate::error::{AttestationError, Result};

pub use metadata::{MAX_METADATA_BYTES, NftMetadata};
pub use registry::TokenClassRegistry;

/// Creates token classes, mints, and transfers rewards as the operator.
///
/// The operator account is treasury, admin, and supply key of every class.
pub struct RewardIssuer {
    connector: Arc<dyn LedgerConnector>,
    operator: OperatorCredentials,
    registry: TokenClassRegistry,
    max_supply: u64,
    symbol_prefix: String,
    transfer_fee_tinybars: u64,
}

impl RewardIssuer {
    pub fn new(
        connector: Arc<dyn LedgerConnector>,
        operator: OperatorCredentials,
        config: &AttestationConfig,
    ) -> Self {
        Self {
            connector,
            operator,
            registry: TokenClassRegistry::new(),
            max_supply: config.nft_max_supply,
            symbol_prefix: config.nft_symbol_prefix.clone(),
            transfer_fee_tinybars: config.nft_transfer_fee_tinybars,
        }
    }

    pub fn registry(&self) -> &TokenClassRegistry {
        &self.registry
    }

    /// Class parameters for `level`.
    pub fn token_class_spec(&self, level: &str) -> TokenClassSpec {
        let tag: String = level
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let symbol = if tag.is_empty() {
            self.symbol_prefix.clone()
        } else {
            format!("{}-{tag}", self.symbol_prefix)
        };

        TokenClassSpec {
            name: format!("{level} Achievement"),
            symbol,
            max_supply: self.max_supply,
            memo: format!("Completion reward for level {level}"),
        }
    }

    /// Token class for `level`, created on first use.
    ///
    /// Concurrent first calls for the same level create a single class.
    pub async fn ensure_token_class(&self, level: &str) -> Result<TokenId> {
        self.registry
            .get_or_create(level, || self.create_token_class(level))
            .await
    }

    async fn create_token_class(&self, level: &str) -> Result<TokenId> {
        let spec = self.token_class_spec(level);
        let failed = |reason: String| AttestationError::TokenCreationFailed {
            level: level.to_string(),
            reason,
        };

        let session = self.connector.connect(&self.operator).await?;
        let token = session
            .create_token(&spec)
            .await
            .map_err(|e| failed(e.to_string()))?
            .ok_or_else(|| failed("receipt carried no token id".into()))?;

        info!(level, token_id = %token, symbol = %spec.symbol, "Token class created");
        Ok(token)
    }

    /// Mints one serial carrying `metadata`; returns its serial number.
    pub async fn mint(&self, token: &TokenId, metadata: &NftMetadata) -> Result<u64> {
        let bytes = metadata.encode()?;
        let failed = |reason: String| AttestationError::MintFailed {
            token: token.clone(),
            reason,
        };

        let session = self.connector.connect(&self.operator).await?;
        let receipt = session
            .mint(token, bytes)
            .await
            .map_err(|e| failed(e.to_string()))?;
        let serial = receipt
            .serials
            .first()
            .copied()
            .ok_or_else(|| failed("receipt carried no serial".into()))?;

        info!(token_id = %token, serial, transaction_id = %receipt.transaction_id, "Reward minted");
        Ok(serial)
    }

    /// Sends `serial` from the treasury to `recipient` together with the
    /// configured fee in the native unit.
    pub async fn transfer(
        &self,
        token: &TokenId,
        serial: u64,
        recipient: &AccountId,
    ) -> Result<TransactionId> {
        let session = self.connector.connect(&self.operator).await?;
        session
            .transfer_nft(token, serial, recipient, self.transfer_fee_tinybars)
            .await
            .map_err(|e| {
                warn!(token_id = %token, serial, recipient = %recipient, error = %e, "Reward transfer failed");
                AttestationError::TransferFailed {
                    token: token.clone(),
                    serial,
                    reason: e.to_string(),
                }
            })
    }
}
