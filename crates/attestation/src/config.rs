//! Attestation tuning knobs.

use std::env;
use std::str::FromStr;

use crate::error::{AttestationError, Result};

/// Gas limits and reward parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationConfig {
    /// Gas for the state-changing `verifyProof` execution.
    pub verifier_gas_limit: u64,
    /// Gas for the read-only fallback call.
    pub verifier_query_gas: u64,
    /// Maximum supply of each per-level token class.
    pub nft_max_supply: u64,
    /// Native-unit amount paired with every NFT transfer.
    pub nft_transfer_fee_tinybars: u64,
    pub nft_symbol_prefix: String,
}

impl AttestationConfig {
    pub const DEFAULT_VERIFIER_GAS_LIMIT: u64 = 1_000_000;
    pub const DEFAULT_VERIFIER_QUERY_GAS: u64 = 300_000;
    pub const DEFAULT_NFT_MAX_SUPPLY: u64 = 1000;
    pub const DEFAULT_NFT_TRANSFER_FEE_TINYBARS: u64 = 100_000;
    pub const DEFAULT_NFT_SYMBOL_PREFIX: &'static str = "ZKA";

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `VERIFIER_GAS_LIMIT` (default: 1000000)
    /// - `VERIFIER_QUERY_GAS` (default: 300000)
    /// - `NFT_MAX_SUPPLY` (default: 1000)
    /// - `NFT_TRANSFER_FEE_TINYBARS` (default: 100000)
    /// - `NFT_SYMBOL_PREFIX` (default: ZKA)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str, default: u64| -> Result<u64> {
            match var(key) {
                Some(raw) => parse(key, &raw),
                None => Ok(default),
            }
        };

        let config = Self {
            verifier_gas_limit: number("VERIFIER_GAS_LIMIT", Self::DEFAULT_VERIFIER_GAS_LIMIT)?,
            verifier_query_gas: number("VERIFIER_QUERY_GAS", Self::DEFAULT_VERIFIER_QUERY_GAS)?,
            nft_max_supply: number("NFT_MAX_SUPPLY", Self::DEFAULT_NFT_MAX_SUPPLY)?,
            nft_transfer_fee_tinybars: number(
                "NFT_TRANSFER_FEE_TINYBARS",
                Self::DEFAULT_NFT_TRANSFER_FEE_TINYBARS,
            )?,
            nft_symbol_prefix: var("NFT_SYMBOL_PREFIX")
                .map(|p| p.trim().to_string())
                .unwrap_or_else(|| Self::DEFAULT_NFT_SYMBOL_PREFIX.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.verifier_gas_limit == 0 || self.verifier_query_gas == 0 {
            return Err(AttestationError::Config("gas limits must be positive".into()));
        }
        if self.nft_max_supply == 0 {
            return Err(AttestationError::Config("NFT_MAX_SUPPLY must be positive".into()));
        }
        Ok(())
    }

    pub fn with_verifier_gas(mut self, execute: u64, query: u64) -> Self {
        self.verifier_gas_limit = execute;
        self.verifier_query_gas = query;
        self
    }

    pub fn with_nft_max_supply(mut self, max_supply: u64) -> Self {
        self.nft_max_supply = max_supply;
        self
    }

    pub fn with_transfer_fee(mut self, tinybars: u64) -> Self {
        self.nft_transfer_fee_tinybars = tinybars;
        self
    }

    pub fn with_symbol_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.nft_symbol_prefix = prefix.into();
        self
    }
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            verifier_gas_limit: Self::DEFAULT_VERIFIER_GAS_LIMIT,
            verifier_query_gas: Self::DEFAULT_VERIFIER_QUERY_GAS,
            nft_max_supply: Self::DEFAULT_NFT_MAX_SUPPLY,
            nft_transfer_fee_tinybars: Self::DEFAULT_NFT_TRANSFER_FEE_TINYBARS,
            nft_symbol_prefix: Self::DEFAULT_NFT_SYMBOL_PREFIX.to_string(),
        }
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| {
            AttestationError::Config(format!("{key} must be a non-negative integer, got '{raw}'"))
        })
}
