//! On-chain re-verification through an EVM verifier contract.
//!
//! The verdict is taken from the first source that yields one:
//! 1. the execution record's return value
//! 2. a read-only call with the same call data
//! 3. the transaction status (degraded: success is read as "verified")

mod calldata;

use std::sync::Arc;

use ledger_core::{ContractId, LedgerConnector, LedgerSession, OperatorCredentials, TransactionId};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use zk::SolidityCallArgs;

use crate::config::AttestationConfig;
use crate::error::{AttestationError, Result};

pub use calldata::{decode_bool, encode_verify_proof, verify_proof_selector, verify_proof_signature};

/// Where the on-chain verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultSource {
    ExecutionRecord,
    ReadOnlyCall,
    /// The verdict only reflects that the transaction succeeded.
    TransactionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainVerification {
    pub transaction_id: TransactionId,
    pub verified: bool,
    pub explorer_url: String,
    pub source: ResultSource,
}

impl OnChainVerification {
    pub fn is_degraded(&self) -> bool {
        self.source == ResultSource::TransactionStatus
    }
}

pub struct OnChainVerificationBridge {
    connector: Arc<dyn LedgerConnector>,
    explorer_host: String,
    gas_limit: u64,
    query_gas: u64,
}

impl OnChainVerificationBridge {
    pub fn new(
        connector: Arc<dyn LedgerConnector>,
        explorer_host: impl Into<String>,
        config: &AttestationConfig,
    ) -> Self {
        Self {
            connector,
            explorer_host: explorer_host.into(),
            gas_limit: config.verifier_gas_limit,
            query_gas: config.verifier_query_gas,
        }
    }

    /// Converts a snarkjs Groth16 proof and verifies it on-chain.
    pub async fn verify_snarkjs(
        &self,
        contract: &ContractId,
        proof: &Value,
        public_signals: &[String],
        credentials: &OperatorCredentials,
    ) -> Result<OnChainVerification> {
        let args = SolidityCallArgs::from_snarkjs(proof, public_signals)?;
        self.verify_on_chain(contract, &args, credentials).await
    }

    /// Executes `verifyProof` on `contract` signed by `credentials`.
    ///
    /// A contract revert yields [`AttestationError::VerificationFailedOnChain`].
    /// The session opened here is released on every path.
    pub async fn verify_on_chain(
        &self,
        contract: &ContractId,
        args: &SolidityCallArgs,
        credentials: &OperatorCredentials,
    ) -> Result<OnChainVerification> {
        let call_data = encode_verify_proof(args)?;
        let session = self.connector.connect(credentials).await?;

        let execution = match session
            .execute_contract(contract, &call_data, self.gas_limit)
            .await
        {
            Ok(execution) => execution,
            Err(e) if e.is_contract_revert() => {
                warn!(contract = %contract, "Verifier contract reverted");
                return Err(AttestationError::VerificationFailedOnChain {
                    contract: contract.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let (verified, source) = match execution.result.as_deref().and_then(decode_bool) {
            Some(verified) => (verified, ResultSource::ExecutionRecord),
            None => match self.query(session.as_ref(), contract, &call_data).await {
                Some(verified) => (verified, ResultSource::ReadOnlyCall),
                None => {
                    warn!(
                        contract = %contract,
                        transaction_id = %execution.transaction_id,
                        status = %execution.status.name,
                        "No return value available; using transaction status as verdict"
                    );
                    (execution.status.is_success(), ResultSource::TransactionStatus)
                }
            },
        };

        info!(
            contract = %contract,
            transaction_id = %execution.transaction_id,
            verified,
            ?source,
            "On-chain verification finished"
        );

        Ok(OnChainVerification {
            explorer_url: ledger_core::explorer_url(
                &self.explorer_host,
                self.connector.network(),
                &execution.transaction_id,
            ),
            transaction_id: execution.transaction_id,
            verified,
            source,
        })
    }

    async fn query(
        &self,
        session: &dyn LedgerSession,
        contract: &ContractId,
        call_data: &[u8],
    ) -> Option<bool> {
        match session.call_contract(contract, call_data, self.query_gas).await {
            Ok(bytes) => decode_bool(&bytes),
            Err(e) => {
                warn!(contract = %contract, error = %e, "Read-only verifier call failed");
                None
            }
        }
    }
}
