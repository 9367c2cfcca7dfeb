//! Ledger sessions over the Hedera SDK.
//!
//! Each [`HederaConnector::connect`] builds a fresh SDK client bound to the
//! supplied operator. The client lives inside the returned session and is
//! released when the session is dropped.

use std::str::FromStr;

use async_trait::async_trait;
use hedera::{
    Client, ContractCallQuery, ContractExecuteTransaction, Hbar, PrivateKey, Status,
    TokenCreateTransaction, TokenMintTransaction, TokenSupplyType, TokenType,
    TopicCreateTransaction, TopicMessageSubmitTransaction, TransferTransaction,
};
use ledger_core::{
    AccountId, ContractExecution, ContractId, LedgerConnector, LedgerError, LedgerSession,
    LedgerStatus, MintReceipt, OperatorCredentials, TokenClassSpec, TokenId, TopicId,
    TransactionId,
};
use tracing::{debug, info};

use crate::{HederaConfig, HederaNetwork};

/// Connector for one Hedera network.
#[derive(Debug, Clone)]
pub struct HederaConnector {
    network: HederaNetwork,
}

impl HederaConnector {
    pub fn new(network: HederaNetwork) -> Self {
        Self { network }
    }

    pub fn from_config(config: &HederaConfig) -> Self {
        Self::new(config.network)
    }

    fn client(&self) -> Client {
        match self.network {
            HederaNetwork::Testnet => Client::for_testnet(),
            HederaNetwork::Mainnet => Client::for_mainnet(),
            HederaNetwork::Previewnet => Client::for_previewnet(),
        }
    }
}

#[async_trait]
impl LedgerConnector for HederaConnector {
    fn network(&self) -> &str {
        self.network.name()
    }

    async fn connect(
        &self,
        credentials: &OperatorCredentials,
    ) -> Result<Box<dyn LedgerSession>, LedgerError> {
        let account = parse_id::<hedera::AccountId>(credentials.account_id.as_str(), "account")?;
        let key = PrivateKey::from_str(&credentials.private_key)
            .map_err(|e| LedgerError::Config(format!("Invalid operator key: {e}")))?;

        let client = self.client();
        client.set_operator(account, key.clone());
        debug!(network = %self.network, operator = %credentials.account_id, "Opened Hedera client");

        Ok(Box::new(HederaSession {
            client,
            key,
            operator: credentials.account_id.clone(),
            operator_id: account,
        }))
    }
}

struct HederaSession {
    client: Client,
    key: PrivateKey,
    operator: AccountId,
    operator_id: hedera::AccountId,
}

impl Drop for HederaSession {
    fn drop(&mut self) {
        debug!(operator = %self.operator, "Released Hedera client");
    }
}

fn parse_id<T: FromStr>(id: &str, what: &str) -> Result<T, LedgerError>
where
    T::Err: std::fmt::Display,
{
    T::from_str(id).map_err(|e| LedgerError::Config(format!("Invalid {what} id {id:?}: {e}")))
}

fn status_error(status: Status) -> LedgerError {
    LedgerError::status(status as i32, status.as_str_name())
}

/// Maps SDK errors onto the ledger taxonomy, keeping status codes.
fn ledger_error(e: hedera::Error) -> LedgerError {
    match e {
        hedera::Error::ReceiptStatus { status, .. } => status_error(status),
        hedera::Error::TransactionPreCheckStatus { status, .. }
        | hedera::Error::QueryPreCheckStatus { status, .. } => {
            LedgerError::Rejected(status.as_str_name().to_string())
        }
        hedera::Error::TimedOut(last) => LedgerError::Timeout(last.to_string()),
        other => LedgerError::Network(other.to_string()),
    }
}

fn serial(serial: i64) -> Result<u64, LedgerError> {
    u64::try_from(serial)
        .map_err(|_| LedgerError::Serialization(format!("Negative NFT serial {serial}")))
}

#[async_trait]
impl LedgerSession for HederaSession {
    fn operator(&self) -> &AccountId {
        &self.operator
    }

    async fn execute_contract(
        &self,
        contract: &ContractId,
        call_data: &[u8],
        gas: u64,
    ) -> Result<ContractExecution, LedgerError> {
        let contract_id = parse_id::<hedera::ContractId>(contract.as_str(), "contract")?;

        let mut tx = ContractExecuteTransaction::new();
        tx.contract_id(contract_id)
            .gas(gas)
            .function_parameters(call_data.to_vec());
        let response = tx.execute(&self.client).await.map_err(ledger_error)?;
        let transaction_id = TransactionId::new(response.transaction_id.to_string());

        let receipt = response.get_receipt(&self.client).await.map_err(ledger_error)?;
        if receipt.status != Status::Success {
            return Err(status_error(receipt.status));
        }

        // The record may be unavailable (e.g. pruned); the caller falls back.
        let result = match response.get_record(&self.client).await {
            Ok(record) => record
                .contract_function_result
                .map(|r| r.bytes)
                .filter(|bytes| !bytes.is_empty()),
            Err(e) => {
                debug!(error = %e, "Contract execution record unavailable");
                None
            }
        };

        info!(contract = %contract, tx = %transaction_id, "Contract executed");
        Ok(ContractExecution {
            transaction_id,
            status: LedgerStatus::success(),
            result,
        })
    }

    async fn call_contract(
        &self,
        contract: &ContractId,
        call_data: &[u8],
        gas: u64,
    ) -> Result<Vec<u8>, LedgerError> {
        let contract_id = parse_id::<hedera::ContractId>(contract.as_str(), "contract")?;

        let mut query = ContractCallQuery::new();
        query
            .contract_id(contract_id)
            .gas(gas)
            .function_parameters(call_data.to_vec());
        let result = query.execute(&self.client).await.map_err(ledger_error)?;
        Ok(result.bytes)
    }

    async fn create_topic(&self, memo: &str) -> Result<Option<TopicId>, LedgerError> {
        let mut tx = TopicCreateTransaction::new();
        tx.admin_key(self.key.public_key())
            .submit_key(self.key.public_key())
            .topic_memo(memo);
        let response = tx.execute(&self.client).await.map_err(ledger_error)?;
        let receipt = response.get_receipt(&self.client).await.map_err(ledger_error)?;

        let topic = receipt.topic_id.map(|id| TopicId::new(id.to_string()));
        if let Some(topic) = &topic {
            info!(topic = %topic, "Created consensus topic");
        }
        Ok(topic)
    }

    async fn submit_message(
        &self,
        topic: &TopicId,
        message: &[u8],
    ) -> Result<TransactionId, LedgerError> {
        let topic_id = parse_id::<hedera::TopicId>(topic.as_str(), "topic")?;

        let mut tx = TopicMessageSubmitTransaction::new();
        tx.topic_id(topic_id).message(message.to_vec());
        let response = tx.execute(&self.client).await.map_err(ledger_error)?;
        response.get_receipt(&self.client).await.map_err(ledger_error)?;

        Ok(TransactionId::new(response.transaction_id.to_string()))
    }

    async fn create_token(&self, spec: &TokenClassSpec) -> Result<Option<TokenId>, LedgerError> {
        let mut tx = TokenCreateTransaction::new();
        tx.name(&spec.name)
            .symbol(&spec.symbol)
            .token_memo(&spec.memo)
            .decimals(0)
            .initial_supply(0)
            .token_type(TokenType::NonFungibleUnique)
            .token_supply_type(TokenSupplyType::Finite)
            .max_supply(spec.max_supply)
            .treasury_account_id(self.operator_id)
            .admin_key(self.key.public_key())
            .supply_key(self.key.public_key());
        let response = tx.execute(&self.client).await.map_err(ledger_error)?;
        let receipt = response.get_receipt(&self.client).await.map_err(ledger_error)?;

        Ok(receipt.token_id.map(|id| TokenId::new(id.to_string())))
    }

    async fn mint(&self, token: &TokenId, metadata: Vec<u8>) -> Result<MintReceipt, LedgerError> {
        let token_id = parse_id::<hedera::TokenId>(token.as_str(), "token")?;

        let mut tx = TokenMintTransaction::new();
        tx.token_id(token_id).metadata([metadata]);
        let response = tx.execute(&self.client).await.map_err(ledger_error)?;
        let receipt = response.get_receipt(&self.client).await.map_err(ledger_error)?;

        Ok(MintReceipt {
            transaction_id: TransactionId::new(response.transaction_id.to_string()),
            serials: receipt
                .serials
                .iter()
                .map(|s| serial(*s))
                .collect::<Result<_, _>>()?,
        })
    }

    async fn transfer_nft(
        &self,
        token: &TokenId,
        serial: u64,
        recipient: &AccountId,
        fee_tinybars: u64,
    ) -> Result<TransactionId, LedgerError> {
        let token_id = parse_id::<hedera::TokenId>(token.as_str(), "token")?;
        let recipient_id = parse_id::<hedera::AccountId>(recipient.as_str(), "account")?;
        let fee = i64::try_from(fee_tinybars)
            .map_err(|_| LedgerError::Config(format!("Transfer fee too large: {fee_tinybars}")))?;

        let mut tx = TransferTransaction::new();
        tx.nft_transfer(token_id.nft(serial), self.operator_id, recipient_id)
            .hbar_transfer(self.operator_id, Hbar::from_tinybars(-fee))
            .hbar_transfer(recipient_id, Hbar::from_tinybars(fee));
        let response = tx.execute(&self.client).await.map_err(ledger_error)?;
        response.get_receipt(&self.client).await.map_err(ledger_error)?;

        Ok(TransactionId::new(response.transaction_id.to_string()))
    }
}
