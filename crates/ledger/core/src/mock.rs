//! In-memory ledger for tests.
//!
//! Records every topic message, token class, mint and transfer, counts open
//! sessions, and can be told to fail specific operations.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{LedgerError, status};
use crate::traits::{LedgerConnector, LedgerSession, SubmissionIndex};
use crate::types::{
    AccountId, ContractExecution, ContractId, LedgerStatus, MintReceipt, OperatorCredentials,
    ProofSubmission, SubmissionListing, TokenClassSpec, TokenId, TopicId, TransactionId,
};

/// Consensus time of the first mock message, in seconds.
const GENESIS_SECONDS: u64 = 1_700_000_000;

/// How the mock verifier contract answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractOutcome {
    /// Execution record carries the ABI-encoded bool.
    Record(bool),
    /// Record has no result; the read-only call returns the bool.
    QueryOnly(bool),
    /// Neither record nor read-only call yields data.
    StatusOnly,
    /// Execution ends with `CONTRACT_REVERT_EXECUTED`.
    Revert,
}

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockFailure {
    Connect,
    TopicCreation,
    Submit,
    TokenCreation,
    Mint,
    Transfer,
}

/// A message as the consensus service stored it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMessage {
    pub topic: TopicId,
    pub sequence_number: u64,
    /// `seconds.nanos`
    pub consensus_timestamp: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTransfer {
    pub token: TokenId,
    pub serial: u64,
    pub from: AccountId,
    pub to: AccountId,
    pub fee_tinybars: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub contract: ContractId,
    pub call_data: Vec<u8>,
    pub gas: u64,
    pub read_only: bool,
}

#[derive(Default)]
struct MockState {
    entity_counter: u64,
    transaction_counter: u64,
    messages: Vec<RecordedMessage>,
    topics: HashSet<TopicId>,
    tokens: Vec<(TokenId, TokenClassSpec)>,
    minted: HashMap<TokenId, Vec<Vec<u8>>>,
    transfers: Vec<RecordedTransfer>,
    calls: Vec<RecordedCall>,
    failures: HashSet<MockFailure>,
    outcome: Option<ContractOutcome>,
}

impl MockState {
    fn next_entity(&mut self) -> String {
        self.entity_counter += 1;
        format!("0.0.{}", 1000 + self.entity_counter)
    }

    fn next_tx_id(&mut self, payer: &AccountId) -> TransactionId {
        self.transaction_counter += 1;
        TransactionId(format!(
            "{payer}@{}.{:09}",
            GENESIS_SECONDS + self.transaction_counter,
            0
        ))
    }

    fn fail_if(&self, failure: MockFailure) -> Result<(), LedgerError> {
        if self.failures.contains(&failure) {
            Err(LedgerError::Network(format!("injected failure: {failure:?}")))
        } else {
            Ok(())
        }
    }
}

/// Mock ledger connector with shared in-memory state.
///
/// Clones share state, so a test can hold one handle while the code under
/// test holds another.
#[derive(Clone)]
pub struct MockLedger {
    network: String,
    state: Arc<Mutex<MockState>>,
    open_sessions: Arc<AtomicUsize>,
    sessions_opened: Arc<AtomicUsize>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            network: "testnet".into(),
            state: Arc::new(Mutex::new(MockState::default())),
            open_sessions: Arc::new(AtomicUsize::new(0)),
            sessions_opened: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn with_contract_outcome(self, outcome: ContractOutcome) -> Self {
        self.state().outcome = Some(outcome);
        self
    }

    pub fn set_contract_outcome(&self, outcome: ContractOutcome) {
        self.state().outcome = Some(outcome);
    }

    pub fn fail(&self, failure: MockFailure) {
        self.state().failures.insert(failure);
    }

    pub fn recover(&self, failure: MockFailure) {
        self.state().failures.remove(&failure);
    }

    /// Sessions currently alive.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    /// Sessions opened over the mock's lifetime.
    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    pub fn messages(&self, topic: &TopicId) -> Vec<RecordedMessage> {
        self.state()
            .messages
            .iter()
            .filter(|m| &m.topic == topic)
            .cloned()
            .collect()
    }

    pub fn token_classes(&self) -> Vec<(TokenId, TokenClassSpec)> {
        self.state().tokens.clone()
    }

    pub fn minted(&self, token: &TokenId) -> Vec<Vec<u8>> {
        self.state().minted.get(token).cloned().unwrap_or_default()
    }

    pub fn transfers(&self) -> Vec<RecordedTransfer> {
        self.state().transfers.clone()
    }

    pub fn contract_calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerConnector for MockLedger {
    fn network(&self) -> &str {
        &self.network
    }

    async fn connect(
        &self,
        credentials: &OperatorCredentials,
    ) -> Result<Box<dyn LedgerSession>, LedgerError> {
        self.state().fail_if(MockFailure::Connect)?;
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        self.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            ledger: self.clone(),
            operator: credentials.account_id.clone(),
        }))
    }
}

struct MockSession {
    ledger: MockLedger,
    operator: AccountId,
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.ledger.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

fn abi_bool(value: bool) -> Vec<u8> {
    let mut word = vec![0u8; 32];
    word[31] = u8::from(value);
    word
}

#[async_trait]
impl LedgerSession for MockSession {
    fn operator(&self) -> &AccountId {
        &self.operator
    }

    async fn execute_contract(
        &self,
        contract: &ContractId,
        call_data: &[u8],
        gas: u64,
    ) -> Result<ContractExecution, LedgerError> {
        let mut state = self.ledger.state();
        state.calls.push(RecordedCall {
            contract: contract.clone(),
            call_data: call_data.to_vec(),
            gas,
            read_only: false,
        });

        let result = match state.outcome.unwrap_or(ContractOutcome::Record(true)) {
            ContractOutcome::Revert => {
                return Err(LedgerError::status(
                    status::CONTRACT_REVERT_EXECUTED,
                    "CONTRACT_REVERT_EXECUTED",
                ));
            }
            ContractOutcome::Record(verified) => Some(abi_bool(verified)),
            ContractOutcome::QueryOnly(_) | ContractOutcome::StatusOnly => None,
        };

        Ok(ContractExecution {
            transaction_id: state.next_tx_id(&self.operator),
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
        let mut state = self.ledger.state();
        state.calls.push(RecordedCall {
            contract: contract.clone(),
            call_data: call_data.to_vec(),
            gas,
            read_only: true,
        });

        match state.outcome.unwrap_or(ContractOutcome::Record(true)) {
            ContractOutcome::Record(verified) | ContractOutcome::QueryOnly(verified) => {
                Ok(abi_bool(verified))
            }
            ContractOutcome::StatusOnly => Ok(Vec::new()),
            ContractOutcome::Revert => Err(LedgerError::status(
                status::CONTRACT_REVERT_EXECUTED,
                "CONTRACT_REVERT_EXECUTED",
            )),
        }
    }

    async fn create_topic(&self, _memo: &str) -> Result<Option<TopicId>, LedgerError> {
        let mut state = self.ledger.state();
        if state.failures.contains(&MockFailure::TopicCreation) {
            return Ok(None);
        }
        let topic = TopicId(state.next_entity());
        state.topics.insert(topic.clone());
        Ok(Some(topic))
    }

    async fn submit_message(
        &self,
        topic: &TopicId,
        message: &[u8],
    ) -> Result<TransactionId, LedgerError> {
        let mut state = self.ledger.state();
        state.fail_if(MockFailure::Submit)?;
        if !state.topics.contains(topic) {
            return Err(LedgerError::Rejected("INVALID_TOPIC_ID".into()));
        }

        let sequence_number =
            state.messages.iter().filter(|m| &m.topic == topic).count() as u64 + 1;
        let tx_id = state.next_tx_id(&self.operator);
        let consensus_timestamp = format!(
            "{}.{:09}",
            GENESIS_SECONDS + state.transaction_counter,
            sequence_number
        );
        state.messages.push(RecordedMessage {
            topic: topic.clone(),
            sequence_number,
            consensus_timestamp,
            contents: message.to_vec(),
        });
        Ok(tx_id)
    }

    async fn create_token(&self, spec: &TokenClassSpec) -> Result<Option<TokenId>, LedgerError> {
        let mut state = self.ledger.state();
        if state.failures.contains(&MockFailure::TokenCreation) {
            return Ok(None);
        }
        let token = TokenId(state.next_entity());
        state.tokens.push((token.clone(), spec.clone()));
        state.minted.insert(token.clone(), Vec::new());
        Ok(Some(token))
    }

    async fn mint(&self, token: &TokenId, metadata: Vec<u8>) -> Result<MintReceipt, LedgerError> {
        let mut state = self.ledger.state();
        if state.failures.contains(&MockFailure::Mint) {
            return Err(LedgerError::Rejected("TOKEN_HAS_NO_SUPPLY_KEY".into()));
        }
        let max_supply = state
            .tokens
            .iter()
            .find(|(id, _)| id == token)
            .map(|(_, spec)| spec.max_supply)
            .ok_or_else(|| LedgerError::Rejected("INVALID_TOKEN_ID".into()))?;

        let minted = state.minted.entry(token.clone()).or_default();
        if minted.len() as u64 >= max_supply {
            return Err(LedgerError::Rejected("TOKEN_MAX_SUPPLY_REACHED".into()));
        }
        minted.push(metadata);
        let serial = minted.len() as u64;

        Ok(MintReceipt {
            transaction_id: state.next_tx_id(&self.operator),
            serials: vec![serial],
        })
    }

    async fn transfer_nft(
        &self,
        token: &TokenId,
        serial: u64,
        recipient: &AccountId,
        fee_tinybars: u64,
    ) -> Result<TransactionId, LedgerError> {
        let mut state = self.ledger.state();
        state.fail_if(MockFailure::Transfer)?;
        state.transfers.push(RecordedTransfer {
            token: token.clone(),
            serial,
            from: self.operator.clone(),
            to: recipient.clone(),
            fee_tinybars,
        });
        Ok(state.next_tx_id(&self.operator))
    }
}

/// Reads straight from recorded topic messages, newest first.
#[async_trait]
impl SubmissionIndex for MockLedger {
    async fn list_submissions(&self, topic: &TopicId, limit: usize) -> SubmissionListing {
        let mut submissions: Vec<ProofSubmission> = self
            .messages(topic)
            .iter()
            .filter_map(|m| serde_json::from_slice(&m.contents).ok())
            .collect();
        submissions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        submissions.truncate(limit);
        SubmissionListing::Available(submissions)
    }
}
