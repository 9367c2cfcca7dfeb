//! Common types for ledger interactions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! ledger_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

ledger_id!(
    /// Ledger account, `shard.realm.num` (e.g. `0.0.1234`).
    AccountId
);
ledger_id!(
    /// Deployed contract, `shard.realm.num`.
    ContractId
);
ledger_id!(
    /// Consensus-service topic, `shard.realm.num`.
    TopicId
);
ledger_id!(
    /// Token class, `shard.realm.num`.
    TokenId
);
ledger_id!(
    /// Transaction identifier, `payer@seconds.nanos`.
    TransactionId
);

/// `https://<explorer-host>/<network>/transaction/<transactionId>`
pub fn explorer_url(host: &str, network: &str, transaction_id: &TransactionId) -> String {
    format!("https://{host}/{network}/transaction/{transaction_id}")
}

/// Operator identity used to sign transactions.
#[derive(Clone, PartialEq, Eq)]
pub struct OperatorCredentials {
    pub account_id: AccountId,
    /// DER- or hex-encoded private key.
    pub private_key: String,
}

impl OperatorCredentials {
    pub fn new(account_id: impl Into<AccountId>, private_key: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            private_key: private_key.into(),
        }
    }
}

impl fmt::Debug for OperatorCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorCredentials")
            .field("account_id", &self.account_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Receipt status of a transaction that reached consensus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatus {
    pub code: i32,
    pub name: String,
}

impl LedgerStatus {
    pub fn success() -> Self {
        Self {
            code: crate::status::SUCCESS,
            name: "SUCCESS".into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == crate::status::SUCCESS
    }
}

/// Outcome of a state-changing contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractExecution {
    pub transaction_id: TransactionId,
    pub status: LedgerStatus,
    /// Raw return data from the execution record, when the ledger kept it.
    pub result: Option<Vec<u8>>,
}

/// Parameters of a non-fungible token class.
///
/// Classes are always created with zero decimals, a finite supply of
/// `max_supply`, the unique (NFT) token type, and the operator key as both
/// admin and supply key. The operator account is the treasury.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClassSpec {
    pub name: String,
    pub symbol: String,
    pub max_supply: u64,
    pub memo: String,
}

/// Serials minted by one mint transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub transaction_id: TransactionId,
    pub serials: Vec<u64>,
}

/// One attestation appended to the consensus log.
///
/// Serialized as UTF-8 JSON with camelCase keys; immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofSubmission {
    pub level: String,
    pub proof_hash: String,
    pub user_id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ProofSubmission {
    pub fn new(
        level: impl Into<String>,
        proof_hash: impl Into<String>,
        user_id: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            level: level.into(),
            proof_hash: proof_hash.into(),
            user_id: user_id.into(),
            timestamp,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Attestation history read from an index.
///
/// `Degraded` means the index could not be read; its (empty) submission view
/// must be treated as "unknown", not as "no submissions".
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionListing {
    Available(Vec<ProofSubmission>),
    Degraded { reason: String },
}

impl SubmissionListing {
    /// Submissions, newest first. Empty when degraded.
    pub fn submissions(&self) -> &[ProofSubmission] {
        match self {
            Self::Available(submissions) => submissions,
            Self::Degraded { .. } => &[],
        }
    }

    pub fn into_submissions(self) -> Vec<ProofSubmission> {
        match self {
            Self::Available(submissions) => submissions,
            Self::Degraded { .. } => Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}
