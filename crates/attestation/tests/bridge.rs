//! OnChainVerificationBridge against the mock ledger.

use std::sync::Arc;

use attestation::{
    AttestationConfig, AttestationError, OnChainVerificationBridge, ResultSource,
    encode_verify_proof,
};
use ledger_core::{
    ContractId, ContractOutcome, LedgerError, MockFailure, MockLedger, OperatorCredentials,
};
use zk::SolidityCallArgs;

fn args() -> SolidityCallArgs {
    SolidityCallArgs {
        a: ["1".into(), "2".into()],
        b: [["3".into(), "4".into()], ["5".into(), "6".into()]],
        c: ["7".into(), "8".into()],
        input: vec!["15".into()],
    }
}

fn operator() -> OperatorCredentials {
    OperatorCredentials::new("0.0.2", "302e020100")
}

fn bridge(ledger: &MockLedger) -> OnChainVerificationBridge {
    OnChainVerificationBridge::new(
        Arc::new(ledger.clone()),
        "hashscan.io",
        &AttestationConfig::default(),
    )
}

#[tokio::test]
async fn verdict_from_execution_record() {
    let ledger = MockLedger::new().with_contract_outcome(ContractOutcome::Record(true));
    let contract = ContractId::new("0.0.4000");

    let outcome = bridge(&ledger)
        .verify_on_chain(&contract, &args(), &operator())
        .await
        .unwrap();

    assert!(outcome.verified);
    assert_eq!(outcome.source, ResultSource::ExecutionRecord);
    assert_eq!(
        outcome.explorer_url,
        format!("https://hashscan.io/testnet/transaction/{}", outcome.transaction_id)
    );

    let calls = ledger.contract_calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].read_only);
    assert_eq!(calls[0].gas, 1_000_000);
    assert_eq!(calls[0].call_data, encode_verify_proof(&args()).unwrap());
    assert_eq!(ledger.open_sessions(), 0);
}

#[tokio::test]
async fn falls_back_to_read_only_call() {
    let ledger = MockLedger::new().with_contract_outcome(ContractOutcome::QueryOnly(false));

    let outcome = bridge(&ledger)
        .verify_on_chain(&ContractId::new("0.0.4000"), &args(), &operator())
        .await
        .unwrap();

    assert!(!outcome.verified);
    assert_eq!(outcome.source, ResultSource::ReadOnlyCall);

    let calls = ledger.contract_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].read_only);
    assert_eq!(calls[1].gas, 300_000);
    assert_eq!(calls[1].call_data, calls[0].call_data);
}

#[tokio::test]
async fn falls_back_to_transaction_status() {
    let ledger = MockLedger::new().with_contract_outcome(ContractOutcome::StatusOnly);

    let outcome = bridge(&ledger)
        .verify_on_chain(&ContractId::new("0.0.4000"), &args(), &operator())
        .await
        .unwrap();

    assert!(outcome.verified);
    assert_eq!(outcome.source, ResultSource::TransactionStatus);
    assert!(outcome.is_degraded());
    assert_eq!(ledger.open_sessions(), 0);
}

#[tokio::test]
async fn revert_means_invalid_proof() {
    let ledger = MockLedger::new().with_contract_outcome(ContractOutcome::Revert);
    let contract = ContractId::new("0.0.4000");

    let err = bridge(&ledger)
        .verify_on_chain(&contract, &args(), &operator())
        .await
        .unwrap_err();

    match err {
        AttestationError::VerificationFailedOnChain { contract: reverted } => {
            assert_eq!(reverted, contract)
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ledger.sessions_opened(), 1);
    assert_eq!(ledger.open_sessions(), 0);
}

#[tokio::test]
async fn connection_failure_propagates() {
    let ledger = MockLedger::new();
    ledger.fail(MockFailure::Connect);

    let err = bridge(&ledger)
        .verify_on_chain(&ContractId::new("0.0.4000"), &args(), &operator())
        .await
        .unwrap_err();

    assert!(matches!(err, AttestationError::Ledger(LedgerError::Network(_))));
    assert!(ledger.contract_calls().is_empty());
    assert_eq!(ledger.open_sessions(), 0);
}

#[tokio::test]
async fn malformed_arguments_fail_before_connecting() {
    let ledger = MockLedger::new();
    let mut bad = args();
    bad.a[0] = "not-a-number".into();

    let err = bridge(&ledger)
        .verify_on_chain(&ContractId::new("0.0.4000"), &bad, &operator())
        .await
        .unwrap_err();

    assert!(matches!(err, AttestationError::Encoding(_)));
    assert_eq!(ledger.sessions_opened(), 0);
}

#[tokio::test]
async fn snarkjs_proof_is_converted() {
    let ledger = MockLedger::new();
    let proof = serde_json::json!({
        "pi_a": ["1", "2", "1"],
        "pi_b": [["3", "4"], ["5", "6"], ["1", "0"]],
        "pi_c": ["7", "8", "1"],
        "protocol": "groth16"
    });

    bridge(&ledger)
        .verify_snarkjs(
            &ContractId::new("0.0.4000"),
            &proof,
            &["15".to_string()],
            &operator(),
        )
        .await
        .unwrap();

    let expected = encode_verify_proof(&SolidityCallArgs {
        a: ["1".into(), "2".into()],
        b: [["4".into(), "3".into()], ["6".into(), "5".into()]],
        c: ["7".into(), "8".into()],
        input: vec!["15".into()],
    })
    .unwrap();
    assert_eq!(ledger.contract_calls()[0].call_data, expected);
}
