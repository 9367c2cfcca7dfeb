//! LevelCompletionOrchestrator workflow against the mock ledger.

use std::sync::Arc;

use attestation::{
    AttestationConfig, AttestationError, ConsensusLogSubmitter, LevelCompletion,
    LevelCompletionOrchestrator, RewardIssuer, TransferOutcome,
};
use ledger_core::{AccountId, MockFailure, MockLedger, OperatorCredentials, TopicId};

fn operator() -> OperatorCredentials {
    OperatorCredentials::new("0.0.2", "302e020100")
}

async fn orchestrator(ledger: &MockLedger) -> (LevelCompletionOrchestrator, TopicId) {
    let connector = Arc::new(ledger.clone());
    let submitter = ConsensusLogSubmitter::new(connector.clone(), operator());
    let topic = submitter.create_topic("attestations").await.unwrap();
    let issuer = RewardIssuer::new(connector, operator(), &AttestationConfig::default());
    (
        LevelCompletionOrchestrator::new(Arc::new(submitter), Arc::new(issuer)),
        topic,
    )
}

fn completion() -> LevelCompletion {
    LevelCompletion::new("level-1", "u1", "0xabc")
        .at(1000)
        .with_image("ipfs://reward")
}

#[tokio::test]
async fn attests_mints_and_transfers() {
    let ledger = MockLedger::new();
    let (orchestrator, topic) = orchestrator(&ledger).await;

    let report = orchestrator
        .complete_level(&completion().with_recipient(AccountId::new("0.0.900")))
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.nft_serial, Some(1));
    assert!(matches!(report.transfer, TransferOutcome::Transferred(_)));
    assert!(report.reward_error.is_none());

    assert_eq!(ledger.messages(&topic).len(), 1);
    let token = report.token_id.unwrap();
    assert_eq!(ledger.minted(&token).len(), 1);
    assert_eq!(ledger.transfers()[0].to, AccountId::new("0.0.900"));
    assert_eq!(ledger.transfers()[0].fee_tinybars, 100_000);
    assert_eq!(ledger.open_sessions(), 0);
}

#[tokio::test]
async fn no_recipient_skips_transfer() {
    let ledger = MockLedger::new();
    let (orchestrator, _) = orchestrator(&ledger).await;

    let report = orchestrator.complete_level(&completion()).await.unwrap();

    assert_eq!(report.transfer, TransferOutcome::Skipped);
    assert!(report.is_complete());
    assert!(ledger.transfers().is_empty());
}

#[tokio::test]
async fn completes_without_image_and_embeds_proof() {
    let ledger = MockLedger::new();
    let (orchestrator, _) = orchestrator(&ledger).await;

    let report = orchestrator
        .complete_level(&LevelCompletion::new("sudoku", "u1", "0xabc").at(1000))
        .await
        .unwrap();

    assert!(report.is_complete(), "{:?}", report.reward_error);
    assert_eq!(report.nft_serial, Some(1));
    let minted = ledger.minted(&report.token_id.unwrap());
    let metadata: serde_json::Value = serde_json::from_slice(&minted[0]).unwrap();
    assert_eq!(metadata["level"], "sudoku");
    assert_eq!(metadata["proofHash"], "0xabc");
}

#[tokio::test]
async fn long_proof_hash_without_image_still_mints() {
    let ledger = MockLedger::new();
    let (orchestrator, _) = orchestrator(&ledger).await;
    let hash = format!("0x{}", "7f".repeat(32));

    let report = orchestrator
        .complete_level(&LevelCompletion::new("level-12", "u1", hash.as_str()).at(1000))
        .await
        .unwrap();

    assert!(report.reward_error.is_none(), "{:?}", report.reward_error);
    let minted = ledger.minted(&report.token_id.unwrap());
    assert!(minted[0].len() <= attestation::MAX_METADATA_BYTES);
    let metadata: serde_json::Value = serde_json::from_slice(&minted[0]).unwrap();
    assert_eq!(metadata["level"], "level-12");
    assert!(hash.starts_with(metadata["proofHash"].as_str().unwrap()));
}

#[tokio::test]
async fn failed_attestation_aborts_before_minting() {
    let ledger = MockLedger::new();
    let (orchestrator, topic) = orchestrator(&ledger).await;
    ledger.fail(MockFailure::Submit);

    let err = orchestrator.complete_level(&completion()).await.unwrap_err();

    assert!(matches!(err, AttestationError::Ledger(_)));
    assert!(ledger.messages(&topic).is_empty());
    assert!(ledger.token_classes().is_empty());
}

#[tokio::test]
async fn mint_failure_is_partial_success() {
    let ledger = MockLedger::new();
    let (orchestrator, topic) = orchestrator(&ledger).await;
    ledger.fail(MockFailure::Mint);

    let report = orchestrator
        .complete_level(&completion().with_recipient(AccountId::new("0.0.900")))
        .await
        .unwrap();

    assert!(!report.transaction_id.as_str().is_empty());
    assert!(report.nft_serial.is_none());
    assert!(report.token_id.is_some());
    assert_eq!(report.transfer, TransferOutcome::NotAttempted);
    assert!(report.reward_error.unwrap().contains("TOKEN_HAS_NO_SUPPLY_KEY"));
    assert_eq!(ledger.messages(&topic).len(), 1);
}

#[tokio::test]
async fn transfer_failure_keeps_mint() {
    let ledger = MockLedger::new();
    let (orchestrator, _) = orchestrator(&ledger).await;
    ledger.fail(MockFailure::Transfer);

    let report = orchestrator
        .complete_level(&completion().with_recipient(AccountId::new("0.0.900")))
        .await
        .unwrap();

    assert_eq!(report.nft_serial, Some(1));
    assert!(matches!(report.transfer, TransferOutcome::Failed(_)));
    assert!(!report.is_complete());

    ledger.recover(MockFailure::Transfer);
    let token = report.token_id.unwrap();
    orchestrator
        .issuer()
        .transfer(&token, 1, &AccountId::new("0.0.900"))
        .await
        .unwrap();
    assert_eq!(ledger.transfers().len(), 1);
}

#[tokio::test]
async fn concurrent_first_completions_share_one_token_class() {
    let ledger = MockLedger::new();
    let (orchestrator, topic) = orchestrator(&ledger).await;
    let orchestrator = Arc::new(orchestrator);

    let mut handles = Vec::new();
    for user in 0..6 {
        let orchestrator = orchestrator.clone();
        handles.push(tokio::spawn(async move {
            let completion = LevelCompletion::new("level-7", format!("u{user}"), "0x1")
                .at(user)
                .with_image("ipfs://level-7");
            orchestrator.complete_level(&completion).await
        }));
    }

    let mut serials = Vec::new();
    for handle in handles {
        let report = handle.await.unwrap().unwrap();
        serials.push(report.nft_serial.unwrap());
    }
    serials.sort_unstable();

    assert_eq!(ledger.token_classes().len(), 1);
    assert_eq!(serials, [1, 2, 3, 4, 5, 6]);
    assert_eq!(ledger.messages(&topic).len(), 6);
}
