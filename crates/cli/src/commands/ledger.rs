//! Signed ledger operations.

use std::path::PathBuf;

use anyhow::{Result, bail};
use attestation::{LevelCompletion, TransferOutcome, consensus::TOPIC_MEMO};
use clap::Parser;
use console::style;
use ledger_core::{AccountId, ContractId};
use serde_json::Value;

use super::{mark, print_json};
use crate::context;
use crate::input::{read_json, read_signals};

#[derive(Debug, Parser)]
pub struct VerifyOnChain {
    /// Verifier contract id (shard.realm.num)
    #[arg(long)]
    contract: String,

    /// Groth16 proof JSON
    #[arg(short, long)]
    proof: PathBuf,

    #[arg(long)]
    public: PathBuf,

    #[arg(long)]
    json: bool,
}

impl VerifyOnChain {
    pub async fn execute(self) -> Result<()> {
        let proof: Value = read_json(&self.proof)?;
        let signals = read_signals(&self.public)?;

        let services = context::services()?;
        let ledger = services.ledger()?;
        let outcome = ledger
            .bridge
            .verify_snarkjs(
                &ContractId::new(self.contract),
                &proof,
                &signals,
                &ledger.operator,
            )
            .await?;

        if self.json {
            print_json(&outcome)?;
        } else {
            println!(
                "{} {}",
                mark(outcome.verified),
                style(if outcome.verified { "verified on-chain" } else { "rejected on-chain" }).bold()
            );
            println!("    transaction {}", outcome.transaction_id);
            println!("    {}", style(&outcome.explorer_url).cyan());
            if outcome.is_degraded() {
                println!(
                    "    {}",
                    style("verdict taken from transaction status only").yellow()
                );
            }
        }

        if !outcome.verified {
            bail!("Proof rejected by verifier contract");
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct TopicCreate {
    #[arg(long, default_value = TOPIC_MEMO)]
    memo: String,
}

impl TopicCreate {
    pub async fn execute(self) -> Result<()> {
        let services = context::services()?;
        let topic = services.ledger()?.submitter.create_topic(&self.memo).await?;
        println!("{} topic {}", style("Created").green().bold(), topic);
        println!("    set HEDERA_TOPIC_ID={topic} to reuse it");
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct CompleteLevel {
    #[arg(long)]
    level: String,

    #[arg(long)]
    user: String,

    #[arg(long)]
    proof_hash: String,

    /// Account receiving the reward; the reward stays in the treasury when absent
    #[arg(long)]
    recipient: Option<String>,

    /// Image reference for the reward metadata
    #[arg(long, default_value = "")]
    image: String,

    #[arg(long)]
    json: bool,
}

impl CompleteLevel {
    pub async fn execute(self) -> Result<()> {
        let services = context::services()?;
        let ledger = services.ledger()?;

        let mut completion =
            LevelCompletion::new(self.level, self.user, self.proof_hash).with_image(self.image);
        if let Some(recipient) = self.recipient {
            completion = completion.with_recipient(AccountId::new(recipient));
        }

        let report = ledger.orchestrator.complete_level(&completion).await?;
        if self.json {
            return print_json(&report);
        }

        println!(
            "{} attestation {}",
            mark(true),
            style(&report.transaction_id).cyan()
        );
        println!(
            "    {}",
            style(services.hedera().explorer_url(&report.transaction_id)).dim()
        );
        match (&report.token_id, report.nft_serial) {
            (Some(token), Some(serial)) => println!("{} reward {token} #{serial}", mark(true)),
            _ => println!(
                "{} reward not minted: {}",
                mark(false),
                report.reward_error.as_deref().unwrap_or("unknown")
            ),
        }
        match &report.transfer {
            TransferOutcome::Transferred(tx) => println!("{} transferred in {tx}", mark(true)),
            TransferOutcome::Failed(reason) => println!("{} transfer failed: {reason}", mark(false)),
            TransferOutcome::Skipped => println!("    no recipient; reward kept in treasury"),
            TransferOutcome::NotAttempted => {}
        }
        Ok(())
    }
}
