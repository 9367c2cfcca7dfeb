//! Off-chain proof verification.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use console::style;
use serde_json::Value;
use zk::{BatchSummary, ProofBundle, ProofVerifier, ProvingSystem, VerificationResult};

use super::{mark, print_json};
use crate::context;
use crate::input::{read_json, read_signals};

#[derive(Debug, Parser)]
pub struct Verify {
    #[arg(short, long, default_value = "groth16")]
    system: ProvingSystem,

    /// Verification key JSON
    #[arg(short, long, conflicts_with = "circuit", required_unless_present = "circuit")]
    key: Option<PathBuf>,

    /// Use the key published for this circuit
    #[arg(short, long)]
    circuit: Option<String>,

    #[arg(short, long)]
    proof: PathBuf,

    #[arg(long)]
    public: PathBuf,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

impl Verify {
    pub async fn execute(self) -> Result<()> {
        let proof: Value = read_json(&self.proof)?;
        let signals = read_signals(&self.public)?;

        let result = match (&self.key, &self.circuit) {
            (Some(path), _) => {
                let key: Value = read_json(path)?;
                ProofVerifier::new()
                    .verify(&key, &signals, &proof, self.system)
                    .await
            }
            (None, Some(circuit)) => {
                ProofVerifier::with_key_store(context::key_store())
                    .verify_with_stored_key(circuit, &signals, &proof, self.system)
                    .await?
            }
            (None, None) => bail!("Pass --key or --circuit"),
        };

        if self.json {
            print_json(&result)?;
        } else {
            print_result(&result);
        }

        if !result.verified() {
            bail!("Proof not verified");
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct VerifyBatch {
    #[arg(short, long, default_value = "groth16")]
    system: ProvingSystem,

    /// Verification key JSON
    #[arg(short, long)]
    key: PathBuf,

    /// JSON array of `{ "proof": ..., "publicSignals": [...] }`
    #[arg(short, long)]
    bundles: PathBuf,

    #[arg(long)]
    json: bool,
}

impl VerifyBatch {
    pub async fn execute(self) -> Result<()> {
        let key: Value = read_json(&self.key)?;
        let bundles: Vec<ProofBundle> = read_json(&self.bundles)?;

        let results = ProofVerifier::new()
            .batch_verify(&key, &bundles, self.system)
            .await;
        let summary = BatchSummary::from_results(&results);

        if self.json {
            print_json(&serde_json::json!({ "results": results, "summary": summary }))?;
        } else {
            for (index, result) in results.iter().enumerate() {
                print!("{:>4} ", style(format!("#{index}")).dim());
                print_result(result);
            }
            println!();
            println!(
                "{} {} total, {} verified, {} failed, {} errors",
                style("Summary:").bold().cyan(),
                summary.total,
                summary.verified,
                summary.failed,
                summary.errors
            );
            if let Some(avg) = summary.average_verification_time_ms {
                println!("         average {avg:.2} ms");
            }
        }

        if summary.verified != summary.total {
            bail!("{} of {} proofs not verified", summary.total - summary.verified, summary.total);
        }
        Ok(())
    }
}

fn print_result(result: &VerificationResult) {
    let label = if !result.success() {
        "error"
    } else if result.verified() {
        "verified"
    } else {
        "invalid"
    };
    let timing = result
        .verification_time_ms()
        .map(|ms| format!(" ({ms:.2} ms)"))
        .unwrap_or_default();
    println!("{} {}{}", mark(result.verified()), style(label).bold(), style(timing).dim());

    if let Some(details) = result.details() {
        println!("    proof {}", style(&details.proof_hash).dim());
    }
    for error in result.errors() {
        println!("    {}", style(error).red());
    }
}
