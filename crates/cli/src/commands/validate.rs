//! Structural checks on proofs, keys and public signals.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use console::style;
use serde_json::Value;
use zk::{
    ProvingSystem, ValidationReport, validate_proof, validate_public_signals,
    validate_verification_key,
};

use super::mark;
use crate::input::{read_json, read_signals};

#[derive(Debug, Parser)]
pub struct Validate {
    /// Proving system (groth16, plonk, fflonk)
    #[arg(short, long, default_value = "groth16")]
    system: ProvingSystem,

    /// Verification key JSON
    #[arg(short, long)]
    key: Option<PathBuf>,

    /// Proof JSON
    #[arg(short, long)]
    proof: Option<PathBuf>,

    /// Public signals JSON (checked against --key when given)
    #[arg(long)]
    public: Option<PathBuf>,
}

impl Validate {
    pub fn execute(self) -> Result<()> {
        if self.key.is_none() && self.proof.is_none() && self.public.is_none() {
            bail!("Nothing to validate; pass --key, --proof and/or --public");
        }

        let key: Option<Value> = self.key.as_deref().map(read_json).transpose()?;
        let mut all_valid = true;

        if let Some(key) = &key {
            all_valid &= report("Verification key", &validate_verification_key(key, self.system));
        }
        if let Some(path) = &self.proof {
            let proof: Value = read_json(path)?;
            all_valid &= report("Proof", &validate_proof(&proof, self.system));
        }
        if let Some(path) = &self.public {
            let signals = read_signals(path)?;
            let key = key.unwrap_or(Value::Null);
            all_valid &= report(
                "Public signals",
                &validate_public_signals(&key, &signals, self.system),
            );
        }

        if !all_valid {
            bail!("Validation failed");
        }
        Ok(())
    }
}

fn report(label: &str, report: &ValidationReport) -> bool {
    println!("{} {}", mark(report.valid), style(label).bold());
    for error in &report.errors {
        println!("    {}", style(error).dim());
    }
    report.valid
}
