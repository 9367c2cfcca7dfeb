//! Verifier-contract call arguments.

use std::path::PathBuf;

use anyhow::Result;
use attestation::encode_verify_proof;
use clap::Parser;
use serde_json::Value;
use zk::SolidityCallArgs;

use super::print_json;
use crate::input::{read_json, read_signals};

#[derive(Debug, Parser)]
pub struct Calldata {
    /// Groth16 proof JSON
    #[arg(short, long)]
    proof: PathBuf,

    #[arg(long)]
    public: PathBuf,

    /// Print selector-prefixed ABI call data instead of the arguments
    #[arg(long)]
    encoded: bool,
}

impl Calldata {
    pub fn execute(self) -> Result<()> {
        let proof: Value = read_json(&self.proof)?;
        let signals = read_signals(&self.public)?;
        let args = SolidityCallArgs::from_snarkjs(&proof, &signals)?;

        if self.encoded {
            println!("0x{}", hex::encode(encode_verify_proof(&args)?));
            Ok(())
        } else {
            print_json(&args)
        }
    }
}
