//! Command-line front end for proof verification and ledger attestation.
//!
//! Configuration comes from the environment (and `.env`); see
//! `HederaConfig::from_env`, `AttestationConfig::from_env` and
//! `KeyStoreConfig::from_env`.

mod commands;
mod context;
mod input;
mod logging;

use anyhow::Result;
use clap::Parser;

use commands::{
    Calldata, Keys, Leaderboard, Submissions, Validate, Verify, VerifyBatch,
};
#[cfg(feature = "hedera")]
use commands::{CompleteLevel, TopicCreate, VerifyOnChain};

/// Verify zk-SNARK proofs and attest them on a ledger
#[derive(Parser)]
#[command(name = "zk-attest")]
#[command(about = "Verify zk-SNARK proofs and attest them on a ledger", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to this directory (env: ZK_ATTEST_LOG_DIR)
    #[arg(long, global = true, env = "ZK_ATTEST_LOG_DIR")]
    log_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Check proof, key and signal structure without verifying
    Validate(Validate),

    /// Verify one proof
    Verify(Verify),

    /// Verify a list of proofs against one key
    VerifyBatch(VerifyBatch),

    /// Manage published verification keys
    #[command(subcommand)]
    Keys(Keys),

    /// Print verifier-contract call arguments for a Groth16 proof
    Calldata(Calldata),

    /// List attestations recorded on the consensus topic
    Submissions(Submissions),

    /// Rank users by attested levels
    Leaderboard(Leaderboard),

    /// Re-verify a Groth16 proof through a verifier contract
    #[cfg(feature = "hedera")]
    VerifyOnchain(VerifyOnChain),

    /// Consensus topic commands
    #[cfg(feature = "hedera")]
    #[command(subcommand)]
    Topic(TopicCommand),

    /// Attest a completed level and issue its reward
    #[cfg(feature = "hedera")]
    CompleteLevel(CompleteLevel),
}

#[cfg(feature = "hedera")]
#[derive(Parser)]
enum TopicCommand {
    /// Create a new attestation topic
    Create(TopicCreate),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::init(cli.log_dir.as_deref())?;

    match cli.command {
        Command::Validate(cmd) => cmd.execute(),
        Command::Verify(cmd) => cmd.execute().await,
        Command::VerifyBatch(cmd) => cmd.execute().await,
        Command::Keys(cmd) => cmd.execute(),
        Command::Calldata(cmd) => cmd.execute(),
        Command::Submissions(cmd) => cmd.execute().await,
        Command::Leaderboard(cmd) => cmd.execute().await,
        #[cfg(feature = "hedera")]
        Command::VerifyOnchain(cmd) => cmd.execute().await,
        #[cfg(feature = "hedera")]
        Command::Topic(TopicCommand::Create(cmd)) => cmd.execute().await,
        #[cfg(feature = "hedera")]
        Command::CompleteLevel(cmd) => cmd.execute().await,
    }
}
