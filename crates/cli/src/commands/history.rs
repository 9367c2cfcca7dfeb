//! Attestation history from the mirror node.

use anyhow::Result;
use clap::Parser;
use console::style;

use super::print_json;
use crate::context;

#[derive(Debug, Parser)]
pub struct Submissions {
    /// Topic to read (defaults to HEDERA_TOPIC_ID)
    #[arg(short, long)]
    topic: Option<String>,

    #[arg(short, long, default_value = "10")]
    limit: usize,

    #[arg(long)]
    json: bool,
}

impl Submissions {
    pub async fn execute(self) -> Result<()> {
        let services = context::services()?;
        let topic = context::topic(&services, self.topic)?;
        let listing = services.index().list_submissions(&topic, self.limit).await;

        if listing.is_degraded() {
            eprintln!(
                "{} mirror node unavailable; history is unknown, not empty",
                style("!").yellow().bold()
            );
        }

        if self.json {
            return print_json(&listing.submissions());
        }

        for submission in listing.submissions() {
            println!(
                "{} {:<16} {:<20} {}",
                style(submission.timestamp).dim(),
                submission.level,
                submission.user_id,
                style(&submission.proof_hash).cyan()
            );
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Leaderboard {
    #[arg(short, long)]
    topic: Option<String>,

    /// Submissions to read from the topic
    #[arg(short, long, default_value = "100")]
    limit: usize,

    /// Entries to show
    #[arg(short = 'n', long, default_value = "10")]
    top: usize,

    #[arg(long)]
    json: bool,
}

impl Leaderboard {
    pub async fn execute(self) -> Result<()> {
        let services = context::services()?;
        let topic = context::topic(&services, self.topic)?;
        let board =
            attestation::Leaderboard::load(services.index().as_ref(), &topic, self.limit).await;

        if self.json {
            return print_json(&board);
        }

        if board.degraded {
            eprintln!(
                "{} mirror node unavailable; leaderboard is unknown",
                style("!").yellow().bold()
            );
        }
        println!("{}", style("=== Leaderboard ===").bold().green());
        for (rank, entry) in board.top(self.top).iter().enumerate() {
            println!(
                "{:>3}. {:<20} {} levels  {}",
                rank + 1,
                entry.user_id,
                style(entry.levels_completed()).bold(),
                style(entry.levels.join(", ")).dim()
            );
        }
        Ok(())
    }
}
