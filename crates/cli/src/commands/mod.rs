//! Subcommand implementations.

mod calldata;
mod history;
mod keys;
#[cfg(feature = "hedera")]
mod ledger;
mod validate;
mod verify;

pub use calldata::Calldata;
pub use history::{Leaderboard, Submissions};
pub use keys::Keys;
#[cfg(feature = "hedera")]
pub use ledger::{CompleteLevel, TopicCreate, VerifyOnChain};
pub use validate::Validate;
pub use verify::{Verify, VerifyBatch};

use console::style;

/// Prints a JSON value to stdout.
fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn mark(ok: bool) -> console::StyledObject<&'static str> {
    if ok {
        style("✓").green().bold()
    } else {
        style("✗").red().bold()
    }
}
