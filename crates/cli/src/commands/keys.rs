//! Published verification keys.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use console::style;
use serde_json::Value;
use zk::content_id;

use super::print_json;
use crate::context;
use crate::input::read_json;

#[derive(Debug, Parser)]
pub enum Keys {
    /// Publish a verification key under a circuit name
    Save {
        circuit: String,
        /// Verification key JSON
        file: PathBuf,
    },

    /// List circuits with a published key
    List,

    /// Print the key published for a circuit
    Show { circuit: String },
}

impl Keys {
    pub fn execute(self) -> Result<()> {
        let store = context::key_store();

        match self {
            Keys::Save { circuit, file } => {
                let key: Value = read_json(&file)?;
                let path = store.save(&circuit, &key)?;
                println!(
                    "{} {} -> {}",
                    style("Saved").green().bold(),
                    circuit,
                    style(path.display()).dim()
                );
            }
            Keys::List => {
                let circuits = store.list_circuits()?;
                if circuits.is_empty() {
                    println!(
                        "No keys in {}",
                        style(store.base_dir().display()).dim()
                    );
                }
                for circuit in circuits {
                    let id = store
                        .load_for_circuit(&circuit)
                        .map(|key| content_id(&key))
                        .unwrap_or_else(|e| format!("unreadable: {e}"));
                    println!("{circuit:<24} {}", style(id).dim());
                }
            }
            Keys::Show { circuit } => print_json(&store.load_for_circuit(&circuit)?)?,
        }
        Ok(())
    }
}
