//! Evidence CLI subcommands for inspecting the durable evidence archive.
//!
//! Provides commands to:
//! - `list`: Show the most recent archived records
//! - `show`: Display one record in full
//! - `history`: Show the prompt history recorded against a seed

use anyhow::{Context, Result};
use clap::Subcommand;

use super::{parse_id, print_json};
use crate::config;
use crate::store::{DurableStore, JsonlStore};

/// Evidence-related subcommands
#[derive(Subcommand, Debug)]
pub enum EvidenceCommands {
    /// List recent evidence records
    List {
        /// Maximum number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show details of an evidence record
    Show {
        /// Evidence ID to display
        evidence_id: String,
    },

    /// Show the prompts notarized against a seed, oldest first
    History {
        /// Seed ID
        seed_id: String,
    },
}

async fn open_store() -> Result<JsonlStore> {
    let cfg = config::config()?;
    JsonlStore::open(cfg.store_dir())
        .await
        .with_context(|| format!("Failed to open store at {}", cfg.store_dir().display()))
}

pub async fn execute(command: EvidenceCommands) -> Result<()> {
    let store = open_store().await?;

    match command {
        EvidenceCommands::List { limit } => {
            let records = store.all_evidence().await?;
            if records.is_empty() {
                println!("No evidence recorded");
                return Ok(());
            }

            println!("{:<38} {:<7} {:<66}", "EVIDENCE ID", "SCORE", "HASH");
            println!("{}", "-".repeat(112));
            for record in records.iter().rev().take(limit) {
                println!(
                    "{:<38} {:<7.3} {:<66}",
                    record.id, record.human_score, record.evidence_hash
                );
            }
            println!("\nTotal: {} records", records.len());
            Ok(())
        }
        EvidenceCommands::Show { evidence_id } => {
            let id = parse_id(&evidence_id, "evidence")?;
            let record = store
                .get_evidence(id)
                .await?
                .with_context(|| format!("Evidence not found: {}", id))?;
            print_json(&record)
        }
        EvidenceCommands::History { seed_id } => {
            let seed_id = parse_id(&seed_id, "seed")?;
            let records = store.evidence_for_seed(seed_id).await?;
            let prompts: Vec<&str> = records.iter().map(|r| r.prompt.as_str()).collect();
            print_json(&prompts)
        }
    }
}
