//! Command-line interface for proofa.
//!
//! Provides commands for registering users and seeds, classifying seeds,
//! notarizing prompts, issuing certificates, and inspecting evidence.
//! Results print to stdout as pretty JSON; logs go to stderr.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::config;
use crate::core::{verify_certificate, CalculateRequest, Services};

pub mod evidence;

/// proofa - Human-authorship verification and post-quantum notarization
#[derive(Parser, Debug)]
#[command(name = "proofa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a user and generate their signing key pair
    Register {
        /// Contact email
        email: String,

        /// Identifier from the external identity provider
        #[arg(long)]
        external_uid: Option<String>,
    },

    /// Register a raw seed for later prompts to be judged against
    Upload {
        /// Owner user ID
        user_id: String,

        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Free-form metadata stored alongside the seed
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Classify a seed and create a project
    Seed {
        /// Owner user ID
        user_id: String,

        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Score a prompt for human authorship and notarize the result
    Calculate {
        /// User ID to sign for
        user_id: String,

        /// Registered seed to judge the prompt against
        #[arg(short, long)]
        seed: Option<String>,

        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Score a prompt's contribution over the seed's prompt history
    Score {
        /// User ID
        user_id: String,

        /// Seed ID whose history to compare against
        seed_id: String,

        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Issue a signed authorship certificate for a project
    Certify {
        /// User ID to sign for
        user_id: String,

        /// Project ID (from `proofa seed`)
        project_id: String,
    },

    /// Group projects into a named licensing collection
    Collection {
        /// Owner user ID
        user_id: String,

        /// Collection name
        name: String,

        /// Short description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Project IDs to include (repeatable)
        #[arg(short, long = "project")]
        projects: Vec<String>,
    },

    /// Inspect notarized evidence
    Evidence {
        #[command(subcommand)]
        command: evidence::EvidenceCommands,
    },

    /// Show resolved configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Config => show_config(),
            Commands::Evidence { command } => evidence::execute(command).await,
            command => {
                let cfg = config::config()?;
                let services = Services::from_config(cfg)
                    .await
                    .context("Failed to initialise services")?;

                let result = run_command(&services, command).await;
                // Durable evidence writes finish before the process exits
                services.flush().await;
                result
            }
        }
    }
}

async fn run_command(services: &Services, command: Commands) -> Result<()> {
    match command {
        Commands::Register {
            email,
            external_uid,
        } => {
            let external_uid = external_uid.unwrap_or_else(|| format!("local:{}", Uuid::new_v4()));
            let user = services.accounts.register(&email, &external_uid).await?;
            print_json(&json!({
                "id": user.id,
                "email": user.email,
                "external_uid": user.external_uid,
                "algorithm": services.signer.algorithm(),
                "public_key": user.keys.public_key_hex(),
                "created_at": user.created_at,
            }))
        }
        Commands::Upload {
            user_id,
            input,
            metadata,
        } => {
            let owner = parse_id(&user_id, "user")?;
            let content = read_input(input)?;
            let metadata = metadata.map(String::into_bytes).unwrap_or_default();
            let seed = services
                .registry
                .upload_seed(owner, &content, metadata)
                .await?;
            print_json(&json!({
                "seed_id": seed.id,
                "owner_id": seed.owner_id,
                "dimensions": seed.embedding.len(),
                "created_at": seed.created_at,
            }))
        }
        Commands::Seed { user_id, input } => {
            let owner = parse_id(&user_id, "user")?;
            let text = read_input(input)?;
            let result = services.seeds.verify_seed(owner, &text).await?;
            print_json(&result)
        }
        Commands::Calculate {
            user_id,
            seed,
            input,
        } => {
            let request = CalculateRequest {
                user_id: parse_id(&user_id, "user")?,
                prompt: read_input(input)?,
                seed_id: seed.as_deref().map(|s| parse_id(s, "seed")).transpose()?,
            };
            let result = services.notary.calculate(request).await?;
            print_json(&result)
        }
        Commands::Score {
            user_id,
            seed_id,
            input,
        } => {
            let user_id = parse_id(&user_id, "user")?;
            let seed_id = parse_id(&seed_id, "seed")?;
            let prompt = read_input(input)?;
            let update = services
                .process
                .update_score(user_id, seed_id, &prompt)
                .await?;
            print_json(&update)
        }
        Commands::Certify {
            user_id,
            project_id,
        } => {
            let user_id = parse_id(&user_id, "user")?;
            let project_id = parse_id(&project_id, "project")?;
            let cert = services.licensing.certify(user_id, project_id).await?;

            let verified = match services.accounts.lookup(user_id).await? {
                Some(user) => {
                    verify_certificate(services.signer.as_ref(), &cert, &user.keys.public_key)?
                }
                None => false,
            };
            print_json(&json!({ "certificate": cert, "verified": verified }))
        }
        Commands::Collection {
            user_id,
            name,
            description,
            projects,
        } => {
            let user_id = parse_id(&user_id, "user")?;
            let project_ids = projects
                .iter()
                .map(|p| parse_id(p, "project"))
                .collect::<Result<Vec<_>>>()?;
            let collection = services
                .licensing
                .create_collection(user_id, &name, &description, project_ids)
                .await?;
            print_json(&collection)
        }
        Commands::Evidence { .. } | Commands::Config => Ok(()),
    }
}

pub(crate) fn parse_id(raw: &str, kind: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).with_context(|| format!("Invalid {} ID: {}", kind, raw))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Input from a file, or from stdin when it is piped
fn read_input(input_file: Option<PathBuf>) -> Result<String> {
    let input = if let Some(path) = input_file {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No input provided. Use --input <file> or pipe to stdin");
    };

    let input = input.trim_end_matches(['\n', '\r']).to_string();
    if input.trim().is_empty() {
        anyhow::bail!("Input is empty");
    }
    Ok(input)
}

fn show_config() -> Result<()> {
    let cfg = config::config()?;
    let judge = &cfg.judge;

    println!("proofa configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:  {}", cfg.home.display());
    println!("  Store: {}", cfg.store_dir().display());
    println!();
    println!("Judge:");
    println!("  Provider:        {}", judge.kind);
    println!("  Model:           {}", judge.model);
    println!("  Embedding model: {}", judge.embedding_model);
    println!("  Endpoint:        {}", judge.endpoint);
    println!(
        "  API key:         {}",
        if judge.api_key.is_some() { "set" } else { "(not set)" }
    );
    println!("  Deadline:        {}s", judge.timeout.as_secs());
    println!("  Framework:       {}", judge.legal_framework);

    Ok(())
}
