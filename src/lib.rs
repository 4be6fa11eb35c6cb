//! proofa - Human-authorship verification and post-quantum notarization
//!
//! Classifies creative seeds, scores prompts for human authorship through a
//! deadline-bounded judge, and notarizes each result with a Dilithium
//! signature over a canonical evidence hash.
//!
//! # Architecture
//!
//! - Every oracle call goes through one `Orchestrator` with a hard deadline
//! - Evidence is written to a synchronous cache before a call returns, and
//!   archived to the durable store in the background
//! - Shared caches are sharded so unrelated users never contend on one lock
//!
//! # Modules
//!
//! - `adapters`: Judge providers (heuristic, Gemini) and plagiarism check
//! - `core`: Engines (classification, notarization, process, licensing)
//! - `crypto`: Signer trait, Dilithium backend, hashing helpers
//! - `domain`: Data structures (Seed, Project, EvidenceRecord, Certificate)
//! - `store`: Durable store, similarity index, sharded cache
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Register a user, then classify a seed
//! proofa register artist@example.com
//! echo "A lighthouse that collects lost echoes" | proofa seed <user-id>
//!
//! # Notarize a prompt against a registered seed
//! echo "the echoes now sing in reverse" | proofa calculate <user-id> --seed <seed-id>
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod store;

// Re-export main types at crate root for convenience
pub use crate::core::{CalculateRequest, Orchestrator, ProofaEngine, SeedEngine, Services};
pub use domain::{CalculateResult, EvidenceRecord, SeedStatus, SeedVerificationResult};
pub use error::{ProofaError, Result};
