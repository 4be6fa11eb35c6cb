//! Core verification and notarization logic.
//!
//! This module contains:
//! - Orchestrator: deadline-bounded access to the active judge
//! - SeedEngine: seed triage and classification
//! - AccountService / RegistryService: users and registered seeds
//! - ProofaEngine: score, hash, sign and record prompts
//! - ProcessEngine: incremental scoring over prompt history
//! - LicensingService: authorship certificates and collections

pub mod accounts;
pub mod classify;
pub mod licensing;
pub mod notary;
pub mod orchestrator;
pub mod process;
pub mod registry;
pub mod services;

// Re-export commonly used types
pub use accounts::{AccountService, SigningIdentity};
pub use classify::{birth_hash, decide_status, is_simple_command, SeedEngine};
pub use licensing::{build_report, verify_certificate, LicensingService};
pub use notary::{verify_evidence, CalculateRequest, ProofaEngine};
pub use orchestrator::Orchestrator;
pub use process::ProcessEngine;
pub use registry::RegistryService;
pub use services::{Backends, Services};
