//! Domain types for the proofa engine.
//!
//! This module contains the core data structures:
//! - Judgment: one oracle verdict
//! - Seed / Project: registered and classified creative seeds
//! - Evidence: notarized scoring records
//! - Certificate: signed authorship reports
//! - User: account with its signing key pair

pub mod certificate;
pub mod evidence;
pub mod judgment;
pub mod seed;
pub mod user;

// Re-export commonly used types
pub use certificate::{AuthorshipCertificate, AuthorshipReport, Collection};
pub use evidence::{
    CalculateResult, EvidenceRecord, ScoreUpdate, SIGNATURE_ARCHIVED, SIGNATURE_PENDING,
};
pub use judgment::JudgmentResult;
pub use seed::{Project, Seed, SeedStatus, SeedVerificationResult, EMBEDDING_DIM};
pub use user::User;
