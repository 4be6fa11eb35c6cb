//! Seeds, classified projects, and the seed verification result.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::hex_bytes;

/// Dimension of every embedding, whichever judge produced it
pub const EMBEDDING_DIM: usize = 1024;

/// A registered creative seed (append-only; never mutated)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub raw_text: String,
    pub embedding: Vec<f32>,
    #[serde(with = "hex_bytes", default)]
    pub metadata: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl Seed {
    pub fn new(owner_id: Uuid, raw_text: String, embedding: Vec<f32>, metadata: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            raw_text,
            embedding,
            metadata,
            created_at: Utc::now(),
        }
    }
}

/// Classification label assigned to a seed. Terminal once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeedStatus {
    #[serde(rename = "GREEN")]
    Green,
    #[serde(rename = "YELLOW")]
    Yellow,
    #[serde(rename = "AI-SEED")]
    AiSeed,
    #[serde(rename = "PLAGIARIZED")]
    Plagiarized,
}

impl SeedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedStatus::Green => "GREEN",
            SeedStatus::Yellow => "YELLOW",
            SeedStatus::AiSeed => "AI-SEED",
            SeedStatus::Plagiarized => "PLAGIARIZED",
        }
    }
}

impl fmt::Display for SeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified seed record, created exactly once by seed verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub seed_text: String,

    /// None when triage skipped embedding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    pub status: SeedStatus,

    /// AI likelihood in [0, 100]
    pub ai_probability: f64,

    /// External plagiarism score in [0, 100]
    pub plagiarism_score: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_hash: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// What seed verification reports back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedVerificationResult {
    pub project_id: Uuid,
    pub status: SeedStatus,
    pub ai_probability: f64,
    pub plagiarism_score: f64,
    pub internal_match: bool,
    pub birth_hash: Option<String>,
    pub reasoning: String,
}
