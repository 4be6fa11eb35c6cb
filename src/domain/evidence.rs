//! Evidence records produced by notarization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signature placeholder when signing could not be completed
pub const SIGNATURE_PENDING: &str = "PENDING_NOTARIZATION";

/// Signature marker carried by the durable archive copy
pub const SIGNATURE_ARCHIVED: &str = "ARCHIVED";

/// Signed outcome of one authorship-scoring call.
///
/// Lives in two places: the synchronous cache (live signature) and the
/// durable store (archival marker). Both copies share `id`, `evidence_hash`,
/// `human_score` and `reasoning`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub seed_id: Option<Uuid>,

    /// Human-authorship score in [0, 1]
    pub human_score: f64,

    pub reasoning: String,

    /// Hex SHA-256 of the canonical interaction JSON
    pub evidence_hash: String,

    /// Hex signature, or one of the sentinel markers
    pub signature: String,

    /// Hex public key the live signature verifies under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl EvidenceRecord {
    /// True if `signature` holds a real signature rather than a marker
    pub fn is_signed(&self) -> bool {
        self.signature != SIGNATURE_PENDING && self.signature != SIGNATURE_ARCHIVED
    }

    /// The durable-store representation of this record
    pub fn archived(&self) -> Self {
        Self {
            signature: SIGNATURE_ARCHIVED.to_string(),
            ..self.clone()
        }
    }
}

/// What a Calculate call returns to its caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateResult {
    pub evidence_id: Uuid,
    pub score: f64,
    pub reasoning: String,
    pub evidence_hash: String,
    pub signature: String,

    /// Hex public key for `signature`, if one was produced
    pub public_key: Option<String>,

    /// True when the signature came from a per-call ephemeral key
    pub ephemeral_key: bool,
}

impl CalculateResult {
    pub fn from_record(record: &EvidenceRecord, ephemeral_key: bool) -> Self {
        Self {
            evidence_id: record.id,
            score: record.human_score,
            reasoning: record.reasoning.clone(),
            evidence_hash: record.evidence_hash.clone(),
            signature: record.signature.clone(),
            public_key: record.public_key.clone(),
            ephemeral_key,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signature != SIGNATURE_PENDING
    }
}

/// Result of incremental process scoring against a seed's prompt history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub human_score: f64,
    pub reasoning: String,
    pub is_ai_proxy: bool,
    pub creative_delta: f64,
}
