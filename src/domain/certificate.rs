//! Authorship certificates and licensing collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit report that gets canonicalized, hashed and signed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorshipReport {
    pub project_id: Uuid,
    pub human_score: f64,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_hash: Option<String>,
    pub legal_citations: Vec<String>,
    pub audit_log: Vec<String>,
    /// RFC 3339
    pub timestamp: String,
}

/// Terminal legal artifact; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorshipCertificate {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,

    /// Hex SHA-256 of `audit_data`
    pub certification_hash: String,

    /// Hex signature over the certification digest, or the pending marker
    pub pqc_signature: String,

    /// Canonical JSON of the [`AuthorshipReport`]
    pub audit_data: String,

    pub created_at: DateTime<Utc>,
}

/// A named group of projects offered for licensing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub project_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}
