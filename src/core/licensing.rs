//! Authorship certificates and licensing collections.
//!
//! Certification follows the same hash-then-sign pattern as notarization,
//! without branching: build the report, canonicalize, hash, sign, persist.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::accounts::AccountService;
use crate::crypto::{canonical_json, sha256_digest, Signer};
use crate::domain::{
    AuthorshipCertificate, AuthorshipReport, Collection, Project, SeedStatus, SIGNATURE_PENDING,
};
use crate::error::{ProofaError, Result};
use crate::store::DurableStore;

pub const LEGAL_CITATIONS: &[&str] = &[
    "EU AI Act Article 52 (Transparency)",
    "US Copyright Office Policy (Human Authorship Requirement)",
];

pub const AUDIT_STEPS: &[&str] = &[
    "Creation of Birth-Hash for Unique Seed",
    "Detection of Manual Prompt Enrichment (Delta > 0.4)",
    "PQC Signature from Verified Artist Device",
];

fn status_reasoning(status: SeedStatus) -> &'static str {
    match status {
        SeedStatus::Green => "Seed verified as unique human-authored work.",
        SeedStatus::Yellow => "Seed accepted with reservations; authorship requires further process evidence.",
        SeedStatus::AiSeed => "Seed shows high AI probability; certification relies on subsequent human contribution.",
        SeedStatus::Plagiarized => "Seed matched external material; certification does not establish originality.",
    }
}

/// Audit report for a classified project
pub fn build_report(project: &Project) -> AuthorshipReport {
    AuthorshipReport {
        project_id: project.id,
        human_score: (1.0 - project.ai_probability / 100.0).clamp(0.0, 1.0),
        reasoning: status_reasoning(project.status).to_string(),
        evidence_hash: project.birth_hash.clone(),
        legal_citations: LEGAL_CITATIONS.iter().map(|s| s.to_string()).collect(),
        audit_log: AUDIT_STEPS.iter().map(|s| s.to_string()).collect(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}

pub struct LicensingService {
    accounts: Arc<AccountService>,
    signer: Arc<dyn Signer>,
    store: Arc<dyn DurableStore>,
}

impl LicensingService {
    pub fn new(
        accounts: Arc<AccountService>,
        signer: Arc<dyn Signer>,
        store: Arc<dyn DurableStore>,
    ) -> Self {
        Self {
            accounts,
            signer,
            store,
        }
    }

    /// Issue a signed certificate for one of the user's projects
    #[instrument(skip(self))]
    pub async fn certify(&self, user_id: Uuid, project_id: Uuid) -> Result<AuthorshipCertificate> {
        let project = self
            .store
            .get_project(project_id)
            .await?
            .ok_or_else(|| ProofaError::NotFound(format!("project {}", project_id)))?;

        let report = build_report(&project);
        let audit_data = canonical_json(&report)
            .map_err(|e| ProofaError::Signing(format!("failed to canonicalize report: {}", e)))?;
        let digest = sha256_digest(audit_data.as_bytes());

        let pqc_signature = match self.accounts.signing_identity(user_id).await {
            Some(identity) => match self.signer.sign(&identity.keys.private_key, &digest) {
                Ok(sig) => hex::encode(sig),
                Err(e) => {
                    warn!(error = %e, "Certificate signing failed, left pending");
                    SIGNATURE_PENDING.to_string()
                }
            },
            None => SIGNATURE_PENDING.to_string(),
        };

        let cert = AuthorshipCertificate {
            id: Uuid::new_v4(),
            project_id,
            user_id,
            certification_hash: hex::encode(digest),
            pqc_signature,
            audit_data,
            created_at: Utc::now(),
        };
        self.store.create_certificate(&cert).await?;

        info!(certificate_id = %cert.id, "Authorship certificate issued");
        Ok(cert)
    }

    #[instrument(skip(self, description, project_ids), fields(projects = project_ids.len()))]
    pub async fn create_collection(
        &self,
        user_id: Uuid,
        name: &str,
        description: &str,
        project_ids: Vec<Uuid>,
    ) -> Result<Collection> {
        let collection = Collection {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            description: description.to_string(),
            project_ids,
            created_at: Utc::now(),
        };
        self.store.create_collection(&collection).await?;

        info!(collection_id = %collection.id, "Collection created");
        Ok(collection)
    }
}

/// Re-hash `audit_data` and check the certificate signature against it
pub fn verify_certificate(
    signer: &dyn Signer,
    cert: &AuthorshipCertificate,
    public_key: &[u8],
) -> Result<bool> {
    let digest = sha256_digest(cert.audit_data.as_bytes());
    if hex::encode(digest) != cert.certification_hash {
        return Ok(false);
    }

    let signature = match hex::decode(&cert.pqc_signature) {
        Ok(sig) => sig,
        Err(_) => return Ok(false),
    };
    signer.verify(public_key, &digest, &signature)
}
