//! Notarization: score a prompt, hash the interaction, sign it, record it.
//!
//! Each call writes its record twice:
//! - the evidence cache, synchronously, before the call returns (live signature)
//! - the durable store, from a spawned task (archival marker as signature)
//!
//! Both copies share id, hash, score and reasoning. [`ProofaEngine::flush`]
//! waits for the spawned writes.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::accounts::{AccountService, SigningIdentity};
use super::orchestrator::Orchestrator;
use super::registry::RegistryService;
use crate::crypto::{canonical_json, sha256_digest, Signer};
use crate::domain::{CalculateResult, EvidenceRecord, SIGNATURE_PENDING};
use crate::error::{ProofaError, Result};
use crate::store::{DurableStore, ShardedCache};

/// Input to one notarization call
#[derive(Debug, Clone)]
pub struct CalculateRequest {
    pub user_id: Uuid,
    pub prompt: String,
    pub seed_id: Option<Uuid>,
}

/// The exact fields covered by the evidence hash
#[derive(Serialize)]
struct InteractionPayload<'a> {
    user_id: Uuid,
    prompt: &'a str,
    seed_id: Option<Uuid>,
    score: f64,
}

/// SHA-256 of the canonical interaction JSON
fn interaction_digest(
    user_id: Uuid,
    prompt: &str,
    seed_id: Option<Uuid>,
    score: f64,
) -> Result<[u8; 32]> {
    let payload = InteractionPayload {
        user_id,
        prompt,
        seed_id,
        score,
    };
    let canonical = canonical_json(&payload)
        .map_err(|e| ProofaError::Signing(format!("failed to canonicalize evidence: {}", e)))?;
    Ok(sha256_digest(canonical.as_bytes()))
}

pub struct ProofaEngine {
    orchestrator: Arc<Orchestrator>,
    accounts: Arc<AccountService>,
    registry: Arc<RegistryService>,
    signer: Arc<dyn Signer>,
    store: Arc<dyn DurableStore>,
    cache: ShardedCache<Uuid, EvidenceRecord>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl ProofaEngine {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        accounts: Arc<AccountService>,
        registry: Arc<RegistryService>,
        signer: Arc<dyn Signer>,
        store: Arc<dyn DurableStore>,
    ) -> Self {
        Self {
            orchestrator,
            accounts,
            registry,
            signer,
            store,
            cache: ShardedCache::new(),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Score, hash, sign and record one prompt.
    ///
    /// Oracle failure aborts with nothing cached. Missing keys or a failed
    /// signature still return a result, signed ephemerally or marked pending.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, seed_id = ?request.seed_id))]
    pub async fn calculate(&self, request: CalculateRequest) -> Result<CalculateResult> {
        let identity = self.accounts.signing_identity(request.user_id).await;
        let context = self.registry.seed_context(request.seed_id).await;

        let judgment = self
            .orchestrator
            .verify_authorship(&request.prompt, &context)
            .await?;

        let digest = interaction_digest(
            request.user_id,
            &request.prompt,
            request.seed_id,
            judgment.score,
        )?;
        let evidence_hash = hex::encode(digest);

        let (signature, public_key, ephemeral) = self.sign_digest(&digest, identity.as_ref());

        let record = EvidenceRecord {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            prompt: request.prompt,
            seed_id: request.seed_id,
            human_score: judgment.score,
            reasoning: judgment.reasoning,
            evidence_hash,
            signature,
            public_key,
            created_at: Utc::now(),
        };

        self.cache.insert(record.id, record.clone());
        self.archive(record.archived());

        info!(
            evidence_id = %record.id,
            score = record.human_score,
            signed = record.is_signed(),
            ephemeral,
            "Evidence notarized"
        );

        Ok(CalculateResult::from_record(&record, ephemeral))
    }

    /// Returns (signature, public key hex, ephemeral). Falls back to the
    /// pending marker on any signing problem.
    fn sign_digest(
        &self,
        digest: &[u8; 32],
        identity: Option<&SigningIdentity>,
    ) -> (String, Option<String>, bool) {
        let Some(identity) = identity else {
            warn!("No signing identity available, evidence left pending");
            return (SIGNATURE_PENDING.to_string(), None, false);
        };

        match self.signer.sign(&identity.keys.private_key, digest) {
            Ok(sig) => (
                hex::encode(sig),
                Some(identity.keys.public_key_hex()),
                identity.ephemeral,
            ),
            Err(e) => {
                warn!(error = %e, "Signing failed, evidence left pending");
                (SIGNATURE_PENDING.to_string(), None, identity.ephemeral)
            }
        }
    }

    fn archive(&self, record: EvidenceRecord) {
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move {
            if let Err(e) = store.create_evidence(&record).await {
                warn!(evidence_id = %record.id, error = %e, "Durable evidence write failed");
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Wait for every durable write issued so far
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            pending.drain(..).collect()
        };

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Durable evidence task failed");
            }
        }
    }

    /// Everything in the evidence cache (admin/debug view)
    pub fn cached_evidence(&self) -> Vec<EvidenceRecord> {
        let mut records = self.cache.values();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// Live record from the cache, else the durable copy
    pub async fn evidence(&self, id: Uuid) -> Result<Option<EvidenceRecord>> {
        if let Some(record) = self.cache.get(&id) {
            return Ok(Some(record));
        }
        Ok(self.store.get_evidence(id).await?)
    }
}

/// Check that `record` is internally consistent and signed by `public_key`.
///
/// Recomputes the evidence hash from the record's own fields, so a tampered
/// score or prompt fails even when the signature bytes are untouched.
pub fn verify_evidence(
    signer: &dyn Signer,
    record: &EvidenceRecord,
    public_key: &[u8],
) -> Result<bool> {
    let digest = interaction_digest(
        record.user_id,
        &record.prompt,
        record.seed_id,
        record.human_score,
    )?;
    if hex::encode(digest) != record.evidence_hash {
        return Ok(false);
    }

    let signature = match hex::decode(&record.signature) {
        Ok(sig) => sig,
        Err(_) => return Ok(false),
    };
    signer.verify(public_key, &digest, &signature)
}
