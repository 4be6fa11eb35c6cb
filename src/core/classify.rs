//! Seed intake: triage, similarity, AI and plagiarism signals, status label.
//!
//! Steps run in a fixed order and the first terminal branch wins:
//! 1. Triage low-creative-intent input straight to YELLOW (no oracle calls)
//! 2. Embed and look for a near-duplicate among the owner's seeds
//! 3. AI likelihood (fatal on failure)
//! 4. External plagiarism score
//! 5. Priority-ordered status decision
//! 6. Birth hash, unless plagiarized or an internal duplicate
//! 7. Persist the project

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::orchestrator::Orchestrator;
use crate::adapters::PlagiarismCheck;
use crate::crypto::sha256_hex;
use crate::domain::{Project, SeedStatus, SeedVerificationResult};
use crate::error::{ProofaError, Result};
use crate::store::{DurableStore, ShardedCache, SimilarityIndex};

/// Similarity above which a seed counts as an internal duplicate
pub const INTERNAL_MATCH_THRESHOLD: f64 = 0.95;
pub const AI_SEED_THRESHOLD: f64 = 90.0;
pub const PLAGIARISM_THRESHOLD: f64 = 20.0;
pub const MODERATE_AI_THRESHOLD: f64 = 70.0;

/// Inputs shorter than this (in bytes) carry no usable signal
pub const MIN_CREATIVE_LENGTH: usize = 20;

/// AI probability recorded for triaged commands
pub const TRIAGE_AI_PROBABILITY: f64 = 100.0;

const LOW_INTENT_MARKERS: &[&str] = &["screenshot", "uploaded file"];

const COMMAND_PREFIXES: &[&str] = &[
    "explain",
    "write a",
    "create a",
    "how to",
    "tell me",
    "summarize",
    "what is",
    "help me",
    "analyze this",
    "give me",
];

/// True for inputs that read as a plain instruction rather than a seed
pub fn is_simple_command(text: &str) -> bool {
    let lower = text.trim().to_lowercase();

    if LOW_INTENT_MARKERS.iter().any(|m| lower.contains(m)) {
        return true;
    }
    if COMMAND_PREFIXES.iter().any(|c| lower.starts_with(c)) {
        return true;
    }
    text.len() < MIN_CREATIVE_LENGTH
}

/// Status and reasoning for a set of signals. First matching rule wins;
/// lower-priority signals are not reported even when they also hold.
pub fn decide_status(
    ai_probability: f64,
    plagiarism_score: f64,
    internal_match: bool,
) -> (SeedStatus, &'static str) {
    if ai_probability > AI_SEED_THRESHOLD {
        (
            SeedStatus::AiSeed,
            "High AI probability detected. Higher proof threshold required.",
        )
    } else if plagiarism_score > PLAGIARISM_THRESHOLD {
        (SeedStatus::Plagiarized, "External plagiarism match detected.")
    } else if internal_match {
        (
            SeedStatus::Yellow,
            "Internal similarity match. Protecting existing authorship.",
        )
    } else if ai_probability > MODERATE_AI_THRESHOLD {
        (SeedStatus::Yellow, "Moderate AI patterns detected.")
    } else {
        (SeedStatus::Green, "Unique human-authored seed detected.")
    }
}

/// `hex(sha256("{owner}:{text}:{nanos}"))`
pub fn birth_hash(owner_id: Uuid, text: &str, timestamp_nanos: i64) -> String {
    sha256_hex(format!("{}:{}:{}", owner_id, text, timestamp_nanos).as_bytes())
}

static LAST_BIRTH_NANOS: AtomicI64 = AtomicI64::new(0);

/// Wall-clock nanoseconds, strictly increasing across calls in this process
fn next_birth_nanos() -> i64 {
    let now = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros().saturating_mul(1_000));

    let mut last = LAST_BIRTH_NANOS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_BIRTH_NANOS.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
        {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

/// Seed classification engine
pub struct SeedEngine {
    orchestrator: Arc<Orchestrator>,
    store: Arc<dyn DurableStore>,
    index: Arc<dyn SimilarityIndex>,
    plagiarism: Arc<dyn PlagiarismCheck>,
    projects: ShardedCache<Uuid, Project>,
}

impl SeedEngine {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        store: Arc<dyn DurableStore>,
        index: Arc<dyn SimilarityIndex>,
        plagiarism: Arc<dyn PlagiarismCheck>,
    ) -> Self {
        Self {
            orchestrator,
            store,
            index,
            plagiarism,
            projects: ShardedCache::new(),
        }
    }

    /// Classify a seed and persist the resulting project
    #[instrument(skip(self, seed_text), fields(len = seed_text.len()))]
    pub async fn verify_seed(
        &self,
        owner_id: Uuid,
        seed_text: &str,
    ) -> Result<SeedVerificationResult> {
        if is_simple_command(seed_text) {
            info!("Seed triaged as simple command");
            let project = Project {
                id: Uuid::new_v4(),
                owner_id,
                seed_text: seed_text.to_string(),
                embedding: None,
                status: SeedStatus::Yellow,
                ai_probability: TRIAGE_AI_PROBABILITY,
                plagiarism_score: 0.0,
                birth_hash: None,
                created_at: Utc::now(),
            };
            self.persist(&project).await?;

            return Ok(SeedVerificationResult {
                project_id: project.id,
                status: SeedStatus::Yellow,
                ai_probability: TRIAGE_AI_PROBABILITY,
                plagiarism_score: 0.0,
                internal_match: false,
                birth_hash: None,
                reasoning: "Low creative intent: simple command or too short to assess."
                    .to_string(),
            });
        }

        let embedding = self.orchestrator.embed_text(seed_text).await?;
        let internal_match = self.internal_match(owner_id, &embedding).await;

        let ai_probability = self.orchestrator.detect_ai(seed_text).await?;
        let plagiarism_score = self.plagiarism.plagiarism_score(seed_text).await?;

        let (status, reasoning) = decide_status(ai_probability, plagiarism_score, internal_match);

        let birth_hash = if status != SeedStatus::Plagiarized && !internal_match {
            Some(birth_hash(owner_id, seed_text, next_birth_nanos()))
        } else {
            None
        };

        let project = Project {
            id: Uuid::new_v4(),
            owner_id,
            seed_text: seed_text.to_string(),
            embedding: Some(embedding),
            status,
            ai_probability,
            plagiarism_score,
            birth_hash: birth_hash.clone(),
            created_at: Utc::now(),
        };
        self.persist(&project).await?;

        if let Some(ref embedding) = project.embedding {
            if let Err(e) = self.index.insert(owner_id, project.id, embedding).await {
                warn!(project_id = %project.id, error = %e, "Failed to index project embedding");
            }
        }

        info!(
            project_id = %project.id,
            status = %status,
            ai_probability,
            plagiarism_score,
            internal_match,
            "Seed classified"
        );

        Ok(SeedVerificationResult {
            project_id: project.id,
            status,
            ai_probability,
            plagiarism_score,
            internal_match,
            birth_hash,
            reasoning: reasoning.to_string(),
        })
    }

    /// Project by ID, cache first
    pub async fn project(&self, id: Uuid) -> Result<Option<Project>> {
        if let Some(project) = self.projects.get(&id) {
            return Ok(Some(project));
        }
        Ok(self.store.get_project(id).await?)
    }

    /// Cached projects (debug view)
    pub fn projects(&self) -> Vec<Project> {
        self.projects.values()
    }

    /// Nearest neighbour check. Index failures degrade to "no match".
    async fn internal_match(&self, owner_id: Uuid, embedding: &[f32]) -> bool {
        match self.index.search(owner_id, embedding, 1).await {
            Ok(matches) => match matches.first() {
                Some(nearest) => {
                    debug!(nearest = %nearest.id, similarity = nearest.similarity, "Nearest seed");
                    nearest.similarity > INTERNAL_MATCH_THRESHOLD
                }
                None => false,
            },
            Err(e) => {
                let err = ProofaError::IndexUnavailable(e.to_string());
                warn!(error = %err, "Similarity search failed, assuming no internal match");
                false
            }
        }
    }

    async fn persist(&self, project: &Project) -> Result<()> {
        self.store.create_project(project).await?;
        self.projects.insert(project.id, project.clone());
        Ok(())
    }
}
