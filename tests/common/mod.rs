//! Shared stubs for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use proofa::adapters::heuristic::embed;
use proofa::adapters::{Judge, PlagiarismCheck};
use proofa::core::{Backends, Services};
use proofa::crypto::{DilithiumSigner, KeyPair, Signer};
use proofa::domain::JudgmentResult;
use proofa::error::{OracleReason, ProofaError, Result};
use proofa::store::{
    DurableStore, MemoryStore, SimilarityIndex, SimilarityMatch, StoreError, StoreResult,
};

/// Judge with fixed outputs that records how it was called
pub struct ScriptedJudge {
    pub score: f64,
    pub ai_probability: f64,
    pub delay: Option<Duration>,
    /// Truncate embeddings to this length
    pub embedding_len: Option<usize>,
    pub fail_verify: bool,
    pub fail_detect: bool,
    pub embed_calls: AtomicUsize,
    pub detect_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub contexts: Mutex<Vec<String>>,
    pub histories: Mutex<Vec<Vec<String>>>,
}

impl Default for ScriptedJudge {
    fn default() -> Self {
        Self {
            score: 0.82,
            ai_probability: 10.0,
            delay: None,
            embedding_len: None,
            fail_verify: false,
            fail_detect: false,
            embed_calls: AtomicUsize::new(0),
            detect_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
            contexts: Mutex::new(Vec::new()),
            histories: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedJudge {
    pub fn with_ai(ai_probability: f64) -> Self {
        Self {
            ai_probability,
            ..Self::default()
        }
    }

    /// Reports `score` as-is, without clamping
    pub fn with_score(score: f64) -> Self {
        Self {
            score,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn embeds(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    pub fn detects(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }

    pub fn verifies(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    fn judgment(&self, reasoning: &str, creative_delta: f64) -> JudgmentResult {
        JudgmentResult {
            score: self.score,
            reasoning: reasoning.to_string(),
            is_ai_proxy: false,
            creative_delta,
        }
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Judge for ScriptedJudge {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn verify_authorship(&self, _prompt: &str, context: &str) -> Result<JudgmentResult> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().unwrap().push(context.to_string());
        self.pause().await;

        if self.fail_verify {
            return Err(ProofaError::oracle(OracleReason::Unavailable, "scripted outage"));
        }
        Ok(self.judgment("scripted verdict", 0.0))
    }

    async fn analyze_process(
        &self,
        _current_prompt: &str,
        history: &[String],
    ) -> Result<JudgmentResult> {
        self.histories.lock().unwrap().push(history.to_vec());
        self.pause().await;
        Ok(self.judgment("scripted process", 0.5))
    }

    async fn detect_ai(&self, _text: &str) -> Result<f64> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if self.fail_detect {
            return Err(ProofaError::oracle(OracleReason::Provider, "scripted refusal"));
        }
        Ok(self.ai_probability)
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        let mut embedding = embed(text);
        if let Some(len) = self.embedding_len {
            embedding.truncate(len);
        }
        Ok(embedding)
    }
}

/// Similarity index that is always down
pub struct FailingIndex;

#[async_trait]
impl SimilarityIndex for FailingIndex {
    async fn search(&self, _: Uuid, _: &[f32], _: usize) -> StoreResult<Vec<SimilarityMatch>> {
        Err(StoreError::Unavailable("index offline".into()))
    }

    async fn insert(&self, _: Uuid, _: Uuid, _: &[f32]) -> StoreResult<()> {
        Err(StoreError::Unavailable("index offline".into()))
    }
}

/// Generates real keys but refuses to sign
pub struct FailingSigner;

impl Signer for FailingSigner {
    fn algorithm(&self) -> &'static str {
        "failing"
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        DilithiumSigner.generate_key_pair()
    }

    fn sign(&self, _private_key: &[u8], _data: &[u8]) -> Result<Vec<u8>> {
        Err(ProofaError::Signing("hardware token unavailable".into()))
    }

    fn verify(&self, public_key: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
        DilithiumSigner.verify(public_key, data, signature)
    }
}

/// Plagiarism provider returning one fixed score
pub struct FixedPlagiarism(pub f64);

#[async_trait]
impl PlagiarismCheck for FixedPlagiarism {
    async fn plagiarism_score(&self, _text: &str) -> Result<f64> {
        Ok(self.0)
    }
}

/// In-memory services around `judge`, returning the store for inspection
pub fn services_with(judge: Arc<dyn Judge>) -> (Services, Arc<MemoryStore>) {
    let (backends, store) = Backends::in_memory(judge);
    (Services::with_backends(backends), store)
}

/// In-memory services with one collaborator swapped out
pub fn services_from(
    judge: Arc<dyn Judge>,
    configure: impl FnOnce(&mut Backends),
    deadline: Duration,
) -> (Services, Arc<MemoryStore>) {
    let (mut backends, store) = Backends::in_memory(judge);
    configure(&mut backends);
    (Services::new(backends, deadline), store)
}

pub async fn durable_evidence(store: &MemoryStore, id: Uuid) -> Option<proofa::EvidenceRecord> {
    store.get_evidence(id).await.unwrap()
}
