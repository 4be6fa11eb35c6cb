//! Deadline-bounded access to the active judge.
//!
//! Every oracle call in the pipeline goes through the [`Orchestrator`], which
//! is the only place an external call can be abandoned mid-flight. On expiry
//! the in-flight future is dropped, which cancels it, and the caller gets
//! `Oracle { reason: Timeout }`.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use crate::adapters::Judge;
use crate::config::DEFAULT_JUDGE_TIMEOUT_SECS;
use crate::domain::{JudgmentResult, EMBEDDING_DIM};
use crate::error::{OracleReason, ProofaError, Result};

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(DEFAULT_JUDGE_TIMEOUT_SECS);

/// Wraps exactly one judge with a hard wall-clock deadline
pub struct Orchestrator {
    provider: Arc<dyn Judge>,
    deadline: Duration,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn Judge>, deadline: Duration) -> Self {
        Self { provider, deadline }
    }

    /// Orchestrator with the default 60s deadline
    pub fn with_default_deadline(provider: Arc<dyn Judge>) -> Self {
        Self::new(provider, DEFAULT_DEADLINE)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Authorship verdict for a prompt against its seed context
    #[instrument(skip(self, prompt, context), fields(judge = %self.provider.name()))]
    pub async fn verify_authorship(&self, prompt: &str, context: &str) -> Result<JudgmentResult> {
        let judgment = self
            .bounded(
                "verify_authorship",
                self.provider.verify_authorship(prompt, context),
            )
            .await?;
        self.checked(judgment)
    }

    #[instrument(skip(self, current_prompt, history), fields(judge = %self.provider.name(), history = history.len()))]
    pub async fn analyze_process(
        &self,
        current_prompt: &str,
        history: &[String],
    ) -> Result<JudgmentResult> {
        let judgment = self
            .bounded(
                "analyze_process",
                self.provider.analyze_process(current_prompt, history),
            )
            .await?;
        self.checked(judgment)
    }

    pub async fn detect_ai(&self, text: &str) -> Result<f64> {
        let probability = self
            .bounded("detect_ai", self.provider.detect_ai(text))
            .await?;

        if !(0.0..=100.0).contains(&probability) {
            return Err(self.malformed(format!("AI probability {}", probability)));
        }
        Ok(probability)
    }

    pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self
            .bounded("embed_text", self.provider.embed_text(text))
            .await?;

        if embedding.len() != EMBEDDING_DIM {
            return Err(self.malformed(format!(
                "embedding of length {}, expected {}",
                embedding.len(),
                EMBEDDING_DIM
            )));
        }
        Ok(embedding)
    }

    /// Scores outside [0, 1] (NaN included) never reach the notary
    fn checked(&self, judgment: JudgmentResult) -> Result<JudgmentResult> {
        if !(0.0..=1.0).contains(&judgment.score) {
            return Err(self.malformed(format!("authorship score {}", judgment.score)));
        }
        if !(0.0..=1.0).contains(&judgment.creative_delta) {
            return Err(self.malformed(format!("creative delta {}", judgment.creative_delta)));
        }
        Ok(judgment)
    }

    fn malformed(&self, detail: String) -> ProofaError {
        warn!(judge = %self.provider.name(), %detail, "Judge returned out-of-range output");
        ProofaError::oracle(
            OracleReason::Malformed,
            format!("{} returned {}", self.provider.name(), detail),
        )
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let started = Instant::now();

        match tokio::time::timeout(self.deadline, call).await {
            Ok(result) => {
                debug!(
                    operation,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "Judge call finished"
                );
                result
            }
            Err(_) => {
                warn!(
                    operation,
                    judge = %self.provider.name(),
                    deadline_ms = self.deadline.as_millis() as u64,
                    "Judge call exceeded deadline, abandoning"
                );
                Err(ProofaError::oracle(
                    OracleReason::Timeout,
                    format!(
                        "{} on {} exceeded deadline of {:?}",
                        operation,
                        self.provider.name(),
                        self.deadline
                    ),
                ))
            }
        }
    }
}
