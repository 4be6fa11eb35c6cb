//! Adapter interfaces for external judgment capabilities.
//!
//! A [`Judge`] scores authorship signals. The set of providers is closed and
//! chosen once at startup from configuration ([`JudgeKind`]); there is no
//! per-call failover between providers.

pub mod gemini;
pub mod heuristic;
pub mod plagiarism;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::JudgeSettings;
use crate::domain::JudgmentResult;
use crate::error::{ProofaError, Result};

// Re-export the providers
pub use gemini::GeminiJudge;
pub use heuristic::HeuristicJudge;
pub use plagiarism::{PhraseMatchPlagiarism, PlagiarismCheck};

/// Authorship oracle capability
#[async_trait]
pub trait Judge: Send + Sync {
    /// Identifying name recorded in audit trails
    fn name(&self) -> &str;

    /// Score a prompt for human authorship against registry context
    async fn verify_authorship(&self, prompt: &str, context: &str) -> Result<JudgmentResult>;

    /// Score the creative contribution of a prompt over its predecessors
    async fn analyze_process(
        &self,
        current_prompt: &str,
        history: &[String],
    ) -> Result<JudgmentResult>;

    /// AI-generation likelihood in [0, 100]
    async fn detect_ai(&self, text: &str) -> Result<f64>;

    /// Embedding of length [`crate::domain::EMBEDDING_DIM`]
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;
}

/// Configured judge provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeKind {
    /// Offline deterministic scoring
    Heuristic,
    /// Google Gemini over HTTPS
    Gemini,
}

impl fmt::Display for JudgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JudgeKind::Heuristic => f.write_str("heuristic"),
            JudgeKind::Gemini => f.write_str("gemini"),
        }
    }
}

impl FromStr for JudgeKind {
    type Err = ProofaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" | "local" | "mock" => Ok(JudgeKind::Heuristic),
            "gemini" => Ok(JudgeKind::Gemini),
            other => Err(ProofaError::Config(format!(
                "unknown judge provider '{}'",
                other
            ))),
        }
    }
}

/// Build the single active judge from settings
pub fn build_judge(settings: &JudgeSettings) -> Result<Arc<dyn Judge>> {
    match settings.kind {
        JudgeKind::Heuristic => Ok(Arc::new(HeuristicJudge::new())),
        JudgeKind::Gemini => match settings.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(Arc::new(GeminiJudge::new(settings, key))),
            _ => {
                warn!("Gemini judge selected but no API key is set; using heuristic judge");
                Ok(Arc::new(HeuristicJudge::new()))
            }
        },
    }
}
