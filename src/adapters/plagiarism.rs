//! External plagiarism signal.

use async_trait::async_trait;

use crate::error::Result;

/// Web/plagiarism score provider, scores in [0, 100]
#[async_trait]
pub trait PlagiarismCheck: Send + Sync {
    async fn plagiarism_score(&self, text: &str) -> Result<f64>;
}

/// Stand-in used until a real web search provider is wired in: flags the
/// well-known placeholder text and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhraseMatchPlagiarism;

pub const KNOWN_COPY_SCORE: f64 = 95.0;
pub const BASELINE_SCORE: f64 = 2.5;

impl PhraseMatchPlagiarism {
    pub fn new() -> Self {
        Self
    }

    pub fn score(text: &str) -> f64 {
        if text.to_lowercase().contains("lorem ipsum") {
            KNOWN_COPY_SCORE
        } else {
            BASELINE_SCORE
        }
    }
}

#[async_trait]
impl PlagiarismCheck for PhraseMatchPlagiarism {
    async fn plagiarism_score(&self, text: &str) -> Result<f64> {
        Ok(Self::score(text))
    }
}
