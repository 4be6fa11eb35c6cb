//! Offline judge built from lexical heuristics.
//!
//! Fully deterministic: the same input always gives the same scores and
//! embedding, which makes it the provider for tests, demos and air-gapped
//! deployments.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use super::Judge;
use crate::crypto::sha256_digest;
use crate::domain::{JudgmentResult, EMBEDDING_DIM};
use crate::error::Result;

/// Phrases that show up disproportionately in model-generated prose
const AI_MARKERS: &[&str] = &[
    "as an ai",
    "as a language model",
    "delve",
    "tapestry",
    "in conclusion",
    "it is important to note",
    "furthermore",
    "moreover",
    "in today's fast-paced",
    "navigate the complexities",
    "a testament to",
    "i hope this helps",
];

/// Phrases suggesting the prompt was relayed from another assistant
const PROXY_MARKERS: &[&str] = &[
    "chatgpt",
    "as an ai",
    "as a language model",
    "here is a prompt",
    "here's a prompt",
];

/// Deterministic local judge
#[derive(Debug, Clone, Default)]
pub struct HeuristicJudge {
    /// Simulated inference delay applied to authorship verification
    latency: Option<Duration>,
}

impl HeuristicJudge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artificial delay to `verify_authorship`
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
        }
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn lexical_diversity(tokens: &[String]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&String> = tokens.iter().collect();
    unique.len() as f64 / tokens.len() as f64
}

fn jaccard(a: &[String], b: &[String]) -> f64 {
    let a: HashSet<&String> = a.iter().collect();
    let b: HashSet<&String> = b.iter().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

fn marker_hits(text: &str, markers: &[&str]) -> usize {
    let lower = text.to_lowercase();
    markers.iter().filter(|m| lower.contains(*m)).count()
}

/// AI likelihood in [0, 100]
pub fn ai_likelihood(text: &str) -> f64 {
    let toks = tokens(text);
    let hits = marker_hits(text, AI_MARKERS) as f64;

    let mut score = 8.0 + 22.0 * hits;
    // Long but repetitive text reads as templated
    if toks.len() >= 20 && lexical_diversity(&toks) < 0.35 {
        score += 15.0;
    }
    score.min(99.0)
}

/// Hashed bag-of-words embedding, L2-normalised
pub fn embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBEDDING_DIM];

    for token in tokens(text) {
        let digest = sha256_digest(token.as_bytes());
        let mut bucket = [0u8; 8];
        bucket.copy_from_slice(&digest[..8]);
        let index = (u64::from_le_bytes(bucket) % EMBEDDING_DIM as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[index] += sign;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
    vector
}

#[async_trait]
impl Judge for HeuristicJudge {
    fn name(&self) -> &str {
        "heuristic-local"
    }

    async fn verify_authorship(&self, prompt: &str, context: &str) -> Result<JudgmentResult> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let prompt_tokens = tokens(prompt);
        let diversity = lexical_diversity(&prompt_tokens);
        let length = (prompt_tokens.len() as f64 / 40.0).min(1.0);
        let overlap = jaccard(&prompt_tokens, &tokens(context));
        let ai = ai_likelihood(prompt) / 100.0;

        let score = 0.30 + 0.35 * diversity + 0.20 * length + 0.15 * overlap - 0.40 * ai;
        let reasoning = format!(
            "Local heuristic analysis: lexical diversity {:.2}, length factor {:.2}, \
             seed context overlap {:.2}, AI marker likelihood {:.0}%.",
            diversity,
            length,
            overlap,
            ai * 100.0
        );

        Ok(JudgmentResult::new(score, reasoning))
    }

    async fn analyze_process(
        &self,
        current_prompt: &str,
        history: &[String],
    ) -> Result<JudgmentResult> {
        let current: HashSet<String> = tokens(current_prompt).into_iter().collect();
        let seen: HashSet<String> = history.iter().flat_map(|h| tokens(h)).collect();

        let delta = if current.is_empty() {
            0.0
        } else {
            current.difference(&seen).count() as f64 / current.len() as f64
        };

        let is_ai_proxy = marker_hits(current_prompt, PROXY_MARKERS) > 0
            || marker_hits(current_prompt, AI_MARKERS) >= 2;
        let diversity = lexical_diversity(&tokens(current_prompt));

        let mut score = 0.25 + 0.50 * delta + 0.25 * diversity;
        if is_ai_proxy {
            score -= 0.30;
        }

        let reasoning = format!(
            "Process analysis over {} prior prompt(s): creative delta {:.2}{}.",
            history.len(),
            delta,
            if is_ai_proxy {
                ", prompt style indicates an AI intermediary"
            } else {
                ""
            }
        );

        Ok(JudgmentResult::new(score, reasoning).with_process(is_ai_proxy, delta))
    }

    async fn detect_ai(&self, text: &str) -> Result<f64> {
        Ok(ai_likelihood(text))
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        Ok(embed(text))
    }
}
