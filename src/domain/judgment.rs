//! Output of a single Judge invocation.

use serde::{Deserialize, Serialize};

/// One authorship judgment from the oracle.
///
/// Produced once per Judge call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentResult {
    /// Human-authorship score in [0, 1]
    pub score: f64,

    /// Free-text justification from the judge
    pub reasoning: String,

    /// Whether the prompt style suggests it was relayed from another AI
    #[serde(default)]
    pub is_ai_proxy: bool,

    /// How much new creative intent this prompt adds over its history
    #[serde(default)]
    pub creative_delta: f64,
}

impl JudgmentResult {
    /// Create a judgment, clamping the score into [0, 1]
    pub fn new(score: f64, reasoning: impl Into<String>) -> Self {
        Self {
            score: clamp_unit(score),
            reasoning: reasoning.into(),
            is_ai_proxy: false,
            creative_delta: 0.0,
        }
    }

    /// Attach process-analysis signals
    pub fn with_process(mut self, is_ai_proxy: bool, creative_delta: f64) -> Self {
        self.is_ai_proxy = is_ai_proxy;
        self.creative_delta = clamp_unit(creative_delta);
        self
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
