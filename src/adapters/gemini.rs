//! Remote judge backed by the Gemini Generative Language API.
//!
//! The compliance instructions travel as the system instruction; each call
//! asks for a JSON object and we pull the first `{` .. last `}` block out of
//! the reply, since models like to wrap JSON in markdown fences.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::Judge;
use crate::config::JudgeSettings;
use crate::domain::{JudgmentResult, EMBEDDING_DIM};
use crate::error::{OracleReason, ProofaError, Result};

pub struct GeminiJudge {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    embedding_model: String,
    api_key: String,
    legal_framework: String,
    instructions: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct RawJudgment {
    score: f64,
    reasoning: String,
    #[serde(default)]
    is_ai_proxy: bool,
    #[serde(default)]
    creative_delta: f64,
}

#[derive(Debug, Deserialize)]
struct RawProbability {
    probability: f64,
}

impl GeminiJudge {
    pub fn new(settings: &JudgeSettings, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            embedding_model: settings.embedding_model.clone(),
            api_key: api_key.to_string(),
            legal_framework: settings.legal_framework.clone(),
            instructions: settings.instructions.clone(),
        }
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProofaError::oracle(OracleReason::Unavailable, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProofaError::oracle(
                OracleReason::Provider,
                format!("Gemini error ({}): {}", status, text.trim()),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProofaError::oracle(OracleReason::Malformed, e.to_string()))
    }

    /// Run one generation and return the concatenated text parts
    async fn generate(&self, prompt: String) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = json!({
            "system_instruction": { "parts": [ { "text": self.instructions } ] },
            "contents": [ { "role": "user", "parts": [ { "text": prompt } ] } ],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let response: GenerateResponse = self.post_json(url, body).await?;
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            ProofaError::oracle(OracleReason::Malformed, "no candidates returned from Gemini")
        })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        debug!(model = %self.model, bytes = text.len(), "Gemini generation complete");
        Ok(text)
    }
}

/// Slice out the outermost JSON object from a model reply
pub(crate) fn extract_json_block(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

pub(crate) fn parse_judgment(text: &str) -> Result<JudgmentResult> {
    let block = extract_json_block(text);
    let raw: RawJudgment = serde_json::from_str(block).map_err(|e| {
        ProofaError::oracle(
            OracleReason::Malformed,
            format!("failed to parse judge result: {} (raw response: {})", e, block),
        )
    })?;

    if !(0.0..=1.0).contains(&raw.score) {
        return Err(ProofaError::oracle(
            OracleReason::Malformed,
            format!("score {} outside [0, 1]", raw.score),
        ));
    }

    Ok(JudgmentResult::new(raw.score, raw.reasoning)
        .with_process(raw.is_ai_proxy, raw.creative_delta))
}

pub(crate) fn parse_probability(text: &str) -> Result<f64> {
    let block = extract_json_block(text);
    let raw: RawProbability = serde_json::from_str(block).map_err(|e| {
        ProofaError::oracle(
            OracleReason::Malformed,
            format!("failed to parse AI probability: {} (raw response: {})", e, block),
        )
    })?;

    if !(0.0..=100.0).contains(&raw.probability) {
        return Err(ProofaError::oracle(
            OracleReason::Malformed,
            format!("probability {} outside [0, 100]", raw.probability),
        ));
    }
    Ok(raw.probability)
}

/// Pad or truncate to the shared embedding dimension
pub(crate) fn fit_dimension(mut values: Vec<f32>) -> Vec<f32> {
    values.resize(EMBEDDING_DIM, 0.0);
    values
}

#[async_trait]
impl Judge for GeminiJudge {
    fn name(&self) -> &str {
        "gemini-remote"
    }

    async fn verify_authorship(&self, prompt: &str, context: &str) -> Result<JudgmentResult> {
        let request = format!(
            "Analyze the following prompt and registry seeds for human authorship and \
             compliance with the {framework}.\n\n\
             Registry Context (Seeds):\n{context}\n\n\
             User Input (Prompt):\n{prompt}\n\n\
             Return your analysis as JSON: \
             {{\"score\": float between 0.0 and 1.0, \"reasoning\": string citing compliance metrics}}",
            framework = self.legal_framework,
            context = context,
            prompt = prompt,
        );
        parse_judgment(&self.generate(request).await?)
    }

    async fn analyze_process(
        &self,
        current_prompt: &str,
        history: &[String],
    ) -> Result<JudgmentResult> {
        let numbered: Vec<String> = history
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}", i + 1, p))
            .collect();
        let request = format!(
            "Evaluate the incremental human creative contribution of the current prompt \
             relative to the prior prompts in the same session.\n\n\
             Prior prompts:\n{history}\n\n\
             Current prompt:\n{current}\n\n\
             Return JSON: {{\"score\": float 0.0-1.0, \"reasoning\": string, \
             \"is_ai_proxy\": bool, \"creative_delta\": float 0.0-1.0}}",
            history = if numbered.is_empty() {
                "(none)".to_string()
            } else {
                numbered.join("\n")
            },
            current = current_prompt,
        );
        parse_judgment(&self.generate(request).await?)
    }

    async fn detect_ai(&self, text: &str) -> Result<f64> {
        let request = format!(
            "Estimate the probability that the following text was generated by an AI model.\n\n\
             Text:\n{}\n\n\
             Return JSON: {{\"probability\": float between 0 and 100}}",
            text
        );
        parse_probability(&self.generate(request).await?)
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!(
            "{}/models/{}:embedContent",
            self.endpoint, self.embedding_model
        );
        let body = json!({
            "model": format!("models/{}", self.embedding_model),
            "content": { "parts": [ { "text": text } ] },
            "outputDimensionality": EMBEDDING_DIM,
        });

        let response: EmbedResponse = self.post_json(url, body).await?;
        Ok(fit_dimension(response.embedding.values))
    }
}
