//! Incremental process scoring over a seed's prompt history.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::orchestrator::Orchestrator;
use crate::domain::ScoreUpdate;
use crate::error::Result;
use crate::store::DurableStore;

pub struct ProcessEngine {
    orchestrator: Arc<Orchestrator>,
    store: Arc<dyn DurableStore>,
}

impl ProcessEngine {
    pub fn new(orchestrator: Arc<Orchestrator>, store: Arc<dyn DurableStore>) -> Self {
        Self {
            orchestrator,
            store,
        }
    }

    /// Judge `current_prompt` against the prompts already notarized for
    /// `seed_id`, oldest first.
    #[instrument(skip(self, current_prompt))]
    pub async fn update_score(
        &self,
        user_id: Uuid,
        seed_id: Uuid,
        current_prompt: &str,
    ) -> Result<ScoreUpdate> {
        let history: Vec<String> = self
            .store
            .evidence_for_seed(seed_id)
            .await?
            .into_iter()
            .map(|record| record.prompt)
            .collect();

        let judgment = self
            .orchestrator
            .analyze_process(current_prompt, &history)
            .await?;

        info!(
            prior_prompts = history.len(),
            score = judgment.score,
            is_ai_proxy = judgment.is_ai_proxy,
            "Process score updated"
        );

        Ok(ScoreUpdate {
            human_score: judgment.score,
            reasoning: judgment.reasoning,
            is_ai_proxy: judgment.is_ai_proxy,
            creative_delta: judgment.creative_delta,
        })
    }
}
