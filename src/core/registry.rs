//! Seed registry: append-only raw seeds that later prompts are judged against.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::orchestrator::Orchestrator;
use crate::domain::Seed;
use crate::error::Result;
use crate::store::{DurableStore, ShardedCache, SimilarityIndex};

pub struct RegistryService {
    orchestrator: Arc<Orchestrator>,
    store: Arc<dyn DurableStore>,
    index: Arc<dyn SimilarityIndex>,
    seeds: ShardedCache<Uuid, Seed>,
}

impl RegistryService {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        store: Arc<dyn DurableStore>,
        index: Arc<dyn SimilarityIndex>,
    ) -> Self {
        Self {
            orchestrator,
            store,
            index,
            seeds: ShardedCache::new(),
        }
    }

    /// Embed and register a seed.
    ///
    /// Embedding and durable write failures are fatal; indexing is
    /// best-effort.
    #[instrument(skip(self, content, metadata), fields(len = content.len()))]
    pub async fn upload_seed(
        &self,
        owner_id: Uuid,
        content: &str,
        metadata: Vec<u8>,
    ) -> Result<Seed> {
        let embedding = self.orchestrator.embed_text(content).await?;
        let seed = Seed::new(owner_id, content.to_string(), embedding, metadata);

        self.store.create_seed(&seed).await?;
        self.seeds.insert(seed.id, seed.clone());

        if let Err(e) = self.index.insert(owner_id, seed.id, &seed.embedding).await {
            warn!(seed_id = %seed.id, error = %e, "Failed to index seed embedding");
        }

        info!(seed_id = %seed.id, "Seed registered");
        Ok(seed)
    }

    /// Cache first, then the durable store
    pub async fn get_seed(&self, seed_id: Uuid) -> Result<Option<Seed>> {
        if let Some(seed) = self.seeds.get(&seed_id) {
            return Ok(Some(seed));
        }

        let seed = self.store.get_seed(seed_id).await?;
        if let Some(ref seed) = seed {
            self.seeds.insert(seed.id, seed.clone());
        }
        Ok(seed)
    }

    /// Context text for judging a prompt against `seed_id`.
    ///
    /// Empty when there is no seed, it is unknown, or the lookup fails.
    pub async fn seed_context(&self, seed_id: Option<Uuid>) -> String {
        let Some(seed_id) = seed_id else {
            return String::new();
        };

        match self.get_seed(seed_id).await {
            Ok(Some(seed)) => seed.raw_text,
            Ok(None) => String::new(),
            Err(e) => {
                warn!(seed_id = %seed_id, error = %e, "Seed lookup failed, judging without context");
                String::new()
            }
        }
    }

    /// Cached seeds (debug view)
    pub fn list_seeds(&self) -> Vec<Seed> {
        self.seeds.values()
    }
}
