//! Storage boundaries: durable records, similarity search, shared caches.
//!
//! The engines only depend on the [`DurableStore`] and [`SimilarityIndex`]
//! traits. Two backends ship with the crate:
//! - [`MemoryStore`]: process-local maps, used by tests and demos
//! - [`JsonlStore`]: append-only JSONL files, state recovered by replay

pub mod cache;
pub mod jsonl;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{AuthorshipCertificate, Collection, EvidenceRecord, Project, Seed, User};

pub use cache::ShardedCache;
pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable create/read operations, keyed by opaque identifiers
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn create_user(&self, user: &User) -> StoreResult<()>;
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn create_seed(&self, seed: &Seed) -> StoreResult<()>;
    async fn get_seed(&self, id: Uuid) -> StoreResult<Option<Seed>>;

    async fn create_project(&self, project: &Project) -> StoreResult<()>;
    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    async fn create_evidence(&self, record: &EvidenceRecord) -> StoreResult<()>;
    async fn get_evidence(&self, id: Uuid) -> StoreResult<Option<EvidenceRecord>>;
    /// Evidence recorded against a seed, oldest first
    async fn evidence_for_seed(&self, seed_id: Uuid) -> StoreResult<Vec<EvidenceRecord>>;

    async fn create_certificate(&self, cert: &AuthorshipCertificate) -> StoreResult<()>;
    async fn get_certificate(&self, id: Uuid) -> StoreResult<Option<AuthorshipCertificate>>;

    async fn create_collection(&self, collection: &Collection) -> StoreResult<()>;
}

/// One nearest-neighbour hit
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    pub id: Uuid,
    /// Index-defined similarity; higher is closer
    pub similarity: f64,
}

/// Nearest-neighbour search over stored embeddings, scoped per owner
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Up to `k` matches among `owner_id`'s entries, closest first
    async fn search(
        &self,
        owner_id: Uuid,
        embedding: &[f32],
        k: usize,
    ) -> StoreResult<Vec<SimilarityMatch>>;

    async fn insert(&self, owner_id: Uuid, id: Uuid, embedding: &[f32]) -> StoreResult<()>;
}

/// Cosine similarity; zero when either vector has no magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Rank `(id, embedding)` candidates against a query, closest first
pub(crate) fn rank_by_similarity<'a, I>(
    candidates: I,
    query: &[f32],
    k: usize,
) -> Vec<SimilarityMatch>
where
    I: IntoIterator<Item = (Uuid, &'a [f32])>,
{
    let mut matches: Vec<SimilarityMatch> = candidates
        .into_iter()
        .map(|(id, embedding)| SimilarityMatch {
            id,
            similarity: cosine_similarity(query, embedding),
        })
        .collect();

    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    matches.truncate(k);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        let a = [1.0f32, 0.0, 0.0];
        let b = [0.0f32, 1.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&a, &b).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let zero = [0.0f32; 3];
        let a = [1.0f32, 2.0, 3.0];
        assert_eq!(cosine_similarity(&zero, &a), 0.0);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let near = Uuid::new_v4();
        let far = Uuid::new_v4();
        let mid = Uuid::new_v4();
        let e_near = [1.0f32, 0.1];
        let e_far = [-1.0f32, 0.0];
        let e_mid = [1.0f32, 1.0];

        let ranked = rank_by_similarity(
            vec![
                (far, &e_far[..]),
                (near, &e_near[..]),
                (mid, &e_mid[..]),
            ],
            &[1.0, 0.0],
            2,
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, near);
        assert_eq!(ranked[1].id, mid);
    }
}
