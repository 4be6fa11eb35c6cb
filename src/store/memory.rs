//! In-memory store implementing both storage traits.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    rank_by_similarity, DurableStore, SimilarityIndex, SimilarityMatch, StoreError, StoreResult,
};
use crate::domain::{AuthorshipCertificate, Collection, EvidenceRecord, Project, Seed, User};

#[derive(Debug, Clone)]
struct IndexEntry {
    owner_id: Uuid,
    id: Uuid,
    embedding: Vec<f32>,
}

/// Process-local backend. Evidence keeps insertion order so per-seed history
/// comes back oldest first.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    seeds: Mutex<HashMap<Uuid, Seed>>,
    projects: Mutex<HashMap<Uuid, Project>>,
    evidence: Mutex<Vec<EvidenceRecord>>,
    certificates: Mutex<HashMap<Uuid, AuthorshipCertificate>>,
    collections: Mutex<HashMap<Uuid, Collection>>,
    index: Mutex<Vec<IndexEntry>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn insert_new<T>(map: &mut HashMap<Uuid, T>, id: Uuid, value: T) -> StoreResult<()> {
    if map.contains_key(&id) {
        return Err(StoreError::AlreadyExists(id.to_string()));
    }
    map.insert(id, value);
    Ok(())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All evidence records in insertion order
    pub fn all_evidence(&self) -> Vec<EvidenceRecord> {
        lock(&self.evidence).clone()
    }

    pub fn seed_count(&self) -> usize {
        lock(&self.seeds).len()
    }

    pub fn project_count(&self) -> usize {
        lock(&self.projects).len()
    }

    pub fn collection(&self, id: Uuid) -> Option<Collection> {
        lock(&self.collections).get(&id).cloned()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn create_user(&self, user: &User) -> StoreResult<()> {
        insert_new(&mut lock(&self.users), user.id, user.clone())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(lock(&self.users).get(&id).cloned())
    }

    async fn create_seed(&self, seed: &Seed) -> StoreResult<()> {
        insert_new(&mut lock(&self.seeds), seed.id, seed.clone())
    }

    async fn get_seed(&self, id: Uuid) -> StoreResult<Option<Seed>> {
        Ok(lock(&self.seeds).get(&id).cloned())
    }

    async fn create_project(&self, project: &Project) -> StoreResult<()> {
        insert_new(&mut lock(&self.projects), project.id, project.clone())
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(lock(&self.projects).get(&id).cloned())
    }

    async fn create_evidence(&self, record: &EvidenceRecord) -> StoreResult<()> {
        let mut evidence = lock(&self.evidence);
        if evidence.iter().any(|e| e.id == record.id) {
            return Err(StoreError::AlreadyExists(record.id.to_string()));
        }
        evidence.push(record.clone());
        Ok(())
    }

    async fn get_evidence(&self, id: Uuid) -> StoreResult<Option<EvidenceRecord>> {
        Ok(lock(&self.evidence).iter().find(|e| e.id == id).cloned())
    }

    async fn evidence_for_seed(&self, seed_id: Uuid) -> StoreResult<Vec<EvidenceRecord>> {
        Ok(lock(&self.evidence)
            .iter()
            .filter(|e| e.seed_id == Some(seed_id))
            .cloned()
            .collect())
    }

    async fn create_certificate(&self, cert: &AuthorshipCertificate) -> StoreResult<()> {
        insert_new(&mut lock(&self.certificates), cert.id, cert.clone())
    }

    async fn get_certificate(&self, id: Uuid) -> StoreResult<Option<AuthorshipCertificate>> {
        Ok(lock(&self.certificates).get(&id).cloned())
    }

    async fn create_collection(&self, collection: &Collection) -> StoreResult<()> {
        insert_new(
            &mut lock(&self.collections),
            collection.id,
            collection.clone(),
        )
    }
}

#[async_trait]
impl SimilarityIndex for MemoryStore {
    async fn search(
        &self,
        owner_id: Uuid,
        embedding: &[f32],
        k: usize,
    ) -> StoreResult<Vec<SimilarityMatch>> {
        let index = lock(&self.index);
        let candidates = index
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .map(|e| (e.id, e.embedding.as_slice()));
        Ok(rank_by_similarity(candidates, embedding, k))
    }

    async fn insert(&self, owner_id: Uuid, id: Uuid, embedding: &[f32]) -> StoreResult<()> {
        lock(&self.index).push(IndexEntry {
            owner_id,
            id,
            embedding: embedding.to_vec(),
        });
        Ok(())
    }
}
