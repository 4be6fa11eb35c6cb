//! File-backed store using append-only JSONL.
//!
//! One file per record kind under the store directory. Every write appends
//! a line while holding an exclusive advisory lock, so concurrent writers in
//! different processes interleave whole lines. Reads replay the file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use super::{
    rank_by_similarity, DurableStore, SimilarityIndex, SimilarityMatch, StoreError, StoreResult,
};
use crate::domain::{AuthorshipCertificate, Collection, EvidenceRecord, Project, Seed, User};

const USERS: &str = "users.jsonl";
const SEEDS: &str = "seeds.jsonl";
const PROJECTS: &str = "projects.jsonl";
const EVIDENCE: &str = "evidence.jsonl";
const CERTIFICATES: &str = "certificates.jsonl";
const COLLECTIONS: &str = "collections.jsonl";
const INDEX: &str = "index.jsonl";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexLine {
    owner_id: Uuid,
    id: Uuid,
    embedding: Vec<f32>,
}

/// JSONL-backed durable store and brute-force similarity index
#[derive(Debug, Clone)]
pub struct JsonlStore {
    dir: PathBuf,
}

impl JsonlStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every archived evidence record, oldest first
    pub async fn all_evidence(&self) -> StoreResult<Vec<EvidenceRecord>> {
        self.replay(EVIDENCE).await
    }

    async fn append<T: Serialize>(&self, file_name: &str, record: &T) -> StoreResult<()> {
        let line = serde_json::to_string(record)?;
        let path = self.dir.join(file_name);

        tokio::task::spawn_blocking(move || -> StoreResult<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

            file.lock_exclusive()?;
            let written = writeln!(file, "{}", line).and_then(|_| file.flush());
            let unlocked = file.unlock();

            written?;
            unlocked?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("writer task failed: {}", e)))?
    }

    async fn replay<T: DeserializeOwned>(&self, file_name: &str) -> StoreResult<Vec<T>> {
        let path = self.dir.join(file_name);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut records = Vec::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }

        Ok(records)
    }

    async fn find<T, F>(&self, file_name: &str, predicate: F) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let records: Vec<T> = self.replay(file_name).await?;
        Ok(records.into_iter().find(predicate))
    }

    async fn append_new<T, F>(&self, file_name: &str, record: &T, id: Uuid, same: F) -> StoreResult<()>
    where
        T: Serialize + DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        if self.find(file_name, same).await?.is_some() {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        self.append(file_name, record).await
    }
}

#[async_trait]
impl DurableStore for JsonlStore {
    async fn create_user(&self, user: &User) -> StoreResult<()> {
        self.append_new(USERS, user, user.id, |u: &User| u.id == user.id)
            .await
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.find(USERS, |u: &User| u.id == id).await
    }

    async fn create_seed(&self, seed: &Seed) -> StoreResult<()> {
        self.append_new(SEEDS, seed, seed.id, |s: &Seed| s.id == seed.id)
            .await
    }

    async fn get_seed(&self, id: Uuid) -> StoreResult<Option<Seed>> {
        self.find(SEEDS, |s: &Seed| s.id == id).await
    }

    async fn create_project(&self, project: &Project) -> StoreResult<()> {
        self.append_new(PROJECTS, project, project.id, |p: &Project| {
            p.id == project.id
        })
        .await
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        self.find(PROJECTS, |p: &Project| p.id == id).await
    }

    async fn create_evidence(&self, record: &EvidenceRecord) -> StoreResult<()> {
        self.append_new(EVIDENCE, record, record.id, |e: &EvidenceRecord| {
            e.id == record.id
        })
        .await
    }

    async fn get_evidence(&self, id: Uuid) -> StoreResult<Option<EvidenceRecord>> {
        self.find(EVIDENCE, |e: &EvidenceRecord| e.id == id).await
    }

    async fn evidence_for_seed(&self, seed_id: Uuid) -> StoreResult<Vec<EvidenceRecord>> {
        let records: Vec<EvidenceRecord> = self.replay(EVIDENCE).await?;
        Ok(records
            .into_iter()
            .filter(|e| e.seed_id == Some(seed_id))
            .collect())
    }

    async fn create_certificate(&self, cert: &AuthorshipCertificate) -> StoreResult<()> {
        self.append_new(CERTIFICATES, cert, cert.id, |c: &AuthorshipCertificate| {
            c.id == cert.id
        })
        .await
    }

    async fn get_certificate(&self, id: Uuid) -> StoreResult<Option<AuthorshipCertificate>> {
        self.find(CERTIFICATES, |c: &AuthorshipCertificate| c.id == id)
            .await
    }

    async fn create_collection(&self, collection: &Collection) -> StoreResult<()> {
        self.append_new(COLLECTIONS, collection, collection.id, |c: &Collection| {
            c.id == collection.id
        })
        .await
    }
}

#[async_trait]
impl SimilarityIndex for JsonlStore {
    async fn search(
        &self,
        owner_id: Uuid,
        embedding: &[f32],
        k: usize,
    ) -> StoreResult<Vec<SimilarityMatch>> {
        let lines: Vec<IndexLine> = self.replay(INDEX).await?;
        let candidates = lines
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .map(|l| (l.id, l.embedding.as_slice()));
        Ok(rank_by_similarity(candidates, embedding, k))
    }

    async fn insert(&self, owner_id: Uuid, id: Uuid, embedding: &[f32]) -> StoreResult<()> {
        let line = IndexLine {
            owner_id,
            id,
            embedding: embedding.to_vec(),
        };
        self.append(INDEX, &line).await
    }
}
