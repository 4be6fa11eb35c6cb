//! Wiring: one shared set of engines over one store, judge and signer.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::accounts::AccountService;
use super::classify::SeedEngine;
use super::licensing::LicensingService;
use super::notary::ProofaEngine;
use super::orchestrator::{Orchestrator, DEFAULT_DEADLINE};
use super::process::ProcessEngine;
use super::registry::RegistryService;
use crate::adapters::{build_judge, Judge, PhraseMatchPlagiarism, PlagiarismCheck};
use crate::config::ResolvedConfig;
use crate::crypto::{DilithiumSigner, Signer};
use crate::error::Result;
use crate::store::{DurableStore, JsonlStore, MemoryStore, SimilarityIndex};

/// Collaborators the engines are built from
pub struct Backends {
    pub judge: Arc<dyn Judge>,
    pub signer: Arc<dyn Signer>,
    pub store: Arc<dyn DurableStore>,
    pub index: Arc<dyn SimilarityIndex>,
    pub plagiarism: Arc<dyn PlagiarismCheck>,
}

impl Backends {
    /// Offline backends over a single in-memory store
    pub fn in_memory(judge: Arc<dyn Judge>) -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let backends = Self {
            judge,
            signer: Arc::new(DilithiumSigner),
            store: store.clone(),
            index: store.clone(),
            plagiarism: Arc::new(PhraseMatchPlagiarism),
        };
        (backends, store)
    }
}

pub struct Services {
    pub orchestrator: Arc<Orchestrator>,
    pub accounts: Arc<AccountService>,
    pub registry: Arc<RegistryService>,
    pub seeds: Arc<SeedEngine>,
    pub notary: Arc<ProofaEngine>,
    pub process: Arc<ProcessEngine>,
    pub licensing: Arc<LicensingService>,
    pub signer: Arc<dyn Signer>,
}

impl Services {
    /// Engines over `backends`, with every judge call bounded by `deadline`
    pub fn new(backends: Backends, deadline: Duration) -> Self {
        let Backends {
            judge,
            signer,
            store,
            index,
            plagiarism,
        } = backends;
        let orchestrator = Arc::new(Orchestrator::new(judge, deadline));

        let accounts = Arc::new(AccountService::new(signer.clone(), store.clone()));
        let registry = Arc::new(RegistryService::new(
            orchestrator.clone(),
            store.clone(),
            index.clone(),
        ));
        let seeds = Arc::new(SeedEngine::new(
            orchestrator.clone(),
            store.clone(),
            index,
            plagiarism,
        ));
        let notary = Arc::new(ProofaEngine::new(
            orchestrator.clone(),
            accounts.clone(),
            registry.clone(),
            signer.clone(),
            store.clone(),
        ));
        let process = Arc::new(ProcessEngine::new(orchestrator.clone(), store.clone()));
        let licensing = Arc::new(LicensingService::new(
            accounts.clone(),
            signer.clone(),
            store,
        ));

        Self {
            orchestrator,
            accounts,
            registry,
            seeds,
            notary,
            process,
            licensing,
            signer,
        }
    }

    /// Services with the default orchestrator deadline
    pub fn with_backends(backends: Backends) -> Self {
        Self::new(backends, DEFAULT_DEADLINE)
    }

    /// Services over the file-backed store described by `config`
    pub async fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let judge = build_judge(&config.judge)?;
        let store = Arc::new(JsonlStore::open(config.store_dir()).await?);

        info!(
            judge = %judge.name(),
            store = %store.dir().display(),
            deadline_secs = config.judge.timeout.as_secs(),
            "Services initialised"
        );

        let backends = Backends {
            judge,
            signer: Arc::new(DilithiumSigner),
            store: store.clone(),
            index: store,
            plagiarism: Arc::new(PhraseMatchPlagiarism),
        };
        Ok(Self::new(backends, config.judge.timeout))
    }

    /// Wait for outstanding background writes
    pub async fn flush(&self) {
        self.notary.flush().await;
    }
}
