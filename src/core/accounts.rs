//! User registration and signing identity resolution.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::crypto::{KeyPair, Signer};
use crate::domain::User;
use crate::error::Result;
use crate::store::{DurableStore, ShardedCache};

/// Key pair to sign with, and whether it was synthesized for this call only
#[derive(Debug, Clone)]
pub struct SigningIdentity {
    pub keys: KeyPair,
    pub ephemeral: bool,
}

pub struct AccountService {
    signer: Arc<dyn Signer>,
    store: Arc<dyn DurableStore>,
    users: ShardedCache<Uuid, User>,
}

impl AccountService {
    pub fn new(signer: Arc<dyn Signer>, store: Arc<dyn DurableStore>) -> Self {
        Self {
            signer,
            store,
            users: ShardedCache::new(),
        }
    }

    /// Create a user with a fresh key pair. Durable write failure is fatal
    /// since there is no cached copy to fall back on.
    #[instrument(skip(self, external_uid))]
    pub async fn register(&self, email: &str, external_uid: &str) -> Result<User> {
        let keys = self.signer.generate_key_pair()?;
        let user = User::new(email.to_string(), external_uid.to_string(), keys);

        self.store.create_user(&user).await?;
        self.users.insert(user.id, user.clone());

        info!(user_id = %user.id, algorithm = self.signer.algorithm(), "User registered");
        Ok(user)
    }

    /// Cache first, then the durable store
    pub async fn lookup(&self, user_id: Uuid) -> Result<Option<User>> {
        if let Some(user) = self.users.get(&user_id) {
            return Ok(Some(user));
        }

        let user = self.store.get_user(user_id).await?;
        if let Some(ref user) = user {
            self.users.insert(user.id, user.clone());
        }
        Ok(user)
    }

    /// The key pair to sign with for `user_id`.
    ///
    /// Users without stored key material (unknown, or a bare record) get a
    /// per-call ephemeral pair that is never written back to their account.
    /// `None` means no identity could be produced at all.
    pub async fn signing_identity(&self, user_id: Uuid) -> Option<SigningIdentity> {
        let stored = match self.lookup(user_id).await {
            Ok(user) => user,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "User lookup failed");
                None
            }
        };

        if let Some(user) = stored.filter(|u| u.has_key_material()) {
            return Some(SigningIdentity {
                keys: user.keys,
                ephemeral: false,
            });
        }

        warn!(user_id = %user_id, "key material absent, using ephemeral signing identity");
        match self.signer.generate_key_pair() {
            Ok(keys) => Some(SigningIdentity {
                keys,
                ephemeral: true,
            }),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Ephemeral key generation failed");
                None
            }
        }
    }

    /// Cached users (debug view)
    pub fn users(&self) -> Vec<User> {
        self.users.values()
    }

    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }
}
