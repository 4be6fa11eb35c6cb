//! Registered users and their signing identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::KeyPair;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,

    /// Identifier issued by the external identity provider
    pub external_uid: String,

    /// Generated once at registration. The private half is the only authority
    /// able to sign on this user's behalf.
    pub keys: KeyPair,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, external_uid: String, keys: KeyPair) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            external_uid,
            keys,
            created_at: Utc::now(),
        }
    }

    /// True if the stored record carries usable signing material
    pub fn has_key_material(&self) -> bool {
        !self.keys.private_key.is_empty() && !self.keys.public_key.is_empty()
    }
}
