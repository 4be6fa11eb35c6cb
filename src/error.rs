//! Error taxonomy for the verification and notarization pipeline.
//!
//! Fatal errors (`Oracle`, `Persistence` without a cache fallback) abort the
//! call with no partial record. `IndexUnavailable` and `Signing` are soft:
//! callers downgrade them (no internal match, pending signature) and carry on.

use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

/// Why an oracle call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleReason {
    /// The orchestrator deadline elapsed and the call was abandoned
    Timeout,
    /// The provider could not be reached
    Unavailable,
    /// The provider answered with output we could not interpret
    Malformed,
    /// The provider reported an error of its own
    Provider,
}

impl fmt::Display for OracleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OracleReason::Timeout => "timeout",
            OracleReason::Unavailable => "unavailable",
            OracleReason::Malformed => "malformed",
            OracleReason::Provider => "provider",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ProofaError {
    #[error("Oracle error ({reason}): {message}")]
    Oracle {
        reason: OracleReason,
        message: String,
    },

    #[error("Similarity index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProofaError {
    pub fn oracle(reason: OracleReason, message: impl Into<String>) -> Self {
        ProofaError::Oracle {
            reason,
            message: message.into(),
        }
    }

    /// True if this is an oracle deadline expiry
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ProofaError::Oracle {
                reason: OracleReason::Timeout,
                ..
            }
        )
    }

    pub fn is_oracle(&self) -> bool {
        matches!(self, ProofaError::Oracle { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProofaError>;
