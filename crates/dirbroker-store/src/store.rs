//! Credential store contract

use crate::map::CredentialMap;
use async_trait::async_trait;
use dirbroker_path::InstanceId;

/// Keyed store of credential mappings
///
/// Implementations must give read-after-write consistency for a key and
/// must never let a write to one key affect another. Concurrent saves to
/// the same key race with last-writer-wins.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Mapping stored for `key`
    ///
    /// Absence is an empty mapping, never an error.
    async fn get(&self, key: &InstanceId) -> Result<CredentialMap, StoreError>;

    /// Replace the whole mapping stored for `key`
    ///
    /// Not a partial update: fields missing from `credentials` are dropped.
    async fn save(&self, credentials: CredentialMap, key: &InstanceId) -> Result<(), StoreError>;

    /// Lay `patch` over the mapping stored for `key` and return the result
    ///
    /// The default is an unguarded read-modify-write built on
    /// [`get`](Self::get) and [`save`](Self::save). Backends with a native
    /// atomic update should override it.
    async fn merge(
        &self,
        key: &InstanceId,
        patch: CredentialMap,
    ) -> Result<CredentialMap, StoreError> {
        let merged = self.get(key).await?.overlaid(patch);
        self.save(merged.clone(), key).await?;
        Ok(merged)
    }
}

/// Errors raised by credential store backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    /// Stored bytes could not be (de)serialized
    #[error("credential serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Transport-level failures may succeed on retry
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
