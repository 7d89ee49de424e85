//! In-memory credential store

use crate::map::CredentialMap;
use crate::store::{CredentialStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use dirbroker_path::InstanceId;

/// Process-local credential store
///
/// Keys live in independent `DashMap` shards, so writes to different keys
/// never contend on one lock. [`merge`](CredentialStore::merge) holds the
/// key's entry for the whole update and is atomic.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    entries: DashMap<InstanceId, CredentialMap>,
}

impl InMemoryCredentialStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys with a stored mapping
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: &InstanceId) -> bool {
        self.entries.contains_key(key)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, key: &InstanceId) -> Result<CredentialMap, StoreError> {
        Ok(self
            .entries
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn save(&self, credentials: CredentialMap, key: &InstanceId) -> Result<(), StoreError> {
        tracing::debug!(instance_id = %key, fields = credentials.len(), "saving credentials");
        self.entries.insert(*key, credentials);
        Ok(())
    }

    async fn merge(
        &self,
        key: &InstanceId,
        patch: CredentialMap,
    ) -> Result<CredentialMap, StoreError> {
        let mut entry = self.entries.entry(*key).or_default();
        entry.value_mut().overlay(patch);
        tracing::debug!(instance_id = %key, fields = entry.len(), "merged credentials");
        Ok(entry.value().clone())
    }
}
