//! Testing utilities for dirbroker workspace
//!
//! Shared fixtures, a call-counting store and a scripted binding provider.

#![allow(missing_docs)]

use async_trait::async_trait;
use dirbroker_core::{
    BindingError, GetUserDirectoryPlan, OrgBindingProvider, ProvisionParameters, ServiceInstance,
    URI_KEY,
};
use dirbroker_path::{InstanceId, OrgId};
use dirbroker_store::{CredentialMap, CredentialStore, InMemoryCredentialStore, StoreError};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Instance descriptor with fresh random ids
pub fn service_instance() -> ServiceInstance {
    service_instance_for(InstanceId::random(), OrgId::random())
}

pub fn service_instance_for(instance: InstanceId, org: OrgId) -> ServiceInstance {
    ServiceInstance::new(instance.to_string(), org.to_string())
        .with_plan_id(GetUserDirectoryPlan::NAME)
}

/// Broker user-space location of `instance`
pub fn userspace_uri(org: OrgId, instance: InstanceId) -> String {
    format!("hdfs://nameservice1/org/{org}/brokers/userspace/{instance}")
}

/// Parameters carrying only the reserved location
pub fn uri_params(uri: &str) -> ProvisionParameters {
    params(&[(URI_KEY, Value::from(uri))])
}

pub fn params(pairs: &[(&str, Value)]) -> ProvisionParameters {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

pub fn credentials(pairs: &[(&str, Value)]) -> CredentialMap {
    pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
}

/// In-memory store that counts calls and can be told to fail
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: InMemoryCredentialStore,
    gets: AtomicUsize,
    saves: AtomicUsize,
    merges: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn merges(&self) -> usize {
        self.merges.load(Ordering::SeqCst)
    }

    /// Writes performed through either `save` or `merge`
    pub fn writes(&self) -> usize {
        self.saves() + self.merges()
    }

    /// Make every later `save`/`merge` return `StoreError::Unavailable`
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every later `get` return `StoreError::Unavailable`
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Direct access bypassing the counters
    pub fn inner(&self) -> &InMemoryCredentialStore {
        &self.inner
    }

    fn check_readable(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(StoreError::unavailable("reads disabled"))
        } else {
            Ok(())
        }
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::unavailable("writes disabled"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CredentialStore for RecordingStore {
    async fn get(&self, key: &InstanceId) -> Result<CredentialMap, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check_readable()?;
        self.inner.get(key).await
    }

    async fn save(&self, credentials: CredentialMap, key: &InstanceId) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        self.inner.save(credentials, key).await
    }

    async fn merge(
        &self,
        key: &InstanceId,
        patch: CredentialMap,
    ) -> Result<CredentialMap, StoreError> {
        self.merges.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        self.inner.merge(key, patch).await
    }
}

/// Binding provider returning a fixed mapping, or a scripted failure
#[derive(Debug, Clone)]
pub struct FixedBindingProvider {
    base: CredentialMap,
    failing: bool,
}

impl FixedBindingProvider {
    pub fn new(base: CredentialMap) -> Self {
        Self {
            base,
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            base: CredentialMap::new(),
            failing: true,
        }
    }
}

#[async_trait]
impl OrgBindingProvider for FixedBindingProvider {
    async fn credentials_map(
        &self,
        _instance: InstanceId,
        _org: OrgId,
    ) -> Result<CredentialMap, BindingError> {
        if self.failing {
            Err(BindingError::Unavailable("provider offline".into()))
        } else {
            Ok(self.base.clone())
        }
    }
}

/// Plan over a recording store and a fixed provider
pub fn setup_plan(base: CredentialMap) -> (GetUserDirectoryPlan, Arc<RecordingStore>) {
    setup_plan_with(Arc::new(FixedBindingProvider::new(base)))
}

pub fn setup_plan_with(
    provider: Arc<dyn OrgBindingProvider>,
) -> (GetUserDirectoryPlan, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::new());
    let plan = GetUserDirectoryPlan::new(provider, store.clone());
    (plan, store)
}
