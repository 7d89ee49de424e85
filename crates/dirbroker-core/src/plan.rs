//! Service plans
//!
//! A plan owns the provisioning and binding semantics of one catalog entry.
//! [`GetUserDirectoryPlan`] attaches an instance to an existing directory
//! location and hands the stored location back on bind.

use crate::binding::OrgBindingProvider;
use crate::error::ServiceBrokerError;
use crate::lifecycle::{self, InstanceState, Operation};
use crate::types::{ProvisionParameters, ServiceInstance, URI_KEY};
use async_trait::async_trait;
use dirbroker_path::{InstanceId, InstancePath};
use dirbroker_store::{CredentialMap, CredentialStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

const MISSING_PARAMETERS: &str = "missing required parameter set";
const MISSING_LOCATION: &str = "missing required location parameter";

/// Provisioning and binding contract of a catalog plan
#[async_trait]
pub trait ServicePlanDefinition: Send + Sync {
    /// Catalog name the plan is registered under
    fn name(&self) -> &str;

    /// Provision `instance` from the request parameters
    async fn provision(
        &self,
        instance: &ServiceInstance,
        parameters: Option<&ProvisionParameters>,
    ) -> Result<(), ServiceBrokerError>;

    /// Assemble credentials for a consumer binding to `instance`
    async fn bind(&self, instance: &ServiceInstance) -> Result<CredentialMap, ServiceBrokerError>;
}

/// Store keys involved in one provision call
///
/// The resolved location's key and the calling instance's key can differ
/// when several instances share one physical directory. Credentials are
/// read from the former and written under the latter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ProvisionTarget {
    source_key: InstanceId,
    owner_key: InstanceId,
}

impl ProvisionTarget {
    #[inline]
    fn is_self_owned(&self) -> bool {
        self.source_key == self.owner_key
    }
}

/// Plan attaching an instance to a caller-named directory
pub struct GetUserDirectoryPlan {
    binding: Arc<dyn OrgBindingProvider>,
    store: Arc<dyn CredentialStore>,
}

impl GetUserDirectoryPlan {
    /// Catalog name
    pub const NAME: &'static str = "get-user-directory";

    #[inline]
    #[must_use]
    pub fn new(binding: Arc<dyn OrgBindingProvider>, store: Arc<dyn CredentialStore>) -> Self {
        Self { binding, store }
    }

    /// Lifecycle state of `instance` as seen by the store
    ///
    /// # Errors
    /// `InvalidRequest` for a malformed id, `Backend` if the store fails
    pub async fn state(&self, instance: &ServiceInstance) -> Result<InstanceState, ServiceBrokerError> {
        let key = instance.instance_id()?;
        let stored = self
            .store
            .get(&key)
            .await
            .map_err(|e| ServiceBrokerError::backend("state", e))?;
        Ok(InstanceState::of(&stored))
    }
}

impl std::fmt::Debug for GetUserDirectoryPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GetUserDirectoryPlan").finish_non_exhaustive()
    }
}

/// The reserved location value from non-empty parameters
fn location_parameter(parameters: &ProvisionParameters) -> Result<&str, ServiceBrokerError> {
    match parameters.get(URI_KEY) {
        None | Some(serde_json::Value::Null) => {
            Err(ServiceBrokerError::invalid_request(MISSING_LOCATION))
        }
        Some(serde_json::Value::String(uri)) => Ok(uri.as_str()),
        Some(other) => Err(ServiceBrokerError::invalid_request(format!(
            "location parameter must be a string, got {other}"
        ))),
    }
}

#[async_trait]
impl ServicePlanDefinition for GetUserDirectoryPlan {
    fn name(&self) -> &str {
        Self::NAME
    }

    #[tracing::instrument(
        skip_all,
        fields(plan = GetUserDirectoryPlan::NAME, instance_id = %instance.service_instance_id)
    )]
    async fn provision(
        &self,
        instance: &ServiceInstance,
        parameters: Option<&ProvisionParameters>,
    ) -> Result<(), ServiceBrokerError> {
        let parameters = parameters
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ServiceBrokerError::invalid_request(MISSING_PARAMETERS))?;
        let uri = location_parameter(parameters)?;
        info!(uri = %uri, "Detected parameter path");

        let path = InstancePath::resolve(uri)?;
        let target = ProvisionTarget {
            source_key: path.instance_key(),
            owner_key: instance.instance_id()?,
        };
        debug!(
            source_key = %target.source_key,
            key_source = %path.key_source(),
            "Resolved location"
        );

        let mut patch = CredentialMap::new();
        patch.insert(URI_KEY, uri);

        if target.is_self_owned() {
            self.store
                .merge(&target.owner_key, patch)
                .await
                .map_err(|e| ServiceBrokerError::backend("provision", e))?;
        } else {
            let existing = self
                .store
                .get(&target.source_key)
                .await
                .map_err(|e| ServiceBrokerError::backend("provision", e))?;
            debug!(
                fields = existing.len(),
                "Carrying credentials of shared location over to instance"
            );
            self.store
                .save(existing.overlaid(patch), &target.owner_key)
                .await
                .map_err(|e| ServiceBrokerError::backend("provision", e))?;
        }

        info!(owner_key = %target.owner_key, "Provisioned instance");
        Ok(())
    }

    #[tracing::instrument(
        skip_all,
        fields(
            plan = GetUserDirectoryPlan::NAME,
            instance_id = %instance.service_instance_id,
            org_id = %instance.organization_guid
        )
    )]
    async fn bind(&self, instance: &ServiceInstance) -> Result<CredentialMap, ServiceBrokerError> {
        let instance_id = instance.instance_id()?;
        let org_id = instance.org_id()?;

        let mut configuration = self
            .binding
            .credentials_map(instance_id, org_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Binding provider failed");
                ServiceBrokerError::backend("bind", e)
            })?;
        let stored = self.store.get(&instance_id).await.map_err(|e| {
            tracing::error!(error = %e, "Credential store read failed");
            ServiceBrokerError::backend("bind", e)
        })?;

        if let Err(e) = lifecycle::next_state(InstanceState::of(&stored), Operation::Bind) {
            warn!(error = %e, "Binding an instance with no stored location");
        }

        if stored.contains_key(URI_KEY) {
            configuration.remove(URI_KEY);
        }
        Ok(configuration.overlaid(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindingError;
    use dirbroker_path::OrgId;
    use dirbroker_store::InMemoryCredentialStore;
    use serde_json::json;

    struct FixedProvider(CredentialMap);

    #[async_trait]
    impl OrgBindingProvider for FixedProvider {
        async fn credentials_map(
            &self,
            _instance: InstanceId,
            _org: OrgId,
        ) -> Result<CredentialMap, BindingError> {
            Ok(self.0.clone())
        }
    }

    fn plan_with(base: CredentialMap) -> (GetUserDirectoryPlan, Arc<InMemoryCredentialStore>) {
        let store = Arc::new(InMemoryCredentialStore::new());
        let plan = GetUserDirectoryPlan::new(Arc::new(FixedProvider(base)), store.clone());
        (plan, store)
    }

    fn instance() -> ServiceInstance {
        ServiceInstance::new(InstanceId::random().to_string(), OrgId::random().to_string())
    }

    fn params(uri: serde_json::Value) -> ProvisionParameters {
        let mut p = ProvisionParameters::new();
        p.insert(URI_KEY.to_string(), uri);
        p
    }

    #[tokio::test]
    async fn non_string_location_is_rejected() {
        let (plan, store) = plan_with(CredentialMap::new());
        let err = plan
            .provision(&instance(), Some(&params(json!(42))))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be a string"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn null_location_counts_as_missing() {
        let (plan, _) = plan_with(CredentialMap::new());
        let err = plan
            .provision(&instance(), Some(&params(json!(null))))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("invalid request: {MISSING_LOCATION}"));
    }

    #[tokio::test]
    async fn malformed_instance_id_stores_nothing() {
        let (plan, store) = plan_with(CredentialMap::new());
        let bad = ServiceInstance::new("nope", OrgId::random().to_string());
        let err = plan
            .provision(&bad, Some(&params(json!("hdfs://nn/data"))))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn state_moves_to_provisioned() {
        let (plan, _) = plan_with(CredentialMap::new());
        let inst = instance();
        assert_eq!(plan.state(&inst).await.unwrap(), InstanceState::Unprovisioned);

        plan.provision(&inst, Some(&params(json!("hdfs://nn/data"))))
            .await
            .unwrap();
        assert_eq!(plan.state(&inst).await.unwrap(), InstanceState::Provisioned);
    }

    #[tokio::test]
    async fn self_owned_location_merges_in_place() {
        let (plan, store) = plan_with(CredentialMap::new());
        let org = OrgId::random();
        let id = InstanceId::random();
        let inst = ServiceInstance::new(id.to_string(), org.to_string());
        store
            .save([("password", json!("pw"))].into_iter().collect(), &id)
            .await
            .unwrap();

        let uri = format!("hdfs://nn/org/{org}/brokers/userspace/{id}");
        plan.provision(&inst, Some(&params(json!(uri.clone()))))
            .await
            .unwrap();

        let stored = store.get(&id).await.unwrap();
        assert_eq!(stored.get("password"), Some(&json!("pw")));
        assert_eq!(stored.get(URI_KEY), Some(&json!(uri)));
        assert_eq!(store.len(), 1);
    }
}
