//! Organization-scoped binding providers
//!
//! A provider produces the base configuration mapping for an
//! `(instance, organization)` pair. Plans lay stored credentials over it.

use crate::config::BindingConfig;
use crate::error::BindingError;
use crate::types::URI_KEY;
use async_trait::async_trait;
use dirbroker_path::{InstanceId, InstancePath, OrgId};
use dirbroker_store::CredentialMap;

/// Source of per-organization base configuration
#[async_trait]
pub trait OrgBindingProvider: Send + Sync {
    /// Base configuration for `instance` owned by `org`
    async fn credentials_map(
        &self,
        instance: InstanceId,
        org: OrgId,
    ) -> Result<CredentialMap, BindingError>;
}

/// Provider returning fixed fields plus the instance's user-space location
///
/// Stands in for a real organization-aware provider in the operator binary
/// and in tests.
#[derive(Debug, Clone)]
pub struct StaticBindingProvider {
    base: InstancePath,
    fields: CredentialMap,
}

impl StaticBindingProvider {
    #[inline]
    #[must_use]
    pub fn new(base: InstancePath, fields: CredentialMap) -> Self {
        Self { base, fields }
    }

    /// Build from the `[binding]` config section
    ///
    /// # Errors
    /// `InvalidConfiguration` if `base_uri` does not resolve
    pub fn from_config(config: &BindingConfig) -> Result<Self, BindingError> {
        let base = InstancePath::resolve(&config.base_uri)
            .map_err(|e| BindingError::InvalidConfiguration(e.to_string()))?;
        Ok(Self::new(base, config.fields.clone()))
    }

    /// Location under which instance directories are laid out
    #[inline]
    #[must_use]
    pub fn base(&self) -> &InstancePath {
        &self.base
    }
}

#[async_trait]
impl OrgBindingProvider for StaticBindingProvider {
    async fn credentials_map(
        &self,
        instance: InstanceId,
        org: OrgId,
    ) -> Result<CredentialMap, BindingError> {
        let mut map = self.fields.clone();
        let location = InstancePath::for_instance(&self.base, org, instance);
        map.insert(URI_KEY, location.canonical());
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn static_provider_adds_userspace_uri() {
        let base = InstancePath::resolve("hdfs://nn/cf/broker").unwrap();
        let fields: CredentialMap = [("user", json!("hdfs"))].into_iter().collect();
        let provider = StaticBindingProvider::new(base, fields);

        let instance = InstanceId::random();
        let org = OrgId::random();
        let map = provider.credentials_map(instance, org).await.unwrap();

        assert_eq!(map.get("user"), Some(&json!("hdfs")));
        let uri = map.get(URI_KEY).and_then(|v| v.as_str()).unwrap();
        let resolved = InstancePath::resolve(uri).unwrap();
        assert_eq!(resolved.instance_key(), instance);
        assert_eq!(resolved.org_id(), Some(org));
    }

    #[test]
    fn from_config_rejects_bad_base() {
        let config = BindingConfig {
            base_uri: "not a uri".to_string(),
            fields: CredentialMap::new(),
        };
        assert!(matches!(
            StaticBindingProvider::from_config(&config),
            Err(BindingError::InvalidConfiguration(_))
        ));
    }
}
