//! Request types shared by plans

use crate::error::ServiceBrokerError;
use dirbroker_path::{InstanceId, OrgId};
use serde::{Deserialize, Serialize};

/// Reserved credential field carrying the directory location
pub const URI_KEY: &str = "uri";

/// Provisioning parameters as received from the framework
pub type ProvisionParameters = serde_json::Map<String, serde_json::Value>;

/// Service instance descriptor supplied by the calling framework
///
/// Identities arrive as strings and are parsed on use, so a malformed id is
/// reported as an invalid request by the operation that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Instance UUID
    pub service_instance_id: String,
    /// Owning organization UUID
    pub organization_guid: String,
    /// Catalog service id, for logging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_definition_id: Option<String>,
    /// Catalog plan id, for logging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
}

impl ServiceInstance {
    #[inline]
    #[must_use]
    pub fn new(service_instance_id: impl Into<String>, organization_guid: impl Into<String>) -> Self {
        Self {
            service_instance_id: service_instance_id.into(),
            organization_guid: organization_guid.into(),
            service_definition_id: None,
            plan_id: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_plan_id(mut self, plan_id: impl Into<String>) -> Self {
        self.plan_id = Some(plan_id.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_service_definition_id(mut self, id: impl Into<String>) -> Self {
        self.service_definition_id = Some(id.into());
        self
    }

    /// Parsed instance identity
    ///
    /// # Errors
    /// `InvalidRequest` if the id is not a UUID
    pub fn instance_id(&self) -> Result<InstanceId, ServiceBrokerError> {
        Ok(self.service_instance_id.parse::<InstanceId>()?)
    }

    /// Parsed organization identity
    ///
    /// # Errors
    /// `InvalidRequest` if the guid is not a UUID
    pub fn org_id(&self) -> Result<OrgId, ServiceBrokerError> {
        Ok(self.organization_guid.parse::<OrgId>()?)
    }
}
