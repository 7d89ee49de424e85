//! Plan registry
//!
//! Provides [`PlanRegistry`] for looking up plans by catalog name and
//! dispatching provision/bind calls to them.

use crate::binding::OrgBindingProvider;
use crate::error::ServiceBrokerError;
use crate::plan::{GetUserDirectoryPlan, ServicePlanDefinition};
use crate::types::{ProvisionParameters, ServiceInstance};
use dirbroker_store::{CredentialMap, CredentialStore};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of plans keyed by catalog name
///
/// Built once at startup from explicitly constructed plans.
#[derive(Default, Clone)]
pub struct PlanRegistry {
    plans: BTreeMap<String, Arc<dyn ServicePlanDefinition>>,
}

impl PlanRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in plans wired to the given collaborators
    #[must_use]
    pub fn with_defaults(
        binding: Arc<dyn OrgBindingProvider>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GetUserDirectoryPlan::new(binding, store)));
        registry
    }

    /// Register a plan under its own name, returning any plan it replaces
    pub fn register(
        &mut self,
        plan: Arc<dyn ServicePlanDefinition>,
    ) -> Option<Arc<dyn ServicePlanDefinition>> {
        self.plans.insert(plan.name().to_string(), plan)
    }

    /// Look up a plan
    ///
    /// # Errors
    /// [`ServiceBrokerError::UnknownPlan`] if nothing is registered as `name`
    pub fn get(&self, name: &str) -> Result<Arc<dyn ServicePlanDefinition>, ServiceBrokerError> {
        self.plans
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceBrokerError::UnknownPlan(name.to_string()))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.plans.contains_key(name)
    }

    #[inline]
    pub fn remove(&mut self, name: &str) -> bool {
        self.plans.remove(name).is_some()
    }

    /// Registered plan names, sorted
    #[inline]
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.plans.keys().map(String::as_str).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Provision through the named plan
    ///
    /// # Errors
    /// `UnknownPlan`, or whatever the plan's provision returns
    pub async fn provision(
        &self,
        plan: &str,
        instance: &ServiceInstance,
        parameters: Option<&ProvisionParameters>,
    ) -> Result<(), ServiceBrokerError> {
        self.get(plan)?.provision(instance, parameters).await
    }

    /// Bind through the named plan
    ///
    /// # Errors
    /// `UnknownPlan`, or whatever the plan's bind returns
    pub async fn bind(
        &self,
        plan: &str,
        instance: &ServiceInstance,
    ) -> Result<CredentialMap, ServiceBrokerError> {
        self.get(plan)?.bind(instance).await
    }
}

impl std::fmt::Debug for PlanRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanRegistry")
            .field("plans", &self.names())
            .finish()
    }
}
