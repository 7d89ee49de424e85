//! dirbroker Core
//!
//! Provisioning and binding plans for directory-backed service instances:
//! - Validates provisioning parameters and resolves the requested location
//! - Merges the location into the instance's stored credentials
//! - Assembles binding credentials from an organization-scoped provider
//!   overlaid by the stored credentials
//!
//! # Example
//!
//! ```rust,ignore
//! use dirbroker_core::prelude::*;
//!
//! let store = Arc::new(InMemoryCredentialStore::new());
//! let plan = GetUserDirectoryPlan::new(provider, store);
//!
//! let mut params = ProvisionParameters::new();
//! params.insert("uri".into(), "hdfs://nn/data/shared".into());
//! plan.provision(&instance, Some(&params)).await?;
//!
//! let credentials = plan.bind(&instance).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod binding;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod plan;
pub mod registry;
pub mod telemetry;
pub mod types;

// Re-exports for convenience
pub use binding::{OrgBindingProvider, StaticBindingProvider};
pub use config::{BindingConfig, BrokerConfig, LoggingConfig};
pub use error::{BackendError, BindingError, ConfigError, ServiceBrokerError};
pub use lifecycle::{InstanceState, LifecycleError, Operation};
pub use plan::{GetUserDirectoryPlan, ServicePlanDefinition};
pub use registry::PlanRegistry;
pub use types::{ProvisionParameters, ServiceInstance, URI_KEY};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring and calling plans
    pub use crate::{
        BrokerConfig, GetUserDirectoryPlan, OrgBindingProvider, PlanRegistry,
        ProvisionParameters, ServiceBrokerError, ServiceInstance, ServicePlanDefinition,
        StaticBindingProvider, URI_KEY,
    };
    pub use dirbroker_path::{InstanceId, InstancePath, OrgId};
    pub use dirbroker_store::{CredentialMap, CredentialStore, InMemoryCredentialStore};
    pub use std::sync::Arc;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
