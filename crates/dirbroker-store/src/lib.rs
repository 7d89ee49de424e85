//! dirbroker Store
//!
//! Keyed credential storage for service instances.
//!
//! # Core Concepts
//!
//! - [`CredentialMap`]: flat field-name → value mapping for one instance
//! - [`CredentialStore`]: async get/save contract (save is a full overwrite)
//! - [`InMemoryCredentialStore`]: `DashMap`-backed process-local store
//!
//! # Example
//!
//! ```rust,ignore
//! use dirbroker_store::{CredentialStore, InMemoryCredentialStore};
//!
//! let store = InMemoryCredentialStore::new();
//! let mut creds = store.get(&key).await?;
//! creds.insert("uri", "hdfs://nn/data");
//! store.save(creds, &key).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod map;
mod memory;
mod store;

pub use map::CredentialMap;
pub use memory::InMemoryCredentialStore;
pub use store::{CredentialStore, StoreError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
