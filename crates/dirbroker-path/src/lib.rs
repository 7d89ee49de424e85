//! dirbroker Path
//!
//! Identities and location resolution for directory-backed service instances.
//!
//! # Core Concepts
//!
//! - [`InstanceId`] / [`OrgId`]: UUID identities supplied by the framework
//! - [`InstancePath`]: canonical identity of a directory location
//! - [`LocationDigest`]: 32-byte blake3 digest of a canonical location
//!
//! # Example
//!
//! ```rust,ignore
//! use dirbroker_path::resolve;
//!
//! let path = resolve("hdfs://nn/org/<org>/brokers/userspace/<instance>")?;
//! println!("store key: {}", path.instance_key());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod digest;
mod id;
mod path;

pub use digest::{DigestError, LocationDigest};
pub use id::{IdError, InstanceId, OrgId};
pub use path::{resolve, InstancePath, KeySource, LocationError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
