//! Instance and organization identities
//!
//! Both identities are UUIDs handed to the broker as strings by the calling
//! framework. They are immutable for the lifetime of the instance.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Identity of a provisioned service instance
///
/// Used as the credential store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    /// Wrap an existing UUID
    #[inline]
    #[must_use]
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random instance id
    #[inline]
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstanceId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_uuid("instance", s).map(Self)
    }
}

impl From<Uuid> for InstanceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Identity of the organization (tenant) owning an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(pub Uuid);

impl OrgId {
    /// Wrap an existing UUID
    #[inline]
    #[must_use]
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random organization id
    #[inline]
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for OrgId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrgId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_uuid("organization", s).map(Self)
    }
}

impl From<Uuid> for OrgId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

fn parse_uuid(kind: &'static str, s: &str) -> Result<Uuid, IdError> {
    Uuid::parse_str(s.trim()).map_err(|source| IdError {
        kind,
        value: s.to_string(),
        source,
    })
}

/// Identity string is not a UUID
#[derive(Debug, thiserror::Error)]
#[error("invalid {kind} id '{value}': {source}")]
pub struct IdError {
    /// Which identity failed to parse
    pub kind: &'static str,
    /// Offending input
    pub value: String,
    #[source]
    source: uuid::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "6f1c2f3e-8d4b-4b6a-9c1e-2a7d5e9f0b13";

    #[test]
    fn instance_id_parses_hyphenated() {
        let id: InstanceId = SAMPLE.parse().unwrap();
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn instance_id_parses_simple_form() {
        let id: InstanceId = "6f1c2f3e8d4b4b6a9c1e2a7d5e9f0b13".parse().unwrap();
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn instance_id_rejects_garbage() {
        let err = "not-a-uuid".parse::<InstanceId>().unwrap_err();
        assert_eq!(err.kind, "instance");
        assert!(err.to_string().contains("not-a-uuid"));
    }

    #[test]
    fn org_id_reports_kind() {
        let err = "".parse::<OrgId>().unwrap_err();
        assert_eq!(err.kind, "organization");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id: InstanceId = SAMPLE.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));
    }
}
