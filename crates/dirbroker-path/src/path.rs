//! Directory location resolution
//!
//! Provides [`InstancePath`], the canonical identity of a caller-supplied
//! directory location, and the instance key derived from it.

use crate::digest::LocationDigest;
use crate::id::{InstanceId, OrgId};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use url::Url;

/// Segment labels of the broker user-space layout
/// `.../org/<org>/brokers/userspace/<instance>`
const ORG_LABEL: &str = "org";
const BROKERS_LABEL: &str = "brokers";
const USERSPACE_LABEL: &str = "userspace";

/// How the instance key of a path was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Taken from the trailing segment of the user-space layout
    Embedded,
    /// Derived from the digest of the canonical location
    Derived(LocationDigest),
}

impl Display for KeySource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded => f.write_str("embedded"),
            Self::Derived(digest) => write!(f, "derived:{}", digest.short()),
        }
    }
}

/// Canonical identity of a directory location
///
/// Resolution is a pure function of the input string: two locations with
/// the same canonical form always carry the same instance key.
///
/// # Examples
/// - `hdfs://nn/org/<org>/brokers/userspace/<id>` → key `<id>`, org `<org>`
/// - `hdfs://NN:8020//data/shared/` → canonical `hdfs://nn:8020/data/shared`,
///   key derived from the digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePath {
    scheme: String,
    authority: String,
    segments: Vec<String>,
    instance_key: InstanceId,
    org_id: Option<OrgId>,
    key_source: KeySource,
}

impl InstancePath {
    /// Resolve a location string
    ///
    /// # Errors
    /// Returns [`LocationError`] if the location is empty, not an absolute
    /// URI with an authority and a non-root path, carries a query, fragment
    /// or password, or claims the user-space layout with non-UUID ids.
    pub fn resolve(location: &str) -> Result<Self, LocationError> {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return Err(LocationError::Empty);
        }

        let url = Url::parse(trimmed).map_err(|source| LocationError::Unparseable {
            location: trimmed.to_string(),
            source,
        })?;

        if url.password().is_some() {
            return Err(LocationError::EmbeddedPassword);
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(LocationError::QueryOrFragment(trimmed.to_string()));
        }

        let host = match url.host_str() {
            Some(h) if !h.is_empty() => h.to_ascii_lowercase(),
            _ => return Err(LocationError::MissingAuthority(trimmed.to_string())),
        };

        let mut authority = String::new();
        if !url.username().is_empty() {
            authority.push_str(url.username());
            authority.push('@');
        }
        authority.push_str(&host);
        if let Some(port) = url.port() {
            authority.push(':');
            authority.push_str(&port.to_string());
        }

        let segments: Vec<String> = url
            .path_segments()
            .map(|segs| {
                segs.filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if segments.is_empty() {
            return Err(LocationError::RootPath(trimmed.to_string()));
        }

        Self::from_parts(url.scheme().to_ascii_lowercase(), authority, segments)
    }

    /// Build the user-space location of an instance under a base location
    #[must_use]
    pub fn for_instance(base: &Self, org: OrgId, instance: InstanceId) -> Self {
        let mut segments = base.segments.clone();
        segments.extend([
            ORG_LABEL.to_string(),
            org.to_string(),
            BROKERS_LABEL.to_string(),
            USERSPACE_LABEL.to_string(),
            instance.to_string(),
        ]);
        Self {
            scheme: base.scheme.clone(),
            authority: base.authority.clone(),
            segments,
            instance_key: instance,
            org_id: Some(org),
            key_source: KeySource::Embedded,
        }
    }

    fn from_parts(
        scheme: String,
        authority: String,
        segments: Vec<String>,
    ) -> Result<Self, LocationError> {
        if let Some((org_id, instance_key)) = userspace_ids(&segments)? {
            return Ok(Self {
                scheme,
                authority,
                segments,
                instance_key,
                org_id: Some(org_id),
                key_source: KeySource::Embedded,
            });
        }

        let canonical = canonical_form(&scheme, &authority, &segments);
        let digest = LocationDigest::of_canonical(&canonical);
        Ok(Self {
            scheme,
            authority,
            segments,
            instance_key: digest.instance_key(),
            org_id: None,
            key_source: KeySource::Derived(digest),
        })
    }

    /// Credential store key for this location
    #[inline]
    #[must_use]
    pub fn instance_key(&self) -> InstanceId {
        self.instance_key
    }

    /// Owning organization, when the location follows the user-space layout
    #[inline]
    #[must_use]
    pub fn org_id(&self) -> Option<OrgId> {
        self.org_id
    }

    #[inline]
    #[must_use]
    pub fn key_source(&self) -> KeySource {
        self.key_source
    }

    /// Lower-cased URI scheme
    #[inline]
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// `[user@]host[:port]`
    #[inline]
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Non-empty path segments, root to leaf
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether the key came from the user-space layout
    #[inline]
    #[must_use]
    pub fn is_userspace(&self) -> bool {
        matches!(self.key_source, KeySource::Embedded)
    }

    /// Canonical location string
    #[must_use]
    pub fn canonical(&self) -> String {
        canonical_form(&self.scheme, &self.authority, &self.segments)
    }
}

fn canonical_form(scheme: &str, authority: &str, segments: &[String]) -> String {
    format!("{scheme}://{authority}/{}", segments.join("/"))
}

/// Extract `(org, instance)` when the path ends with the user-space layout
fn userspace_ids(segments: &[String]) -> Result<Option<(OrgId, InstanceId)>, LocationError> {
    let n = segments.len();
    if n < 5 {
        return Ok(None);
    }
    let tail = &segments[n - 5..];
    if tail[0] != ORG_LABEL || tail[2] != BROKERS_LABEL || tail[3] != USERSPACE_LABEL {
        return Ok(None);
    }

    let org = tail[1]
        .parse::<OrgId>()
        .map_err(|_| LocationError::MalformedLayout {
            segment: tail[1].clone(),
        })?;
    let instance = tail[4]
        .parse::<InstanceId>()
        .map_err(|_| LocationError::MalformedLayout {
            segment: tail[4].clone(),
        })?;
    Ok(Some((org, instance)))
}

impl Display for InstancePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for InstancePath {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

/// Resolve a location string into an [`InstancePath`]
///
/// # Errors
/// See [`InstancePath::resolve`].
#[inline]
pub fn resolve(location: &str) -> Result<InstancePath, LocationError> {
    InstancePath::resolve(location)
}

/// Errors from location resolution
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    /// Blank input
    #[error("location is empty")]
    Empty,

    /// Not an absolute URI
    #[error("location '{location}' is not a valid URI: {source}")]
    Unparseable {
        location: String,
        #[source]
        source: url::ParseError,
    },

    /// No host
    #[error("location '{0}' has no authority")]
    MissingAuthority(String),

    /// Path is `/` or empty
    #[error("location '{0}' does not name a directory")]
    RootPath(String),

    /// Query or fragment present
    #[error("location '{0}' must not carry a query or fragment")]
    QueryOrFragment(String),

    /// `user:password@` in the authority; the location itself is not echoed
    #[error("location must not embed a password")]
    EmbeddedPassword,

    /// User-space layout with a non-UUID id segment
    #[error("user-space location has malformed id segment '{segment}'")]
    MalformedLayout { segment: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ORG: &str = "0b8f5d2a-3c41-4e6f-8a9b-1c2d3e4f5a6b";
    const INSTANCE: &str = "6f1c2f3e-8d4b-4b6a-9c1e-2a7d5e9f0b13";

    fn userspace_uri() -> String {
        format!("hdfs://nameservice1/org/{ORG}/brokers/userspace/{INSTANCE}")
    }

    #[test]
    fn userspace_layout_embeds_key() {
        let path = resolve(&userspace_uri()).unwrap();
        assert_eq!(path.instance_key().to_string(), INSTANCE);
        assert_eq!(path.org_id().unwrap().to_string(), ORG);
        assert!(path.is_userspace());
        assert_eq!(path.key_source(), KeySource::Embedded);
    }

    #[test]
    fn userspace_layout_under_prefix() {
        let uri = format!("hdfs://nn/cf/broker/org/{ORG}/brokers/userspace/{INSTANCE}/");
        let path = resolve(&uri).unwrap();
        assert_eq!(path.instance_key().to_string(), INSTANCE);
        assert_eq!(path.segments()[0], "cf");
    }

    #[test]
    fn userspace_layout_with_bad_id_fails() {
        let uri = format!("hdfs://nn/org/{ORG}/brokers/userspace/not-a-uuid");
        let err = resolve(&uri).unwrap_err();
        assert!(matches!(err, LocationError::MalformedLayout { ref segment } if segment == "not-a-uuid"));
    }

    #[test]
    fn other_paths_derive_key_from_digest() {
        let path = resolve("hdfs://nn/data/shared").unwrap();
        assert!(!path.is_userspace());
        assert!(path.org_id().is_none());
        match path.key_source() {
            KeySource::Derived(digest) => {
                assert_eq!(digest, LocationDigest::of_canonical("hdfs://nn/data/shared"));
                assert_eq!(path.instance_key(), digest.instance_key());
            }
            KeySource::Embedded => panic!("expected derived key"),
        }
    }

    #[test]
    fn canonical_form_normalizes() {
        let path = resolve("  HDFS://NameNode:8020//data///shared/  ").unwrap();
        assert_eq!(path.canonical(), "hdfs://namenode:8020/data/shared");
        assert_eq!(path.to_string(), path.canonical());
        assert_eq!(path.scheme(), "hdfs");
        assert_eq!(path.authority(), "namenode:8020");
    }

    #[test]
    fn equivalent_spellings_share_key() {
        let a = resolve("hdfs://nn/data/shared").unwrap();
        let b = resolve("hdfs://NN/data//shared/").unwrap();
        let c = resolve("hdfs://nn/data/tmp/../shared").unwrap();
        assert_eq!(a.instance_key(), b.instance_key());
        assert_eq!(a.instance_key(), c.instance_key());
    }

    #[test]
    fn user_name_is_part_of_authority() {
        let path = resolve("hdfs://alice@nn/data").unwrap();
        assert_eq!(path.authority(), "alice@nn");
        assert_ne!(
            path.instance_key(),
            resolve("hdfs://nn/data").unwrap().instance_key()
        );
    }

    #[test]
    fn empty_location_fails() {
        assert!(matches!(resolve(""), Err(LocationError::Empty)));
        assert!(matches!(resolve("   "), Err(LocationError::Empty)));
    }

    #[test]
    fn relative_location_fails() {
        assert!(matches!(
            resolve("data/shared"),
            Err(LocationError::Unparseable { .. })
        ));
    }

    #[test]
    fn missing_authority_fails() {
        assert!(matches!(
            resolve("mailto:ops@example.com"),
            Err(LocationError::MissingAuthority(_))
        ));
        assert!(matches!(
            resolve("file:///tmp/data"),
            Err(LocationError::MissingAuthority(_))
        ));
    }

    #[test]
    fn root_path_fails() {
        assert!(matches!(resolve("hdfs://nn"), Err(LocationError::RootPath(_))));
        assert!(matches!(resolve("hdfs://nn/"), Err(LocationError::RootPath(_))));
        assert!(matches!(resolve("hdfs://nn/a/.."), Err(LocationError::RootPath(_))));
    }

    #[test]
    fn query_and_fragment_fail() {
        assert!(matches!(
            resolve("hdfs://nn/data?x=1"),
            Err(LocationError::QueryOrFragment(_))
        ));
        assert!(matches!(
            resolve("hdfs://nn/data#top"),
            Err(LocationError::QueryOrFragment(_))
        ));
    }

    #[test]
    fn password_fails_without_echo() {
        let err = resolve("hdfs://alice:s3cret@nn/data").unwrap_err();
        assert!(matches!(err, LocationError::EmbeddedPassword));
        assert!(!err.to_string().contains("s3cret"));
    }

    #[test]
    fn for_instance_builds_userspace_layout() {
        let base = resolve("hdfs://nn/cf/broker").unwrap();
        let org: OrgId = ORG.parse().unwrap();
        let instance: InstanceId = INSTANCE.parse().unwrap();
        let path = InstancePath::for_instance(&base, org, instance);

        assert_eq!(path.canonical(), format!("hdfs://nn/cf/broker/org/{ORG}/brokers/userspace/{INSTANCE}"));
        assert_eq!(resolve(&path.canonical()).unwrap(), path);
    }

    #[test]
    fn from_str_matches_resolve() {
        let parsed: InstancePath = userspace_uri().parse().unwrap();
        assert_eq!(parsed, resolve(&userspace_uri()).unwrap());
    }

    proptest! {
        #[test]
        fn prop_resolution_is_deterministic(segs in prop::collection::vec("[a-z0-9_]{1,8}", 1..6)) {
            let plain = format!("hdfs://nn/{}", segs.join("/"));
            let noisy = format!("hdfs://NN//{}/", segs.join("//"));
            let a = resolve(&plain).unwrap();
            let b = resolve(&noisy).unwrap();
            prop_assert_eq!(a.instance_key(), b.instance_key());
            prop_assert_eq!(a.canonical(), b.canonical());
        }
    }
}
