//! Location digests
//!
//! Provides [`LocationDigest`], a 32-byte blake3 hash of a canonical
//! location string. Locations outside the broker user-space layout get
//! their instance key from this digest.

use crate::id::InstanceId;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// A 32-byte blake3 digest of a canonical location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocationDigest([u8; 32]);

impl LocationDigest {
    /// Wrap raw digest bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Digest the canonical form of a location
    #[inline]
    #[must_use]
    pub fn of_canonical(canonical: &str) -> Self {
        Self(*blake3::hash(canonical.as_bytes()).as_bytes())
    }

    /// Raw digest bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 16 hex chars, for log lines
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }

    /// Instance key derived from the digest
    ///
    /// A version 8 UUID carrying the first 16 digest bytes (minus the
    /// version and variant bits).
    #[must_use]
    pub fn instance_key(&self) -> InstanceId {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(&self.0[..16]);
        InstanceId::new(Uuid::new_v8(buf))
    }
}

impl Display for LocationDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for LocationDigest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| DigestError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }
}

impl serde::Serialize for LocationDigest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for LocationDigest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors from parsing a digest string
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// Wrong number of bytes
    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Not hex
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let a = LocationDigest::of_canonical("hdfs://nn/a/b");
        let b = LocationDigest::of_canonical("hdfs://nn/a/b");
        assert_eq!(a, b);
        assert_eq!(a.instance_key(), b.instance_key());
    }

    #[test]
    fn digest_differs_per_location() {
        let a = LocationDigest::of_canonical("hdfs://nn/a");
        let b = LocationDigest::of_canonical("hdfs://nn/b");
        assert_ne!(a, b);
        assert_ne!(a.instance_key(), b.instance_key());
    }

    #[test]
    fn instance_key_is_version_8() {
        let key = LocationDigest::of_canonical("hdfs://nn/a").instance_key();
        assert_eq!(key.as_uuid().get_version_num(), 8);
    }

    #[test]
    fn short_is_prefix_of_display() {
        let d = LocationDigest::of_canonical("x");
        assert_eq!(d.short().len(), 16);
        assert!(d.to_string().starts_with(&d.short()));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let result: Result<LocationDigest, _> = "abcd".parse();
        assert!(matches!(
            result,
            Err(DigestError::InvalidLength { expected: 32, actual: 2 })
        ));
    }

    #[test]
    fn serde_uses_hex_string() {
        let d = LocationDigest::of_canonical("x");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{d}\""));
        let back: LocationDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
