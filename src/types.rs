//! Core types for the oracle engine.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

use crate::builtin::BUILTIN_PREFIX;

/// Identity vouching for a piece of oracle data (e.g. a public key).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signer(pub String);

impl Signer {
    pub fn new(id: impl Into<String>) -> Self {
        Signer(id.into())
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signer({})", self.0)
    }
}

impl fmt::Display for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content identifier for an oracle spec (SHA-256 of the canonical definition).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecId(pub [u8; 32]);

impl SpecId {
    /// Compute the id from canonical definition bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        SpecId(hasher.finalize().into())
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(SpecId(arr))
    }
}

impl fmt::Debug for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpecId({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// Hex on the wire: event payloads carry spec ids as strings.
impl Serialize for SpecId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SpecId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SpecId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Process-unique identifier for a subscription. Never reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Nanoseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnixTs(pub i64);

impl fmt::Debug for UnixTs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnixTs({})", self.0)
    }
}

/// A single named property value, as carried in match events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// A data packet pushed by a producer.
///
/// Properties are string-encoded; filters convert them to their declared
/// type at match time. Metadata is carried through to match events but
/// never matched against. Packets are transient: the engine retains
/// nothing after a broadcast.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleData {
    /// Identities attesting the data.
    pub signers: Vec<Signer>,

    /// Property name to string-encoded value.
    pub properties: BTreeMap<String, String>,

    /// Auxiliary key/value pairs.
    pub metadata: BTreeMap<String, String>,
}

impl OracleData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signer.
    pub fn with_signer(mut self, signer: impl Into<String>) -> Self {
        self.signers.push(Signer::new(signer));
        self
    }

    /// Add a property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// True if every property key carries the builtin prefix, marking the
    /// packet as internally generated. Such packets skip signer checks.
    pub fn is_internal(&self) -> bool {
        self.properties
            .keys()
            .all(|key| key.starts_with(BUILTIN_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::TIMESTAMP_KEY;

    #[test]
    fn test_spec_id_roundtrip() {
        let id = SpecId::from_bytes(b"definition bytes");
        let hex = id.to_hex();
        let parsed = SpecId::from_hex(&hex).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_spec_id_debug_truncates() {
        let id = SpecId::from_bytes(b"abc");
        let debug = format!("{:?}", id);
        assert!(debug.starts_with("SpecId("));
        assert!(debug.ends_with("...)"));
    }

    #[test]
    fn test_spec_id_serializes_as_hex() {
        let id = SpecId::from_bytes(b"abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let back: SpecId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_internal_data_detection() {
        let internal = OracleData::new().with_property(TIMESTAMP_KEY, "100");
        assert!(internal.is_internal());

        let external = OracleData::new()
            .with_property(TIMESTAMP_KEY, "100")
            .with_property("prices.BTC.value", "42000");
        assert!(!external.is_internal());

        // No properties at all: vacuously internal.
        assert!(OracleData::new().is_internal());
    }

    #[test]
    fn test_data_builder() {
        let data = OracleData::new()
            .with_signer("0xCAFED00D")
            .with_property("prices.ETH.value", "1500")
            .with_metadata("source", "test");

        assert_eq!(data.signers, vec![Signer::new("0xCAFED00D")]);
        assert_eq!(
            data.properties.get("prices.ETH.value"),
            Some(&"1500".to_string())
        );
        assert_eq!(data.metadata.get("source"), Some(&"test".to_string()));
    }
}
