//! Serde plumbing shared by the wire types
//!
//! Human-readable formats (JSON) carry elements and scalars as lowercase hex
//! strings; binary formats (bincode) carry the raw bytes.

use crate::ciphersuite::CONTEXT_STRING;
use crate::{FrostError, FrostResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Implements `Serialize`/`Deserialize` for a type with inherent
/// `to_bytes()` and `from_bytes(&[u8]) -> FrostResult<Self>` methods.
macro_rules! impl_serde_via_bytes {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                crate::encoding::serialize_bytes(&self.to_bytes(), serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let bytes = crate::encoding::deserialize_bytes(deserializer)?;
                <$ty>::from_bytes(&bytes).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use impl_serde_via_bytes;

pub(crate) fn serialize_bytes<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    if serializer.is_human_readable() {
        serializer.serialize_str(&hex::encode(bytes))
    } else {
        bytes.serialize(serializer)
    }
}

pub(crate) fn deserialize_bytes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    if deserializer.is_human_readable() {
        let encoded = String::deserialize(deserializer)?;
        hex::decode(encoded).map_err(serde::de::Error::custom)
    } else {
        Vec::<u8>::deserialize(deserializer)
    }
}

/// `#[serde(with = ...)]` adapter for byte vectors such as messages
pub(crate) mod hex_vec {
    use serde::{Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        super::serialize_bytes(bytes, serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        super::deserialize_bytes(deserializer)
    }
}

/// `#[serde(with = ...)]` adapter for bare scalars
pub(crate) mod scalar {
    use crate::ciphersuite::{deserialize_scalar, serialize_scalar, Scalar};
    use serde::{Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(scalar: &Scalar, serializer: S) -> Result<S::Ok, S::Error> {
        super::serialize_bytes(&serialize_scalar(scalar), serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Scalar, D::Error> {
        let bytes = super::deserialize_bytes(deserializer)?;
        deserialize_scalar(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Opaque binary encoding of a package
pub(crate) fn to_bincode<T: Serialize>(value: &T) -> FrostResult<Vec<u8>> {
    bincode::serialize(value).map_err(|_| FrostError::SerializationError)
}

/// Decode a package produced by [`to_bincode`]
pub(crate) fn from_bincode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> FrostResult<T> {
    bincode::deserialize(bytes).map_err(|_| FrostError::DeserializationError)
}

/// Version and ciphersuite tag prepended to every serialized package
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHeader", into = "RawHeader")]
pub struct Header;

/// Current wire format version
const VERSION: u8 = 0;

#[derive(Serialize, Deserialize)]
struct RawHeader {
    version: u8,
    ciphersuite: String,
}

impl From<Header> for RawHeader {
    fn from(_: Header) -> Self {
        RawHeader {
            version: VERSION,
            ciphersuite: CONTEXT_STRING.to_string(),
        }
    }
}

impl TryFrom<RawHeader> for Header {
    type Error = FrostError;

    fn try_from(raw: RawHeader) -> Result<Self, Self::Error> {
        if raw.version != VERSION || raw.ciphersuite != CONTEXT_STRING {
            return Err(FrostError::InvalidHeader);
        }
        Ok(Header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_json() {
        let json = serde_json::to_string(&Header).unwrap();
        assert_eq!(json, r#"{"version":0,"ciphersuite":"FROST(Pallas, BLAKE2b-512)"}"#);
        assert_eq!(serde_json::from_str::<Header>(&json).unwrap(), Header);
    }

    #[test]
    fn test_foreign_header_rejected() {
        let json = r#"{"version":0,"ciphersuite":"FROST(Ed25519, SHA-512)"}"#;
        assert!(serde_json::from_str::<Header>(json).is_err());

        let json = r#"{"version":1,"ciphersuite":"FROST(Pallas, BLAKE2b-512)"}"#;
        assert!(serde_json::from_str::<Header>(json).is_err());
    }
}
