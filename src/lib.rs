//! FROST(Pallas) SDK
//!
//! Byte-oriented records over the `frost-pallas-core` engine, suitable for
//! carrying across process or language boundaries. Every record holds either
//! the JSON text of an identifier or the opaque binary encoding of a core
//! package; the heavy lifting stays in the core crate.
//!
//! - [`trusted_dealer`]: dealer key generation from a [`Configuration`]
//! - [`dkg`]: three-part distributed key generation
//! - [`participant`] / [`coordinator`]: two-round signing and aggregation
//! - [`randomized`]: re-randomized signing parameters
//! - [`serialization`]: JSON codecs for every record
//! - [`orchard`]: the Orchard key hierarchy built on the group key

#![deny(unsafe_code)]

pub mod coordinator;
pub mod dkg;
pub mod error;
pub mod participant;
pub mod randomized;
pub mod serialization;
pub mod trusted_dealer;

pub use error::{ConfigurationError, FrostError};
pub use frost_orchard_keys as orchard;

use frost_pallas_core::keys::{IdentifierList, KeyPackage, PublicKeyPackage, SecretShare};
use frost_pallas_core::{FrostError as CoreError, FrostResult, Identifier, VerifyingKey, VerifyingShare};
use log::debug;
use rand_core::OsRng;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Participant identifier, carried as the JSON text of the core identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantIdentifier {
    pub data: String,
}

impl ParticipantIdentifier {
    /// Accept `string` only if it is the JSON encoding of a valid identifier
    ///
    /// The stored text is re-encoded, so equal identifiers give equal records.
    pub fn from_json_string(string: &str) -> Option<ParticipantIdentifier> {
        serde_json::from_str::<Identifier>(string)
            .ok()
            .map(ParticipantIdentifier::from)
    }

    /// Decode the wrapped identifier
    pub fn into_identifier(&self) -> FrostResult<Identifier> {
        serde_json::from_str(&self.data).map_err(|_| CoreError::MalformedIdentifier)
    }
}

impl From<Identifier> for ParticipantIdentifier {
    fn from(identifier: Identifier) -> Self {
        // same text serde_json produces for the identifier: a quoted hex string
        ParticipantIdentifier {
            data: serde_json::Value::String(hex::encode(identifier.to_bytes())).to_string(),
        }
    }
}

/// Identifiers chosen by the caller for a dealer run
#[derive(Debug, Clone, Default)]
pub struct ParticipantList {
    pub identifiers: Vec<ParticipantIdentifier>,
}

/// Threshold policy for key generation
///
/// An empty `secret` asks the dealer to sample a fresh group key; otherwise it
/// must be a canonical, nonzero 32-byte scalar.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Configuration {
    pub min_signers: u16,
    pub max_signers: u16,
    pub secret: Vec<u8>,
}

/// Check `2 <= min_signers <= max_signers`
pub fn validate_config(config: &Configuration) -> Result<(), ConfigurationError> {
    if config.min_signers < 2 {
        return Err(ConfigurationError::InvalidMinSigners);
    }

    if config.max_signers < 2 {
        return Err(ConfigurationError::InvalidMaxSigners);
    }

    if config.min_signers > config.max_signers {
        return Err(ConfigurationError::InvalidMinSigners);
    }

    Ok(())
}

/// A dealer-issued share addressed to one participant
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct FrostSecretKeyShare {
    #[zeroize(skip)]
    pub identifier: ParticipantIdentifier,
    pub data: Vec<u8>,
}

impl fmt::Debug for FrostSecretKeyShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrostSecretKeyShare")
            .field("identifier", &self.identifier)
            .field("data", &"<redacted>")
            .finish()
    }
}

impl FrostSecretKeyShare {
    pub fn from_secret_share(secret_share: &SecretShare) -> FrostResult<FrostSecretKeyShare> {
        Ok(FrostSecretKeyShare {
            identifier: (*secret_share.identifier()).into(),
            data: secret_share.to_bytes()?,
        })
    }

    /// Decode the share, rejecting a payload addressed to someone else
    pub fn to_secret_share(&self) -> FrostResult<SecretShare> {
        let identifier = self.identifier.into_identifier()?;
        let secret_share = SecretShare::from_bytes(&self.data)?;

        if identifier != *secret_share.identifier() {
            Err(CoreError::UnknownIdentifier)
        } else {
            Ok(secret_share)
        }
    }

    /// Verify the share against its commitment and derive the key package
    pub fn into_key_package(&self) -> FrostResult<FrostKeyPackage> {
        let key_package = KeyPackage::try_from(self.to_secret_share()?)?;
        FrostKeyPackage::from_key_package(&key_package)
    }
}

/// Long-lived signing material of one participant
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FrostKeyPackage {
    #[zeroize(skip)]
    pub identifier: ParticipantIdentifier,
    pub data: Vec<u8>,
}

impl fmt::Debug for FrostKeyPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrostKeyPackage")
            .field("identifier", &self.identifier)
            .field("data", &"<redacted>")
            .finish()
    }
}

impl FrostKeyPackage {
    pub fn from_key_package(key_package: &KeyPackage) -> FrostResult<Self> {
        Ok(FrostKeyPackage {
            identifier: (*key_package.identifier()).into(),
            data: key_package.to_bytes()?,
        })
    }

    /// Decode the package, rejecting a payload that belongs to someone else
    pub fn into_key_package(&self) -> FrostResult<KeyPackage> {
        let identifier = self.identifier.into_identifier()?;
        let key_package = KeyPackage::from_bytes(&self.data)?;

        if identifier != *key_package.identifier() {
            Err(CoreError::UnknownIdentifier)
        } else {
            Ok(key_package)
        }
    }
}

/// Group public material with hex-encoded keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrostPublicKeyPackage {
    pub verifying_shares: HashMap<ParticipantIdentifier, String>,
    pub verifying_key: String,
}

impl FrostPublicKeyPackage {
    pub fn from_public_key_package(public_key_package: &PublicKeyPackage) -> Self {
        let verifying_shares = public_key_package
            .verifying_shares()
            .iter()
            .map(|(identifier, share)| ((*identifier).into(), hex::encode(share.to_bytes())))
            .collect();

        FrostPublicKeyPackage {
            verifying_shares,
            verifying_key: hex::encode(public_key_package.verifying_key().to_bytes()),
        }
    }

    pub fn into_public_key_package(&self) -> FrostResult<PublicKeyPackage> {
        let raw_verifying_key =
            hex::decode(&self.verifying_key).map_err(|_| CoreError::DeserializationError)?;
        let verifying_key = VerifyingKey::from_bytes(&raw_verifying_key)?;

        let mut verifying_shares = BTreeMap::new();
        for (identifier, share) in &self.verifying_shares {
            let raw_share = hex::decode(share).map_err(|_| CoreError::DeserializationError)?;
            verifying_shares.insert(
                identifier.into_identifier()?,
                VerifyingShare::from_bytes(&raw_share)?,
            );
        }

        Ok(PublicKeyPackage::new(verifying_shares, verifying_key))
    }
}

/// Output of a dealer run
#[derive(Debug)]
pub struct TrustedKeyGeneration {
    pub secret_shares: HashMap<ParticipantIdentifier, FrostSecretKeyShare>,
    pub public_key_package: FrostPublicKeyPackage,
}

/// Verify a dealer share and turn it into the participant's key package
///
/// A share inconsistent with the dealer commitment names the share's owner as
/// culprit; a record whose identifier disagrees with its payload is rejected
/// as [`FrostError::UnknownIdentifier`].
pub fn verify_and_get_key_package_from(
    secret_share: &FrostSecretKeyShare,
) -> Result<FrostKeyPackage, FrostError> {
    secret_share.into_key_package().map_err(FrostError::from)
}

/// Dealer key generation with identifiers `1..=max_signers`
pub fn trusted_dealer_keygen_from(
    configuration: &Configuration,
) -> Result<TrustedKeyGeneration, FrostError> {
    let (public_key_package, secret_shares) =
        trusted_dealer::trusted_dealer_keygen_from_configuration(configuration)?;

    Ok(TrustedKeyGeneration {
        secret_shares,
        public_key_package,
    })
}

/// Dealer key generation with caller-chosen identifiers
pub fn trusted_dealer_keygen_with_identifiers(
    configuration: &Configuration,
    participants: &ParticipantList,
) -> Result<TrustedKeyGeneration, FrostError> {
    if usize::from(configuration.max_signers) != participants.identifiers.len() {
        return Err(FrostError::InvalidMaxSigners);
    }

    let custom_identifiers = participants
        .identifiers
        .iter()
        .map(|identifier| {
            identifier
                .into_identifier()
                .map_err(|_| FrostError::MalformedIdentifier)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "dealer keygen for {} custom identifiers",
        custom_identifiers.len()
    );
    let (secret_shares, public_key_package) = trusted_dealer::trusted_dealer_keygen(
        configuration,
        IdentifierList::Custom(&custom_identifiers),
        &mut OsRng,
    )?;

    Ok(TrustedKeyGeneration {
        secret_shares: trusted_dealer::share_records(secret_shares.values())?,
        public_key_package: FrostPublicKeyPackage::from_public_key_package(&public_key_package),
    })
}

/// Accept the JSON text of an identifier
pub fn identifier_from_json_string(string: &str) -> Option<ParticipantIdentifier> {
    ParticipantIdentifier::from_json_string(string)
}

/// Derive an identifier by hashing an arbitrary string
pub fn identifier_from_string(string: &str) -> Result<ParticipantIdentifier, FrostError> {
    let identifier = Identifier::derive(string.as_bytes())?;
    Ok(identifier.into())
}

/// Identifier with the numeric value `unsigned_uint`; zero is rejected
pub fn identifier_from_uint16(unsigned_uint: u16) -> Result<ParticipantIdentifier, FrostError> {
    let identifier = Identifier::try_from(unsigned_uint)?;
    Ok(identifier.into())
}

/// Identifier from its 32-byte little-endian scalar encoding
pub fn identifier_from_bytes(bytes: &[u8]) -> Result<ParticipantIdentifier, FrostError> {
    let identifier = Identifier::from_bytes(bytes).map_err(|_| FrostError::MalformedIdentifier)?;
    Ok(identifier.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_signers: u16, max_signers: u16) -> Configuration {
        Configuration {
            min_signers,
            max_signers,
            secret: Vec::new(),
        }
    }

    #[test]
    fn test_validate_config() {
        assert_eq!(validate_config(&config(2, 3)), Ok(()));
        assert_eq!(
            validate_config(&config(1, 3)),
            Err(ConfigurationError::InvalidMinSigners)
        );
        assert_eq!(
            validate_config(&config(2, 1)),
            Err(ConfigurationError::InvalidMaxSigners)
        );
        assert_eq!(
            validate_config(&config(4, 3)),
            Err(ConfigurationError::InvalidMinSigners)
        );
    }

    #[test]
    fn test_participant_identifier_matches_serde() {
        let identifier = Identifier::try_from(7u16).unwrap();
        let participant = ParticipantIdentifier::from(identifier);
        assert_eq!(participant.data, serde_json::to_string(&identifier).unwrap());
        assert_eq!(participant.into_identifier().unwrap(), identifier);
    }

    #[test]
    fn test_identifier_from_uint16() {
        let participant = identifier_from_uint16(1).unwrap();
        assert_eq!(
            participant.data,
            "\"0100000000000000000000000000000000000000000000000000000000000000\""
        );
        assert_eq!(
            identifier_from_uint16(0),
            Err(FrostError::MalformedIdentifier)
        );
    }

    #[test]
    fn test_identifier_from_json_string() {
        let json = "\"0300000000000000000000000000000000000000000000000000000000000000\"";
        let participant = identifier_from_json_string(json).unwrap();
        assert_eq!(participant, identifier_from_uint16(3).unwrap());

        assert!(identifier_from_json_string("not json").is_none());
        assert!(identifier_from_json_string(
            "\"0000000000000000000000000000000000000000000000000000000000000000\""
        )
        .is_none());
    }

    #[test]
    fn test_identifier_from_json_string_is_canonical() {
        let padded = " \"0a00000000000000000000000000000000000000000000000000000000000000\"\n";
        let upper = "\"0A00000000000000000000000000000000000000000000000000000000000000\"";
        let ten = identifier_from_uint16(10).unwrap();

        assert_eq!(identifier_from_json_string(padded).unwrap(), ten);
        assert_eq!(identifier_from_json_string(upper).unwrap(), ten);

        let mut keys = HashMap::new();
        keys.insert(identifier_from_json_string(padded).unwrap(), ());
        assert!(keys.contains_key(&identifier_from_json_string(upper).unwrap()));
    }

    #[test]
    fn test_identifier_from_string_is_deterministic() {
        let alice = identifier_from_string("alice").unwrap();
        assert_eq!(alice, identifier_from_string("alice").unwrap());
        assert_ne!(alice, identifier_from_string("bob").unwrap());
    }

    #[test]
    fn test_identifier_from_bytes() {
        let mut bytes = [0u8; 32];
        bytes[0] = 5;
        assert_eq!(
            identifier_from_bytes(&bytes).unwrap(),
            identifier_from_uint16(5).unwrap()
        );
        assert_eq!(
            identifier_from_bytes(&[0u8; 32]),
            Err(FrostError::MalformedIdentifier)
        );
        assert_eq!(
            identifier_from_bytes(&[1u8; 3]),
            Err(FrostError::MalformedIdentifier)
        );
    }

    #[test]
    fn test_keygen_with_identifiers() {
        let identifiers: Vec<_> = ["alice", "bob", "carol"]
            .iter()
            .map(|name| identifier_from_string(name).unwrap())
            .collect();
        let participants = ParticipantList {
            identifiers: identifiers.clone(),
        };

        let keygen = trusted_dealer_keygen_with_identifiers(&config(2, 3), &participants).unwrap();
        assert_eq!(keygen.secret_shares.len(), 3);
        for identifier in &identifiers {
            let share = &keygen.secret_shares[identifier];
            let key_package = verify_and_get_key_package_from(share).unwrap();
            assert_eq!(&key_package.identifier, identifier);
        }
    }

    #[test]
    fn test_keygen_with_identifiers_rejects_bad_lists() {
        let participants = ParticipantList {
            identifiers: vec![identifier_from_uint16(1).unwrap()],
        };
        assert_eq!(
            trusted_dealer_keygen_with_identifiers(&config(2, 3), &participants).unwrap_err(),
            FrostError::InvalidMaxSigners
        );

        let participants = ParticipantList {
            identifiers: vec![
                identifier_from_uint16(1).unwrap(),
                ParticipantIdentifier {
                    data: "garbage".to_string(),
                },
                identifier_from_uint16(3).unwrap(),
            ],
        };
        assert_eq!(
            trusted_dealer_keygen_with_identifiers(&config(2, 3), &participants).unwrap_err(),
            FrostError::MalformedIdentifier
        );

        let one = identifier_from_uint16(1).unwrap();
        let participants = ParticipantList {
            identifiers: vec![one.clone(), one, identifier_from_uint16(3).unwrap()],
        };
        assert_eq!(
            trusted_dealer_keygen_with_identifiers(&config(2, 3), &participants).unwrap_err(),
            FrostError::DuplicatedIdentifier
        );
    }

    #[test]
    fn test_share_for_someone_else_is_rejected() {
        let keygen = trusted_dealer_keygen_from(&config(2, 3)).unwrap();
        let one = identifier_from_uint16(1).unwrap();
        let two = identifier_from_uint16(2).unwrap();

        let forged = FrostSecretKeyShare {
            identifier: two,
            data: keygen.secret_shares[&one].data.clone(),
        };
        assert_eq!(
            verify_and_get_key_package_from(&forged).unwrap_err(),
            FrostError::UnknownIdentifier
        );

        let garbage = FrostSecretKeyShare {
            identifier: one,
            data: vec![1, 2, 3],
        };
        assert_eq!(
            verify_and_get_key_package_from(&garbage).unwrap_err(),
            FrostError::DeserializationError
        );
    }

    #[test]
    fn test_key_package_for_someone_else_is_rejected() {
        let keygen = trusted_dealer_keygen_from(&config(2, 3)).unwrap();
        let one = identifier_from_uint16(1).unwrap();
        let key_package = verify_and_get_key_package_from(&keygen.secret_shares[&one]).unwrap();

        let relabeled = FrostKeyPackage {
            identifier: identifier_from_uint16(2).unwrap(),
            data: key_package.data.clone(),
        };
        assert_eq!(
            relabeled.into_key_package().unwrap_err(),
            CoreError::UnknownIdentifier
        );
        assert!(key_package.into_key_package().is_ok());
    }

    #[test]
    fn test_public_key_package_record_roundtrip() {
        let keygen = trusted_dealer_keygen_from(&config(2, 3)).unwrap();
        let package = keygen.public_key_package.into_public_key_package().unwrap();
        assert_eq!(
            FrostPublicKeyPackage::from_public_key_package(&package),
            keygen.public_key_package
        );
        assert!(package.verifying_key().has_even_y());
    }
}
