//! Error taxonomies of the SDK surface
//!
//! Every operation family gets its own closed error enum. Core engine errors
//! are translated here and nowhere else, with culprit identifiers converted
//! into [`ParticipantIdentifier`] records.

use crate::ParticipantIdentifier;
use frost_pallas_core::FrostError as CoreError;
use thiserror::Error;

/// Threshold policy errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// max_signers is below 2
    #[error("Number of maximum signers is invalid.")]
    InvalidMaxSigners,
    /// min_signers is below 2 or above max_signers
    #[error("Number of minimum signers is invalid.")]
    InvalidMinSigners,
    /// A custom identifier could not be decoded
    #[error("One or more of the custom Identifiers provided are invalid.")]
    InvalidIdentifier,
    #[error("There's a problem with this configuration.")]
    UnknownError,
}

/// Key generation, DKG and codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrostError {
    #[error("min_signers must be at least 2 and not larger than max_signers")]
    InvalidMinSigners,
    #[error("max_signers must be at least 2")]
    InvalidMaxSigners,
    #[error("coefficients must have min_signers elements")]
    InvalidCoefficients,
    /// Identifier is zero, not canonical or not decodable
    #[error("Malformed identifier is unserializable.")]
    MalformedIdentifier,
    #[error("Duplicated identifier.")]
    DuplicatedIdentifier,
    /// Identifier does not belong to a participant of this session
    #[error("Unknown identifier.")]
    UnknownIdentifier,
    #[error("Incorrect number of identifiers.")]
    IncorrectNumberOfIdentifiers,
    #[error("Malformed signing key encoding.")]
    MalformedSigningKey,
    #[error("Malformed verifying key encoding.")]
    MalformedVerifyingKey,
    #[error("Malformed signature encoding.")]
    MalformedSignature,
    #[error("Invalid signature.")]
    InvalidSignature,
    #[error("Duplicated shares provided.")]
    DuplicatedShares,
    #[error("Incorrect number of shares.")]
    IncorrectNumberOfShares,
    #[error("Commitment equals the identity.")]
    IdentityCommitment,
    #[error("The Signing Package must contain the participant's Commitment.")]
    MissingCommitment,
    #[error("The participant's commitment is incorrect.")]
    IncorrectCommitment,
    #[error("Incorrect number of commitments.")]
    IncorrectNumberOfCommitments,
    /// A signature share failed verification
    #[error("Invalid signature share.")]
    InvalidSignatureShare {
        /// Signer whose share failed
        culprit: ParticipantIdentifier,
    },
    /// A secret share does not match the sender's VSS commitment
    #[error("Invalid secret share.")]
    InvalidSecretShare {
        /// Participant whose share failed
        culprit: ParticipantIdentifier,
    },
    #[error("Round 1 package not found for Round 2 participant.")]
    PackageNotFound,
    #[error("Incorrect number of packages.")]
    IncorrectNumberOfPackages,
    #[error("The incorrect package was specified.")]
    IncorrectPackage,
    /// A DKG proof of knowledge failed
    #[error("The proof of knowledge is not valid.")]
    InvalidProofOfKnowledge {
        /// Participant whose proof failed
        culprit: ParticipantIdentifier,
    },
    /// Scalar could not be decoded
    #[error("Error in scalar field: {message}")]
    FieldError { message: String },
    /// Group element could not be decoded or is the identity
    #[error("Error in elliptic curve group: {message}")]
    GroupError { message: String },
    #[error("Invalid coefficient")]
    InvalidCoefficient,
    #[error("The ciphersuite does not support deriving identifiers from strings.")]
    IdentifierDerivationNotSupported,
    #[error("Error serializing value.")]
    SerializationError,
    #[error("Error deserializing value.")]
    DeserializationError,
    #[error("DKG part 2 couldn't be started because of an invalid number of commitments")]
    DkgPart2IncorrectNumberOfCommitments,
    #[error("DKG part 2 couldn't be started because of an invalid number of packages")]
    DkgPart2IncorrectNumberOfPackages,
    #[error("DKG part 3 couldn't be started because packages for round 1 are incorrect or corrupted.")]
    DkgPart3IncorrectRound1Packages,
    #[error("DKG part 3 couldn't be started because of an invalid number of packages.")]
    DkgPart3IncorrectNumberOfPackages,
    #[error("A sender identified from round 1 is not present within round 2 packages.")]
    DkgPart3PackageSendersMismatch,
    #[error("Key Package is invalid.")]
    InvalidKeyPackage,
    #[error("Secret Key couldn't be verified.")]
    InvalidSecretKey,
    #[error("Key generation couldn't be started because of an invalid number of signers.")]
    InvalidConfiguration,
    #[error("Unexpected Error.")]
    UnexpectedError,
}

impl From<CoreError> for FrostError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::InvalidMinSigners => FrostError::InvalidMinSigners,
            CoreError::InvalidMaxSigners => FrostError::InvalidMaxSigners,
            CoreError::InvalidCoefficients => FrostError::InvalidCoefficients,
            CoreError::MalformedIdentifier => FrostError::MalformedIdentifier,
            CoreError::DuplicatedIdentifier => FrostError::DuplicatedIdentifier,
            CoreError::UnknownIdentifier => FrostError::UnknownIdentifier,
            CoreError::IncorrectNumberOfIdentifiers => FrostError::IncorrectNumberOfIdentifiers,
            CoreError::MalformedSigningKey => FrostError::MalformedSigningKey,
            CoreError::MalformedVerifyingKey => FrostError::MalformedVerifyingKey,
            CoreError::MalformedSignature => FrostError::MalformedSignature,
            CoreError::MalformedScalar => FrostError::FieldError {
                message: error.to_string(),
            },
            CoreError::MalformedElement | CoreError::InvalidIdentityElement => {
                FrostError::GroupError {
                    message: error.to_string(),
                }
            }
            CoreError::InvalidSignature => FrostError::InvalidSignature,
            CoreError::DuplicatedShares => FrostError::DuplicatedShares,
            CoreError::IncorrectNumberOfShares => FrostError::IncorrectNumberOfShares,
            CoreError::IdentityCommitment => FrostError::IdentityCommitment,
            CoreError::MissingCommitment => FrostError::MissingCommitment,
            CoreError::IncorrectCommitment => FrostError::IncorrectCommitment,
            CoreError::IncorrectNumberOfCommitments => FrostError::IncorrectNumberOfCommitments,
            CoreError::InvalidSignatureShare { culprit } => FrostError::InvalidSignatureShare {
                culprit: culprit.into(),
            },
            CoreError::InvalidSecretShare { culprit } => FrostError::InvalidSecretShare {
                culprit: culprit.into(),
            },
            CoreError::PackageNotFound => FrostError::PackageNotFound,
            CoreError::IncorrectNumberOfPackages => FrostError::IncorrectNumberOfPackages,
            CoreError::IncorrectPackage => FrostError::IncorrectPackage,
            CoreError::InvalidProofOfKnowledge { culprit } => FrostError::InvalidProofOfKnowledge {
                culprit: culprit.into(),
            },
            CoreError::InvalidCoefficient => FrostError::InvalidCoefficient,
            CoreError::IdentifierDerivationNotSupported => {
                FrostError::IdentifierDerivationNotSupported
            }
            CoreError::SerializationError => FrostError::SerializationError,
            CoreError::DeserializationError | CoreError::InvalidHeader => {
                FrostError::DeserializationError
            }
        }
    }
}

impl From<ConfigurationError> for FrostError {
    fn from(error: ConfigurationError) -> Self {
        match error {
            ConfigurationError::InvalidMinSigners => FrostError::InvalidMinSigners,
            ConfigurationError::InvalidMaxSigners => FrostError::InvalidMaxSigners,
            ConfigurationError::InvalidIdentifier => FrostError::MalformedIdentifier,
            ConfigurationError::UnknownError => FrostError::InvalidConfiguration,
        }
    }
}

/// Signing package construction and aggregation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinationError {
    #[error("failed to create signing package")]
    FailedToCreateSigningPackage,
    /// A commitment is undecodable or its identifier repeats
    #[error("invalid signing commitment")]
    InvalidSigningCommitment,
    #[error("identifier deserialization error")]
    IdentifierDeserializationError,
    #[error("signing package serialization error")]
    SigningPackageSerializationError,
    #[error("signature share deserialization error")]
    SignatureShareDeserializationError,
    #[error("public key package deserialization error")]
    PublicKeyPackageDeserializationError,
    /// A signature share is undecodable or fails verification
    #[error("invalid signature share from {culprit:?}")]
    InvalidSignatureShare {
        /// Signer to exclude before retrying
        culprit: ParticipantIdentifier,
    },
    #[error("signature share aggregation failed: {message}")]
    SignatureShareAggregationFailed { message: String },
    #[error("invalid randomizer")]
    InvalidRandomizer,
}

/// Round 1 (nonce generation) errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Round1Error {
    #[error("invalid key package")]
    InvalidKeyPackage,
    #[error("nonce serialization error")]
    NonceSerializationError,
    #[error("commitment serialization error")]
    CommitmentSerializationError,
}

/// Round 2 (signature share) errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Round2Error {
    #[error("invalid key package")]
    InvalidKeyPackage,
    #[error("nonce serialization error")]
    NonceSerializationError,
    #[error("commitment serialization error")]
    CommitmentSerializationError,
    #[error("signing package deserialization error")]
    SigningPackageDeserializationError,
    /// Nonces do not match this signer's entry in the signing package
    #[error("signing package commitment does not match the nonces")]
    IncorrectCommitment,
    #[error("signing failed: {message}")]
    SigningFailed { message: String },
    #[error("invalid randomizer")]
    InvalidRandomizer,
}

/// Signature verification outcome
///
/// A failed check is an expected result, reported with its reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("invalid public key package")]
    InvalidPublicKeyPackage,
    #[error("signature validation failed: {reason}")]
    ValidationFailed { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use frost_pallas_core::Identifier;

    #[test]
    fn test_culprit_is_carried_over() {
        let id = Identifier::try_from(2u16).unwrap();
        let error: FrostError = CoreError::InvalidProofOfKnowledge { culprit: id }.into();
        assert_eq!(
            error,
            FrostError::InvalidProofOfKnowledge {
                culprit: ParticipantIdentifier::from(id)
            }
        );
    }

    #[test]
    fn test_group_errors_keep_a_message() {
        match FrostError::from(CoreError::InvalidIdentityElement) {
            FrostError::GroupError { message } => assert!(!message.is_empty()),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(
            FrostError::from(CoreError::InvalidHeader),
            FrostError::DeserializationError
        );
    }

    #[test]
    fn test_configuration_errors() {
        assert_eq!(
            FrostError::from(ConfigurationError::InvalidMaxSigners),
            FrostError::InvalidMaxSigners
        );
        assert_eq!(
            FrostError::from(ConfigurationError::UnknownError),
            FrostError::InvalidConfiguration
        );
    }
}
