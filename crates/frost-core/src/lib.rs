//! FROST (Flexible Round-Optimized Schnorr Threshold) over Pallas
//!
//! This crate implements the FROST(Pallas, BLAKE2b-512) threshold signature
//! scheme with the Orchard spend authorization base as generator:
//! - Trusted dealer key generation with Feldman VSS commitments
//! - Three-part Distributed Key Generation (DKG) with proofs of knowledge
//! - Two-round threshold signing with share verification and culprit reporting
//! - Re-randomized signing for unlinkable spend authorization signatures

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod ciphersuite;
pub mod dkg;
mod encoding;
pub mod keys;
pub mod randomized;
pub mod signing;
pub mod types;

pub use ciphersuite::{Element, Scalar, CONTEXT_STRING};
pub use keys::{
    generate_with_dealer, split, IdentifierList, KeyPackage, PublicKeyPackage, SecretShare,
    SigningKey,
};
pub use randomized::{RandomizedParams, Randomizer};
pub use signing::{
    aggregate, commit, sign, verify_signature_share, SignatureShare, SigningCommitments,
    SigningNonces, SigningPackage,
};
pub use types::*;

use thiserror::Error;

/// FROST protocol errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrostError {
    /// Minimum number of signers is below 2 or above the maximum
    #[error("min_signers must be at least 2 and not larger than max_signers")]
    InvalidMinSigners,

    /// Maximum number of signers is below 2
    #[error("max_signers must be at least 2")]
    InvalidMaxSigners,

    /// Polynomial does not have `min_signers` coefficients
    #[error("Invalid number of coefficients")]
    InvalidCoefficients,

    /// Identifier is zero or not a canonical scalar
    #[error("Malformed identifier is unserializable")]
    MalformedIdentifier,

    /// The same identifier appears twice
    #[error("Duplicated identifier")]
    DuplicatedIdentifier,

    /// Identifier is not part of the current session
    #[error("Unknown identifier")]
    UnknownIdentifier,

    /// Identifier list does not match `max_signers`
    #[error("Incorrect number of identifiers")]
    IncorrectNumberOfIdentifiers,

    /// Signing key could not be decoded
    #[error("Malformed signing key encoding")]
    MalformedSigningKey,

    /// Verifying key could not be decoded
    #[error("Malformed verifying key encoding")]
    MalformedVerifyingKey,

    /// Signature could not be decoded
    #[error("Malformed signature encoding")]
    MalformedSignature,

    /// Group element is not a canonical point encoding
    #[error("Malformed group element")]
    MalformedElement,

    /// Scalar is not a canonical field element encoding
    #[error("Malformed scalar")]
    MalformedScalar,

    /// Identity element where it is not allowed
    #[error("Invalid identity element")]
    InvalidIdentityElement,

    /// Signature verification failed
    #[error("Invalid signature")]
    InvalidSignature,

    /// The same share appears twice
    #[error("Duplicated shares provided")]
    DuplicatedShares,

    /// Share count does not match the commitment set
    #[error("Incorrect number of shares")]
    IncorrectNumberOfShares,

    /// A nonce commitment is the identity
    #[error("Commitment equals the identity")]
    IdentityCommitment,

    /// A signer's commitment is missing from the signing package
    #[error("Signing package is missing a commitment")]
    MissingCommitment,

    /// Signer's nonces do not match the commitment in the signing package
    #[error("Commitment does not match the signing nonces")]
    IncorrectCommitment,

    /// Commitment count does not match the threshold
    #[error("Incorrect number of commitments")]
    IncorrectNumberOfCommitments,

    /// Signature share failed verification
    #[error("Invalid signature share from {culprit:?}")]
    InvalidSignatureShare {
        /// Identifier of the signer whose share is invalid
        culprit: Identifier,
    },

    /// Secret share is inconsistent with its VSS commitment
    #[error("Invalid secret share from {culprit:?}")]
    InvalidSecretShare {
        /// Identifier of the participant whose share is invalid
        culprit: Identifier,
    },

    /// A required package is missing
    #[error("Package not found")]
    PackageNotFound,

    /// Package count does not match the ceremony
    #[error("Incorrect number of packages")]
    IncorrectNumberOfPackages,

    /// Package is addressed to or from the wrong participant
    #[error("Incorrect package")]
    IncorrectPackage,

    /// DKG proof of knowledge failed
    #[error("Invalid proof of knowledge from {culprit:?}")]
    InvalidProofOfKnowledge {
        /// Identifier of the participant whose proof is invalid
        culprit: Identifier,
    },

    /// Coefficient commitment is invalid
    #[error("Invalid coefficient")]
    InvalidCoefficient,

    /// The ciphersuite does not support deriving identifiers from strings
    #[error("Identifier derivation is not supported")]
    IdentifierDerivationNotSupported,

    /// Encoding failed
    #[error("Serialization error")]
    SerializationError,

    /// Decoding failed
    #[error("Deserialization error")]
    DeserializationError,

    /// Header version or ciphersuite does not match
    #[error("Invalid header")]
    InvalidHeader,
}

impl FrostError {
    /// Identifier blamed for the failure, if any
    pub fn culprit(&self) -> Option<Identifier> {
        match self {
            FrostError::InvalidSignatureShare { culprit }
            | FrostError::InvalidSecretShare { culprit }
            | FrostError::InvalidProofOfKnowledge { culprit } => Some(*culprit),
            _ => None,
        }
    }
}

/// Result type for FROST operations
pub type FrostResult<T> = Result<T, FrostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_culprit() {
        let id = Identifier::try_from(3u16).unwrap();
        assert_eq!(
            FrostError::InvalidSignatureShare { culprit: id }.culprit(),
            Some(id)
        );
        assert_eq!(FrostError::InvalidSignature.culprit(), None);
    }
}
