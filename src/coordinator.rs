//! Coordinator side: signing packages, aggregation and verification

use crate::participant::{FrostSignatureShare, FrostSigningCommitments};
use crate::randomized::FrostRandomizer;
use crate::{FrostPublicKeyPackage, ParticipantIdentifier};
use frost_pallas_core::signing::{self, SigningPackage};
use frost_pallas_core::{randomized, FrostError as CoreError, Signature};
use log::{debug, warn};
use std::collections::BTreeMap;

pub use crate::error::{CoordinationError, VerificationError};

/// Message bytes to be signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub data: Vec<u8>,
}

/// Message plus the commitment set of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrostSigningPackage {
    pub data: Vec<u8>,
}

/// Aggregated 64-byte signature `R || z`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrostSignature {
    pub data: Vec<u8>,
}

/// Collect round-1 commitments into a signing package
///
/// Commitments are keyed by identifier, so the package bytes do not depend on
/// the order in which commitments arrived.
pub fn new_signing_package(
    message: &Message,
    commitments: Vec<FrostSigningCommitments>,
) -> Result<FrostSigningPackage, CoordinationError> {
    let mut signing_commitments = BTreeMap::new();

    for commitment in &commitments {
        let identifier = commitment
            .identifier
            .into_identifier()
            .map_err(|_| CoordinationError::IdentifierDeserializationError)?;
        let decoded = commitment
            .to_commitments()
            .map_err(|_| CoordinationError::InvalidSigningCommitment)?;

        if signing_commitments.insert(identifier, decoded).is_some() {
            warn!("duplicate commitment from {:?}", identifier);
            return Err(CoordinationError::InvalidSigningCommitment);
        }
    }

    if signing_commitments.len() < 2 {
        return Err(CoordinationError::FailedToCreateSigningPackage);
    }

    let package = SigningPackage::new(signing_commitments, &message.data);
    debug!(
        "signing package built from {} commitments",
        package.signing_commitments().len()
    );

    Ok(FrostSigningPackage {
        data: package
            .to_bytes()
            .map_err(|_| CoordinationError::SigningPackageSerializationError)?,
    })
}

/// Verify every share and combine them into the group signature
///
/// A share that cannot be decoded or fails its check is reported with its
/// signer as culprit, so the coordinator can drop that signer and retry.
pub fn aggregate(
    signing_package: &FrostSigningPackage,
    signature_shares: Vec<FrostSignatureShare>,
    pubkeys: &FrostPublicKeyPackage,
    randomizer: Option<&FrostRandomizer>,
) -> Result<FrostSignature, CoordinationError> {
    let signing_package = SigningPackage::from_bytes(&signing_package.data)
        .map_err(|_| CoordinationError::SigningPackageSerializationError)?;

    let public_key_package = pubkeys
        .into_public_key_package()
        .map_err(|_| CoordinationError::PublicKeyPackageDeserializationError)?;

    let mut shares = BTreeMap::new();
    for share in &signature_shares {
        let identifier = share
            .identifier
            .into_identifier()
            .map_err(|_| CoordinationError::IdentifierDeserializationError)?;
        let decoded =
            share
                .to_signature_share()
                .map_err(|_| CoordinationError::InvalidSignatureShare {
                    culprit: share.identifier.clone(),
                })?;

        if shares.insert(identifier, decoded).is_some() {
            return Err(CoordinationError::SignatureShareAggregationFailed {
                message: CoreError::DuplicatedShares.to_string(),
            });
        }
    }

    let signature = match randomizer {
        Some(randomizer) => {
            let randomizer = randomizer
                .into_randomizer()
                .map_err(|_| CoordinationError::InvalidRandomizer)?;
            randomized::aggregate(&signing_package, &shares, &public_key_package, &randomizer)
        }
        None => signing::aggregate(&signing_package, &shares, &public_key_package),
    }
    .map_err(|error| match error {
        CoreError::InvalidSignatureShare { culprit } => CoordinationError::InvalidSignatureShare {
            culprit: ParticipantIdentifier::from(culprit),
        },
        other => CoordinationError::SignatureShareAggregationFailed {
            message: other.to_string(),
        },
    })?;

    Ok(FrostSignature {
        data: signature.to_bytes().to_vec(),
    })
}

/// Check a signature against the group key
pub fn verify_signature(
    message: &Message,
    signature: &FrostSignature,
    pubkey: &FrostPublicKeyPackage,
) -> Result<(), VerificationError> {
    let public_key_package = pubkey
        .into_public_key_package()
        .map_err(|_| VerificationError::InvalidPublicKeyPackage)?;
    let signature = decode_signature(signature)?;

    public_key_package
        .verifying_key()
        .verify(&message.data, &signature)
        .map_err(|error| VerificationError::ValidationFailed {
            reason: error.to_string(),
        })
}

/// Check a signature against the group key shifted by `randomizer`
pub fn verify_randomized_signature(
    randomizer: &FrostRandomizer,
    message: &Message,
    signature: &FrostSignature,
    pubkey: &FrostPublicKeyPackage,
) -> Result<(), VerificationError> {
    let public_key_package = pubkey
        .into_public_key_package()
        .map_err(|_| VerificationError::InvalidPublicKeyPackage)?;
    let randomizer =
        randomizer
            .into_randomizer()
            .map_err(|error| VerificationError::ValidationFailed {
                reason: error.to_string(),
            })?;
    let signature = decode_signature(signature)?;

    randomized::verify(
        public_key_package.verifying_key(),
        &randomizer,
        &message.data,
        &signature,
    )
    .map_err(|error| VerificationError::ValidationFailed {
        reason: error.to_string(),
    })
}

fn decode_signature(signature: &FrostSignature) -> Result<Signature, VerificationError> {
    Signature::from_bytes(&signature.data).map_err(|error| VerificationError::ValidationFailed {
        reason: error.to_string(),
    })
}
