//! JSON codecs for the SDK records
//!
//! The JSON text is the serde representation of the underlying core type
//! (header first, hex-encoded keys and scalars), so it round-trips exactly.

use crate::participant::{FrostSignatureShare, FrostSigningCommitments};
use crate::randomized::FrostRandomizer;
use crate::{
    FrostError, FrostKeyPackage, FrostPublicKeyPackage, FrostSecretKeyShare,
    ParticipantIdentifier,
};
use frost_pallas_core::keys::{KeyPackage, PublicKeyPackage, SecretShare};
use frost_pallas_core::{Randomizer, SignatureShare, SigningCommitments};
use serde::{de::DeserializeOwned, Serialize};

fn to_json<T: Serialize>(value: &T) -> Result<String, FrostError> {
    serde_json::to_string(value).map_err(|_| FrostError::SerializationError)
}

fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, FrostError> {
    serde_json::from_str(json).map_err(|_| FrostError::DeserializationError)
}

pub fn key_package_to_json(key_package: &FrostKeyPackage) -> Result<String, FrostError> {
    to_json(&key_package.into_key_package()?)
}

pub fn json_to_key_package(key_package_json: &str) -> Result<FrostKeyPackage, FrostError> {
    let key_package: KeyPackage = from_json(key_package_json)?;
    Ok(FrostKeyPackage::from_key_package(&key_package)?)
}

pub fn secret_share_to_json(secret_share: &FrostSecretKeyShare) -> Result<String, FrostError> {
    to_json(&secret_share.to_secret_share()?)
}

pub fn json_to_secret_share(secret_share_json: &str) -> Result<FrostSecretKeyShare, FrostError> {
    let secret_share: SecretShare = from_json(secret_share_json)?;
    Ok(FrostSecretKeyShare::from_secret_share(&secret_share)?)
}

/// Decode commitments received from `identifier`
///
/// The identifier travels outside the JSON; it is not part of the
/// commitment encoding.
pub fn json_to_commitment(
    commitment_json: &str,
    identifier: &ParticipantIdentifier,
) -> Result<FrostSigningCommitments, FrostError> {
    let identifier = identifier.into_identifier()?;
    let commitments: SigningCommitments = from_json(commitment_json)?;
    Ok(FrostSigningCommitments::with_identifier_and_commitments(
        identifier,
        commitments,
    )?)
}

/// Encode commitments; the identifier is dropped
pub fn commitment_to_json(commitment: &FrostSigningCommitments) -> Result<String, FrostError> {
    to_json(&commitment.to_commitments()?)
}

pub fn randomizer_to_json(randomizer: &FrostRandomizer) -> Result<String, FrostError> {
    to_json(&randomizer.into_randomizer()?)
}

pub fn json_to_randomizer(randomizer_json: &str) -> Result<FrostRandomizer, FrostError> {
    let randomizer: Randomizer = from_json(randomizer_json)?;
    Ok(FrostRandomizer::from_randomizer(&randomizer))
}

pub fn public_key_package_to_json(
    public_key_package: &FrostPublicKeyPackage,
) -> Result<String, FrostError> {
    to_json(&public_key_package.into_public_key_package()?)
}

pub fn json_to_public_key_package(
    public_key_package_json: &str,
) -> Result<FrostPublicKeyPackage, FrostError> {
    let public_key_package: PublicKeyPackage = from_json(public_key_package_json)?;
    Ok(FrostPublicKeyPackage::from_public_key_package(
        &public_key_package,
    ))
}

pub fn signature_share_package_to_json(
    signature_share: &FrostSignatureShare,
) -> Result<String, FrostError> {
    to_json(&signature_share.to_signature_share()?)
}

pub fn json_to_signature_share(
    signature_share_json: &str,
    identifier: &ParticipantIdentifier,
) -> Result<FrostSignatureShare, FrostError> {
    let identifier = identifier.into_identifier()?;
    let signature_share: SignatureShare = from_json(signature_share_json)?;
    Ok(FrostSignatureShare::from_signature_share(
        identifier,
        signature_share,
    )?)
}
