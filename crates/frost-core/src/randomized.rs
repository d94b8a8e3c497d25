//! Re-randomized FROST
//!
//! A session randomizer α shifts the group key to `vk + [α]G` so the final
//! signature cannot be linked to the long-lived key. Every signer shifts its
//! share by α; Lagrange weights sum to one, so the aggregate shifts by
//! exactly α as well.

use crate::ciphersuite::{self, generator, Element, Scalar};
use crate::encoding::impl_serde_via_bytes;
use crate::keys::{KeyPackage, PublicKeyPackage};
use crate::signing::{self, SignatureShare, SigningNonces, SigningPackage};
use crate::types::*;
use crate::FrostResult;
use log::debug;
use std::collections::BTreeMap;
use std::fmt;

/// Session randomizer α
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Randomizer(Scalar);

impl Randomizer {
    /// Wrap a scalar
    pub fn new(scalar: Scalar) -> Self {
        Randomizer(scalar)
    }

    /// Derive α = H(vk || signing_package), identical for every signer
    pub fn derive(verifying_key: &VerifyingKey, package: &SigningPackage) -> FrostResult<Self> {
        let mut preimage = verifying_key.to_bytes().to_vec();
        preimage.extend_from_slice(&package.to_bytes()?);
        Ok(Randomizer(ciphersuite::hrandomizer(&preimage)))
    }

    /// Underlying scalar
    pub fn to_scalar(&self) -> Scalar {
        self.0
    }

    /// 32-byte little-endian encoding
    pub fn to_bytes(&self) -> [u8; 32] {
        ciphersuite::serialize_scalar(&self.0)
    }

    /// Decode a canonical scalar
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        ciphersuite::deserialize_scalar(bytes).map(Randomizer)
    }

    fn element(&self) -> Element {
        generator() * self.0
    }
}

impl fmt::Debug for Randomizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Randomizer")
            .field(&hex::encode(self.to_bytes()))
            .finish()
    }
}

impl_serde_via_bytes!(Randomizer);

/// Randomizer together with the randomized group key it induces
#[derive(Debug)]
pub struct RandomizedParams {
    randomizer: Randomizer,
    randomized_verifying_key: VerifyingKey,
}

impl RandomizedParams {
    /// Derive the session randomizer from the group key and signing package
    pub fn new(verifying_key: &VerifyingKey, package: &SigningPackage) -> FrostResult<Self> {
        let randomizer = Randomizer::derive(verifying_key, package)?;
        Ok(Self::from_randomizer(verifying_key, randomizer))
    }

    /// Rebuild the parameters from a randomizer received out of band
    pub fn from_randomizer(verifying_key: &VerifyingKey, randomizer: Randomizer) -> Self {
        let randomized_verifying_key =
            VerifyingKey::new(verifying_key.to_element() + randomizer.element());
        RandomizedParams {
            randomizer,
            randomized_verifying_key,
        }
    }

    /// Session randomizer α
    pub fn randomizer(&self) -> &Randomizer {
        &self.randomizer
    }

    /// Randomized group key vk + [α]G
    pub fn randomized_verifying_key(&self) -> &VerifyingKey {
        &self.randomized_verifying_key
    }
}

fn randomize_key_package(key_package: &KeyPackage, randomizer: &Randomizer) -> KeyPackage {
    let offset = randomizer.element();
    KeyPackage::new(
        key_package.identifier,
        SigningShare::new(key_package.signing_share.to_scalar() + randomizer.to_scalar()),
        VerifyingShare::new(key_package.verifying_share.to_element() + offset),
        VerifyingKey::new(key_package.verifying_key.to_element() + offset),
        key_package.min_signers,
    )
}

fn randomize_public_key_package(
    public_key_package: &PublicKeyPackage,
    randomizer: &Randomizer,
) -> PublicKeyPackage {
    let offset = randomizer.element();
    let verifying_shares = public_key_package
        .verifying_shares
        .iter()
        .map(|(id, share)| (*id, VerifyingShare::new(share.to_element() + offset)))
        .collect();
    PublicKeyPackage::new(
        verifying_shares,
        VerifyingKey::new(public_key_package.verifying_key.to_element() + offset),
    )
}

/// Round 2 under the randomized key
pub fn sign(
    package: &SigningPackage,
    nonces: SigningNonces,
    key_package: &KeyPackage,
    randomizer: &Randomizer,
) -> FrostResult<SignatureShare> {
    let randomized = randomize_key_package(key_package, randomizer);
    signing::sign(package, nonces, &randomized)
}

/// Aggregate shares produced under the randomized key
pub fn aggregate(
    package: &SigningPackage,
    signature_shares: &BTreeMap<Identifier, SignatureShare>,
    public_key_package: &PublicKeyPackage,
    randomizer: &Randomizer,
) -> FrostResult<Signature> {
    let randomized = randomize_public_key_package(public_key_package, randomizer);
    debug!("aggregating under a randomized group key");
    signing::aggregate(package, signature_shares, &randomized)
}

/// Verify a signature against `vk + [α]G`
pub fn verify(
    verifying_key: &VerifyingKey,
    randomizer: &Randomizer,
    message: &[u8],
    signature: &Signature,
) -> FrostResult<()> {
    RandomizedParams::from_randomizer(verifying_key, *randomizer)
        .randomized_verifying_key()
        .verify(message, signature)
}
