//! Key material and trusted dealer key generation
//!
//! A dealer samples (or receives) the group secret, shares it with a random
//! polynomial of degree `min_signers - 1` and publishes the polynomial's
//! Feldman commitment alongside every share so that each participant can
//! check its share before turning it into a [`KeyPackage`].

use crate::ciphersuite::{deserialize_scalar, generator, random_nonzero, serialize_scalar};
use crate::encoding::{from_bincode, to_bincode};
use crate::types::*;
use crate::{FrostError, FrostResult};
use ff::Field;
use log::{debug, warn};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The group secret held by a trusted dealer
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SigningKey {
    scalar: SecretScalar,
}

impl SigningKey {
    /// Sample a fresh nonzero signing key
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        SigningKey {
            scalar: SecretScalar::new(random_nonzero(rng)),
        }
    }

    /// Decode a canonical nonzero scalar
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        let scalar = deserialize_scalar(bytes).map_err(|_| FrostError::MalformedSigningKey)?;
        if bool::from(scalar.is_zero()) {
            return Err(FrostError::MalformedSigningKey);
        }
        Ok(SigningKey {
            scalar: SecretScalar::new(scalar),
        })
    }

    /// 32-byte little-endian encoding
    pub fn to_bytes(&self) -> [u8; 32] {
        serialize_scalar(self.scalar.as_scalar())
    }

    /// Group verifying key [s]G
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey::new(generator() * self.scalar.as_scalar())
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// How the dealer assigns identifiers to shares
#[derive(Debug, Clone, Copy)]
pub enum IdentifierList<'a> {
    /// Identifiers 1..=max_signers
    Default,
    /// Caller-supplied, distinct identifiers (exactly max_signers of them)
    Custom(&'a [Identifier]),
}

impl IdentifierList<'_> {
    fn resolve(&self, max_signers: u16) -> FrostResult<Vec<Identifier>> {
        match self {
            IdentifierList::Default => (1..=max_signers).map(Identifier::try_from).collect(),
            IdentifierList::Custom(identifiers) => {
                if identifiers.len() != usize::from(max_signers) {
                    return Err(FrostError::IncorrectNumberOfIdentifiers);
                }
                let unique: BTreeSet<_> = identifiers.iter().collect();
                if unique.len() != identifiers.len() {
                    return Err(FrostError::DuplicatedIdentifier);
                }
                Ok(identifiers.to_vec())
            }
        }
    }
}

/// Check `2 <= min_signers <= max_signers`
pub fn validate_num_of_signers(min_signers: u16, max_signers: u16) -> FrostResult<()> {
    if min_signers < 2 {
        return Err(FrostError::InvalidMinSigners);
    }
    if max_signers < 2 {
        return Err(FrostError::InvalidMaxSigners);
    }
    if min_signers > max_signers {
        return Err(FrostError::InvalidMinSigners);
    }
    Ok(())
}

/// A share produced by the dealer, together with the dealer's VSS commitment
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretShare {
    pub(crate) header: Header,
    pub(crate) identifier: Identifier,
    pub(crate) signing_share: SigningShare,
    pub(crate) commitment: VerifiableSecretSharingCommitment,
}

impl SecretShare {
    /// Assemble a share
    pub fn new(
        identifier: Identifier,
        signing_share: SigningShare,
        commitment: VerifiableSecretSharingCommitment,
    ) -> Self {
        SecretShare {
            header: Header,
            identifier,
            signing_share,
            commitment,
        }
    }

    /// Owner of the share
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// The dealer's commitment to the sharing polynomial
    pub fn commitment(&self) -> &VerifiableSecretSharingCommitment {
        &self.commitment
    }

    /// Check `[s_i]G == Σ φ_k · id^k`, returning the public material on success
    pub fn verify(&self) -> FrostResult<(VerifyingShare, VerifyingKey)> {
        let verifying_share = self.signing_share.verifying_share();
        if verifying_share.to_element() != self.commitment.evaluate(&self.identifier) {
            warn!("secret share from {:?} does not match its commitment", self.identifier);
            return Err(FrostError::InvalidSecretShare {
                culprit: self.identifier,
            });
        }
        Ok((verifying_share, self.commitment.verifying_key()?))
    }

    /// Binary encoding
    pub fn to_bytes(&self) -> FrostResult<Vec<u8>> {
        to_bincode(self)
    }

    /// Decode a binary encoding
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        from_bincode(bytes)
    }
}

impl fmt::Debug for SecretShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretShare")
            .field("identifier", &self.identifier)
            .field("signing_share", &self.signing_share)
            .field("commitment", &self.commitment)
            .finish()
    }
}

/// A verified signing credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPackage {
    pub(crate) header: Header,
    pub(crate) identifier: Identifier,
    pub(crate) signing_share: SigningShare,
    pub(crate) verifying_share: VerifyingShare,
    pub(crate) verifying_key: VerifyingKey,
    pub(crate) min_signers: u16,
}

impl KeyPackage {
    /// Assemble a key package from already verified parts
    pub fn new(
        identifier: Identifier,
        signing_share: SigningShare,
        verifying_share: VerifyingShare,
        verifying_key: VerifyingKey,
        min_signers: u16,
    ) -> Self {
        KeyPackage {
            header: Header,
            identifier,
            signing_share,
            verifying_share,
            verifying_key,
            min_signers,
        }
    }

    /// Owner of the package
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Secret signing share s_i
    pub fn signing_share(&self) -> &SigningShare {
        &self.signing_share
    }

    /// Public verifying share Y_i
    pub fn verifying_share(&self) -> &VerifyingShare {
        &self.verifying_share
    }

    /// Group verifying key
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Threshold t
    pub fn min_signers(&self) -> u16 {
        self.min_signers
    }

    /// Binary encoding
    pub fn to_bytes(&self) -> FrostResult<Vec<u8>> {
        to_bincode(self)
    }

    /// Decode a binary encoding
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        from_bincode(bytes)
    }
}

impl TryFrom<SecretShare> for KeyPackage {
    type Error = FrostError;

    fn try_from(share: SecretShare) -> Result<Self, Self::Error> {
        let (verifying_share, verifying_key) = share.verify()?;
        let min_signers = u16::try_from(share.commitment.min_signers())
            .map_err(|_| FrostError::InvalidCoefficients)?;
        Ok(KeyPackage::new(
            share.identifier,
            share.signing_share,
            verifying_share,
            verifying_key,
            min_signers,
        ))
    }
}

/// Group-wide public material: every verifying share plus the group key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyPackage {
    pub(crate) header: Header,
    pub(crate) verifying_shares: BTreeMap<Identifier, VerifyingShare>,
    pub(crate) verifying_key: VerifyingKey,
}

impl PublicKeyPackage {
    /// Assemble from parts
    pub fn new(
        verifying_shares: BTreeMap<Identifier, VerifyingShare>,
        verifying_key: VerifyingKey,
    ) -> Self {
        PublicKeyPackage {
            header: Header,
            verifying_shares,
            verifying_key,
        }
    }

    /// Derive every participant's verifying share from a group commitment
    pub fn from_commitment(
        identifiers: &BTreeSet<Identifier>,
        commitment: &VerifiableSecretSharingCommitment,
    ) -> FrostResult<Self> {
        let verifying_shares = identifiers
            .iter()
            .map(|id| (*id, VerifyingShare::new(commitment.evaluate(id))))
            .collect();
        Ok(PublicKeyPackage::new(
            verifying_shares,
            commitment.verifying_key()?,
        ))
    }

    /// Verifying share per participant
    pub fn verifying_shares(&self) -> &BTreeMap<Identifier, VerifyingShare> {
        &self.verifying_shares
    }

    /// Group verifying key
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Binary encoding
    pub fn to_bytes(&self) -> FrostResult<Vec<u8>> {
        to_bincode(self)
    }

    /// Decode a binary encoding
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        from_bincode(bytes)
    }
}

/// Generate a fresh group key and split it among `max_signers` participants
pub fn generate_with_dealer<R: RngCore + CryptoRng>(
    max_signers: u16,
    min_signers: u16,
    identifiers: IdentifierList,
    rng: &mut R,
) -> FrostResult<(BTreeMap<Identifier, SecretShare>, PublicKeyPackage)> {
    let key = SigningKey::new(rng);
    split(&key, max_signers, min_signers, identifiers, rng)
}

/// Split an existing group key among `max_signers` participants
///
/// Orchard requires the group key to have an even y coordinate. When `key`
/// does not, its negation is shared instead, so the resulting verifying key
/// is `-[s]G`.
pub fn split<R: RngCore + CryptoRng>(
    key: &SigningKey,
    max_signers: u16,
    min_signers: u16,
    identifiers: IdentifierList,
    rng: &mut R,
) -> FrostResult<(BTreeMap<Identifier, SecretShare>, PublicKeyPackage)> {
    validate_num_of_signers(min_signers, max_signers)?;
    let identifiers = identifiers.resolve(max_signers)?;

    let secret = if key.verifying_key().has_even_y() {
        *key.scalar.as_scalar()
    } else {
        debug!("negating dealer secret for an even-y group key");
        -*key.scalar.as_scalar()
    };

    let polynomial = Polynomial::random(min_signers, secret, rng);
    let commitment = polynomial.commitment();

    let mut shares = BTreeMap::new();
    let mut verifying_shares = BTreeMap::new();
    for identifier in identifiers {
        let signing_share = SigningShare::new(polynomial.evaluate(&identifier.to_scalar()));
        verifying_shares.insert(identifier, signing_share.verifying_share());
        shares.insert(
            identifier,
            SecretShare::new(identifier, signing_share, commitment.clone()),
        );
    }

    let public_key_package = PublicKeyPackage::new(verifying_shares, commitment.verifying_key()?);
    debug!(
        "dealer produced {} shares with threshold {}",
        shares.len(),
        min_signers
    );
    Ok((shares, public_key_package))
}
