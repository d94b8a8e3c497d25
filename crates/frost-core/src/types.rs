//! Core types for FROST protocol

use crate::ciphersuite::{
    self, deserialize_element, deserialize_scalar, generator, serialize_element, serialize_scalar,
    Element, Scalar,
};
use crate::encoding::impl_serde_via_bytes;
use crate::{FrostError, FrostResult};
use ff::Field;
use group::Group;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use crate::encoding::Header;

/// Participant identifier, a nonzero scalar
///
/// Identifiers are ordered by their numeric value, which fixes the order of
/// commitment lists inside a signing package.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Identifier(Scalar);

impl Identifier {
    /// Create an identifier from a scalar, rejecting zero
    pub fn new(scalar: Scalar) -> FrostResult<Self> {
        if bool::from(scalar.is_zero()) {
            Err(FrostError::MalformedIdentifier)
        } else {
            Ok(Identifier(scalar))
        }
    }

    /// Derive an identifier by hashing arbitrary bytes (e.g. a user name)
    pub fn derive(s: &[u8]) -> FrostResult<Self> {
        Self::new(ciphersuite::hid(s))
    }

    /// Underlying scalar, used as the polynomial evaluation point
    pub fn to_scalar(&self) -> Scalar {
        self.0
    }

    /// 32-byte little-endian encoding
    pub fn to_bytes(&self) -> [u8; 32] {
        serialize_scalar(&self.0)
    }

    /// Decode a canonical nonzero scalar
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        let scalar = deserialize_scalar(bytes).map_err(|_| FrostError::MalformedIdentifier)?;
        Self::new(scalar)
    }
}

impl TryFrom<u16> for Identifier {
    type Error = FrostError;

    fn try_from(n: u16) -> Result<Self, Self::Error> {
        Self::new(Scalar::from(u64::from(n)))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        // little-endian encoding, most significant byte last
        let a = self.to_bytes();
        let b = other.to_bytes();
        a.iter().rev().cmp(b.iter().rev())
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identifier")
            .field(&hex::encode(self.to_bytes()))
            .finish()
    }
}

impl_serde_via_bytes!(Identifier);

/// Secret scalar value (auto-zeroized on drop)
#[derive(Clone)]
pub struct SecretScalar(pub(crate) Scalar);

impl SecretScalar {
    /// Create from a Scalar
    pub fn new(scalar: Scalar) -> Self {
        SecretScalar(scalar)
    }

    /// Get reference to inner scalar (use carefully)
    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }
}

impl Zeroize for SecretScalar {
    fn zeroize(&mut self) {
        self.0 = Scalar::ZERO;
    }
}

impl Drop for SecretScalar {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for SecretScalar {}

impl PartialEq for SecretScalar {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretScalar {}

/// Polynomial of degree t-1 for secret sharing
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Polynomial {
    /// Coefficients [a0, a1, ..., a_{t-1}]
    pub(crate) coefficients: Vec<SecretScalar>,
}

impl Polynomial {
    /// Create a new polynomial with given coefficients
    pub fn new(coefficients: Vec<Scalar>) -> Self {
        Polynomial {
            coefficients: coefficients.into_iter().map(SecretScalar::new).collect(),
        }
    }

    /// Generate random polynomial with `min_signers` coefficients and the given constant term
    pub fn random<R: rand_core::RngCore + rand_core::CryptoRng>(
        min_signers: u16,
        constant_term: Scalar,
        rng: &mut R,
    ) -> Self {
        let mut coefficients = vec![SecretScalar::new(constant_term)];
        for _ in 1..min_signers {
            coefficients.push(SecretScalar::new(Scalar::random(&mut *rng)));
        }
        Polynomial { coefficients }
    }

    /// Evaluate polynomial at given x using Horner's method
    pub fn evaluate(&self, x: &Scalar) -> Scalar {
        self.coefficients
            .iter()
            .rev()
            .fold(Scalar::ZERO, |acc, coeff| acc * x + coeff.as_scalar())
    }

    /// Get degree of polynomial
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Constant term a0
    pub(crate) fn constant_term(&self) -> Scalar {
        self.coefficients
            .first()
            .map(|c| *c.as_scalar())
            .unwrap_or(Scalar::ZERO)
    }

    /// Feldman commitment [a_k]G to each coefficient
    pub fn commitment(&self) -> VerifiableSecretSharingCommitment {
        VerifiableSecretSharingCommitment(
            self.coefficients
                .iter()
                .map(|a| CoefficientCommitment(generator() * a.as_scalar()))
                .collect(),
        )
    }
}

/// Commitment [a_k]G to one polynomial coefficient
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CoefficientCommitment(pub(crate) Element);

impl CoefficientCommitment {
    /// Wrap a group element
    pub fn new(element: Element) -> Self {
        CoefficientCommitment(element)
    }

    /// Underlying group element
    pub fn value(&self) -> Element {
        self.0
    }

    /// Compressed 32-byte encoding
    pub fn to_bytes(&self) -> [u8; 32] {
        serialize_element(&self.0)
    }

    /// Decode a non-identity group element
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        deserialize_element(bytes).map(CoefficientCommitment)
    }
}

impl fmt::Debug for CoefficientCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CoefficientCommitment")
            .field(&hex::encode(self.to_bytes()))
            .finish()
    }
}

impl_serde_via_bytes!(CoefficientCommitment);

/// Feldman VSS commitment: one coefficient commitment per polynomial term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerifiableSecretSharingCommitment(pub(crate) Vec<CoefficientCommitment>);

impl VerifiableSecretSharingCommitment {
    /// Build from explicit coefficient commitments
    pub fn new(coefficients: Vec<CoefficientCommitment>) -> Self {
        VerifiableSecretSharingCommitment(coefficients)
    }

    /// Coefficient commitments φ_0 ... φ_{t-1}
    pub fn coefficients(&self) -> &[CoefficientCommitment] {
        &self.0
    }

    /// Number of signers required, equal to the number of coefficients
    pub fn min_signers(&self) -> usize {
        self.0.len()
    }

    /// Public image of the share for `identifier`: Σ φ_k · x^k
    pub fn evaluate(&self, identifier: &Identifier) -> Element {
        let x = identifier.to_scalar();
        self.0
            .iter()
            .rev()
            .fold(Element::identity(), |acc, phi| acc * x + phi.0)
    }

    /// Group verifying key φ_0
    pub fn verifying_key(&self) -> FrostResult<VerifyingKey> {
        self.0
            .first()
            .map(|phi| VerifyingKey(phi.0))
            .ok_or(FrostError::IncorrectNumberOfCommitments)
    }

    /// Coefficient-wise sum of several commitments of equal length
    pub fn sum<'a, I>(commitments: I) -> FrostResult<Self>
    where
        I: IntoIterator<Item = &'a VerifiableSecretSharingCommitment>,
    {
        let mut iter = commitments.into_iter();
        let first = iter.next().ok_or(FrostError::IncorrectNumberOfCommitments)?;
        let mut acc: Vec<Element> = first.0.iter().map(|phi| phi.0).collect();
        for commitment in iter {
            if commitment.0.len() != acc.len() {
                return Err(FrostError::IncorrectNumberOfCommitments);
            }
            for (total, phi) in acc.iter_mut().zip(commitment.0.iter()) {
                *total += phi.0;
            }
        }
        Ok(VerifiableSecretSharingCommitment(
            acc.into_iter().map(CoefficientCommitment).collect(),
        ))
    }

    pub(crate) fn negate(&self) -> Self {
        VerifiableSecretSharingCommitment(
            self.0.iter().map(|phi| CoefficientCommitment(-phi.0)).collect(),
        )
    }
}

/// A participant's long-lived secret signing share s_i
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SigningShare(SecretScalar);

impl SigningShare {
    /// Wrap a scalar
    pub fn new(scalar: Scalar) -> Self {
        SigningShare(SecretScalar::new(scalar))
    }

    /// Underlying scalar
    pub fn to_scalar(&self) -> Scalar {
        *self.0.as_scalar()
    }

    /// 32-byte little-endian encoding
    pub fn to_bytes(&self) -> [u8; 32] {
        serialize_scalar(self.0.as_scalar())
    }

    /// Decode a canonical scalar
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        deserialize_scalar(bytes)
            .map(SigningShare::new)
            .map_err(|_| FrostError::MalformedSigningKey)
    }

    /// Matching public verifying share [s_i]G
    pub fn verifying_share(&self) -> VerifyingShare {
        VerifyingShare(generator() * self.0.as_scalar())
    }

    pub(crate) fn negate(&self) -> Self {
        SigningShare::new(-self.to_scalar())
    }
}

impl fmt::Debug for SigningShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningShare(<redacted>)")
    }
}

impl_serde_via_bytes!(SigningShare);

/// Public image [s_i]G of a participant's signing share
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VerifyingShare(pub(crate) Element);

impl VerifyingShare {
    /// Wrap a group element
    pub fn new(element: Element) -> Self {
        VerifyingShare(element)
    }

    /// Underlying group element
    pub fn to_element(&self) -> Element {
        self.0
    }

    /// Compressed 32-byte encoding
    pub fn to_bytes(&self) -> [u8; 32] {
        serialize_element(&self.0)
    }

    /// Decode a non-identity group element
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        deserialize_element(bytes).map(VerifyingShare)
    }

    pub(crate) fn negate(&self) -> Self {
        VerifyingShare(-self.0)
    }
}

impl fmt::Debug for VerifyingShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VerifyingShare")
            .field(&hex::encode(self.to_bytes()))
            .finish()
    }
}

impl_serde_via_bytes!(VerifyingShare);

/// Group verifying key, also usable as an Orchard `ak`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VerifyingKey(pub(crate) Element);

impl VerifyingKey {
    /// Wrap a group element
    pub fn new(element: Element) -> Self {
        VerifyingKey(element)
    }

    /// Underlying group element
    pub fn to_element(&self) -> Element {
        self.0
    }

    /// Compressed 32-byte encoding
    pub fn to_bytes(&self) -> [u8; 32] {
        serialize_element(&self.0)
    }

    /// Decode a non-identity group element
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        deserialize_element(bytes)
            .map(VerifyingKey)
            .map_err(|_| FrostError::MalformedVerifyingKey)
    }

    /// Whether the encoding has a clear sign bit, as Orchard requires of `ak`
    pub fn has_even_y(&self) -> bool {
        ciphersuite::has_even_y(&self.0)
    }

    /// Verify a Schnorr signature over `message`
    pub fn verify(&self, message: &[u8], signature: &Signature) -> FrostResult<()> {
        let c = challenge(&signature.r, self, message);
        // [z]G == R + [c]vk
        if generator() * signature.z == signature.r + self.0 * c {
            Ok(())
        } else {
            Err(FrostError::InvalidSignature)
        }
    }

    pub(crate) fn negate(&self) -> Self {
        VerifyingKey(-self.0)
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VerifyingKey")
            .field(&hex::encode(self.to_bytes()))
            .finish()
    }
}

impl_serde_via_bytes!(VerifyingKey);

/// Signature challenge c = H*(R || vk || m)
pub(crate) fn challenge(r: &Element, verifying_key: &VerifyingKey, message: &[u8]) -> Scalar {
    let mut preimage = Vec::with_capacity(64 + message.len());
    preimage.extend_from_slice(&serialize_element(r));
    preimage.extend_from_slice(&verifying_key.to_bytes());
    preimage.extend_from_slice(message);
    ciphersuite::h2(&preimage)
}

/// Schnorr signature (R, z), encoded as R || z
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Group commitment R
    pub(crate) r: Element,
    /// Response z
    pub(crate) z: Scalar,
}

impl Signature {
    /// Assemble from commitment and response
    pub fn new(r: Element, z: Scalar) -> Self {
        Signature { r, z }
    }

    /// Group commitment R
    pub fn r(&self) -> Element {
        self.r
    }

    /// Response z
    pub fn z(&self) -> Scalar {
        self.z
    }

    /// 64-byte encoding R || z
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&serialize_element(&self.r));
        bytes[32..].copy_from_slice(&serialize_scalar(&self.z));
        bytes
    }

    /// Decode a 64-byte R || z encoding
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        if bytes.len() != 64 {
            return Err(FrostError::MalformedSignature);
        }
        let r = deserialize_element(&bytes[..32]).map_err(|_| FrostError::MalformedSignature)?;
        let z = deserialize_scalar(&bytes[32..]).map_err(|_| FrostError::MalformedSignature)?;
        Ok(Signature { r, z })
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature")
            .field(&hex::encode(self.to_bytes()))
            .finish()
    }
}

impl_serde_via_bytes!(Signature);
