//! FROST Two-Round Signing Protocol
//!
//! Round 1: Each signer commits to a pair of nonces
//! Round 2: Each signer computes its signature share over the signing package
//! Aggregation: Coordinator checks every share and combines them into a signature

use crate::ciphersuite::{self, deserialize_element, generator, serialize_element, Element, Scalar};
use crate::encoding::{from_bincode, hex_vec, impl_serde_via_bytes, to_bincode};
use crate::keys::{KeyPackage, PublicKeyPackage};
use crate::types::*;
use crate::{FrostError, FrostResult};
use ff::Field;
use group::Group;
use log::{debug, warn};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// One secret nonce, derived from fresh randomness and the signer's share
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Nonce(SecretScalar);

impl Nonce {
    /// Sample a nonce as H3(random_bytes || signing_share)
    pub fn new<R: RngCore + CryptoRng>(secret: &SigningShare, rng: &mut R) -> Self {
        let mut preimage = [0u8; 64];
        rng.fill_bytes(&mut preimage[..32]);
        preimage[32..].copy_from_slice(&secret.to_bytes());
        let nonce = ciphersuite::h3(&preimage);
        preimage.zeroize();
        Nonce(SecretScalar::new(nonce))
    }

    fn to_scalar(&self) -> Scalar {
        *self.0.as_scalar()
    }

    fn to_bytes(&self) -> [u8; 32] {
        ciphersuite::serialize_scalar(self.0.as_scalar())
    }

    fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        ciphersuite::deserialize_scalar(bytes).map(|s| Nonce(SecretScalar::new(s)))
    }
}

impl_serde_via_bytes!(Nonce);

/// Public commitment [d]G or [e]G to a nonce
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NonceCommitment(Element);

impl NonceCommitment {
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
        deserialize_element(bytes).map(NonceCommitment)
    }
}

impl From<&Nonce> for NonceCommitment {
    fn from(nonce: &Nonce) -> Self {
        NonceCommitment(generator() * nonce.to_scalar())
    }
}

impl fmt::Debug for NonceCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NonceCommitment")
            .field(&hex::encode(self.to_bytes()))
            .finish()
    }
}

impl_serde_via_bytes!(NonceCommitment);

/// Commitments published in round 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningCommitments {
    pub(crate) header: Header,
    /// Hiding commitment D_i
    pub(crate) hiding: NonceCommitment,
    /// Binding commitment E_i
    pub(crate) binding: NonceCommitment,
}

impl SigningCommitments {
    /// Assemble from the two nonce commitments
    pub fn new(hiding: NonceCommitment, binding: NonceCommitment) -> Self {
        SigningCommitments {
            header: Header,
            hiding,
            binding,
        }
    }

    /// Hiding commitment D_i
    pub fn hiding(&self) -> &NonceCommitment {
        &self.hiding
    }

    /// Binding commitment E_i
    pub fn binding(&self) -> &NonceCommitment {
        &self.binding
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

/// Secret state kept by a signer between round 1 and round 2
///
/// Not `Clone`: [`sign`] consumes it so a nonce pair can sign only once.
#[derive(Serialize, Deserialize)]
pub struct SigningNonces {
    header: Header,
    hiding: Nonce,
    binding: Nonce,
    commitments: SigningCommitments,
}

impl SigningNonces {
    /// Sample a fresh nonce pair bound to `secret`
    pub fn new<R: RngCore + CryptoRng>(secret: &SigningShare, rng: &mut R) -> Self {
        let hiding = Nonce::new(secret, rng);
        let binding = Nonce::new(secret, rng);
        let commitments = SigningCommitments::new((&hiding).into(), (&binding).into());
        SigningNonces {
            header: Header,
            hiding,
            binding,
            commitments,
        }
    }

    /// Commitments matching these nonces
    pub fn commitments(&self) -> &SigningCommitments {
        &self.commitments
    }

    /// Binary encoding
    pub fn to_bytes(&self) -> FrostResult<Vec<u8>> {
        to_bincode(self)
    }

    /// Decode a binary encoding, checking the nonces against their commitments
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        let nonces: SigningNonces = from_bincode(bytes)?;
        let expected = SigningCommitments::new((&nonces.hiding).into(), (&nonces.binding).into());
        if expected != nonces.commitments {
            return Err(FrostError::IncorrectCommitment);
        }
        Ok(nonces)
    }
}

impl fmt::Debug for SigningNonces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningNonces")
            .field("hiding", &"<redacted>")
            .field("binding", &"<redacted>")
            .field("commitments", &self.commitments)
            .finish()
    }
}

/// Round 1: sample nonces and the commitments to broadcast
pub fn commit<R: RngCore + CryptoRng>(
    secret: &SigningShare,
    rng: &mut R,
) -> (SigningNonces, SigningCommitments) {
    let nonces = SigningNonces::new(secret, rng);
    let commitments = *nonces.commitments();
    (nonces, commitments)
}

/// Message plus the commitment set of one signing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningPackage {
    pub(crate) header: Header,
    /// Commitments sorted by identifier
    pub(crate) signing_commitments: BTreeMap<Identifier, SigningCommitments>,
    #[serde(with = "hex_vec")]
    pub(crate) message: Vec<u8>,
}

impl SigningPackage {
    /// Build a package; the commitment map keeps identifiers sorted
    pub fn new(signing_commitments: BTreeMap<Identifier, SigningCommitments>, message: &[u8]) -> Self {
        SigningPackage {
            header: Header,
            signing_commitments,
            message: message.to_vec(),
        }
    }

    /// All commitments, sorted by identifier
    pub fn signing_commitments(&self) -> &BTreeMap<Identifier, SigningCommitments> {
        &self.signing_commitments
    }

    /// Commitment of one signer
    pub fn signing_commitment(&self, identifier: &Identifier) -> Option<&SigningCommitments> {
        self.signing_commitments.get(identifier)
    }

    /// Message being signed
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Binary encoding, identical for identical inputs
    pub fn to_bytes(&self) -> FrostResult<Vec<u8>> {
        to_bincode(self)
    }

    /// Decode a binary encoding
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        from_bincode(bytes)
    }

    fn identifiers(&self) -> BTreeSet<Identifier> {
        self.signing_commitments.keys().copied().collect()
    }
}

/// A signer's partial signature z_i
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureShare {
    pub(crate) header: Header,
    #[serde(with = "crate::encoding::scalar")]
    pub(crate) share: Scalar,
}

impl SignatureShare {
    /// Wrap a scalar
    pub fn new(share: Scalar) -> Self {
        SignatureShare {
            header: Header,
            share,
        }
    }

    /// Underlying scalar z_i
    pub fn to_scalar(&self) -> Scalar {
        self.share
    }

    /// 32-byte little-endian scalar
    pub fn to_bytes(&self) -> [u8; 32] {
        ciphersuite::serialize_scalar(&self.share)
    }

    /// Decode a canonical scalar
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<Self> {
        ciphersuite::deserialize_scalar(bytes).map(SignatureShare::new)
    }
}

impl fmt::Debug for SignatureShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SignatureShare")
            .field(&hex::encode(self.to_bytes()))
            .finish()
    }
}

/// Encoded commitment list fed into H5
fn encode_group_commitments(package: &SigningPackage) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(package.signing_commitments.len() * 96);
    for (identifier, commitments) in &package.signing_commitments {
        encoded.extend_from_slice(&identifier.to_bytes());
        encoded.extend_from_slice(&commitments.hiding.to_bytes());
        encoded.extend_from_slice(&commitments.binding.to_bytes());
    }
    encoded
}

/// Compute binding factors ρ_i = H1(vk || H4(m) || H5(commitments) || id_i)
pub(crate) fn compute_binding_factors(
    verifying_key: &VerifyingKey,
    package: &SigningPackage,
) -> BTreeMap<Identifier, Scalar> {
    let mut prefix = Vec::with_capacity(32 + 64 + 64 + 32);
    prefix.extend_from_slice(&verifying_key.to_bytes());
    prefix.extend_from_slice(&ciphersuite::h4(&package.message));
    prefix.extend_from_slice(&ciphersuite::h5(&encode_group_commitments(package)));

    package
        .signing_commitments
        .keys()
        .map(|identifier| {
            let mut input = prefix.clone();
            input.extend_from_slice(&identifier.to_bytes());
            (*identifier, ciphersuite::h1(&input))
        })
        .collect()
}

/// Compute group commitment R = Σ (D_i + ρ_i * E_i)
pub(crate) fn compute_group_commitment(
    package: &SigningPackage,
    binding_factors: &BTreeMap<Identifier, Scalar>,
) -> FrostResult<Element> {
    let mut group_commitment = Element::identity();
    for (identifier, commitments) in &package.signing_commitments {
        let rho = binding_factors
            .get(identifier)
            .ok_or(FrostError::UnknownIdentifier)?;
        group_commitment += commitments.hiding.0 + commitments.binding.0 * rho;
    }
    Ok(group_commitment)
}

/// Compute Lagrange coefficient λ_i at zero for participant i over the set S
pub(crate) fn compute_lagrange_coefficient(
    identifier: &Identifier,
    participants: &BTreeSet<Identifier>,
) -> FrostResult<Scalar> {
    if !participants.contains(identifier) {
        return Err(FrostError::UnknownIdentifier);
    }

    let x_i = identifier.to_scalar();
    let mut numerator = Scalar::ONE;
    let mut denominator = Scalar::ONE;

    for x_j in participants.iter().map(|p| p.to_scalar()) {
        if x_j == x_i {
            continue;
        }

        numerator *= x_j;
        denominator *= x_j - x_i;
    }

    let inverse: Option<Scalar> = denominator.invert().into();
    Ok(numerator * inverse.ok_or(FrostError::DuplicatedIdentifier)?)
}

/// Round 2: compute this signer's share z_i = d_i + e_i ρ_i + λ_i s_i c
pub fn sign(
    package: &SigningPackage,
    nonces: SigningNonces,
    key_package: &KeyPackage,
) -> FrostResult<SignatureShare> {
    if package.signing_commitments.len() < usize::from(key_package.min_signers) {
        return Err(FrostError::IncorrectNumberOfCommitments);
    }

    let commitment = package
        .signing_commitment(&key_package.identifier)
        .ok_or(FrostError::MissingCommitment)?;
    if commitment != nonces.commitments() {
        warn!(
            "signing package commitment for {:?} does not match local nonces",
            key_package.identifier
        );
        return Err(FrostError::IncorrectCommitment);
    }

    let binding_factors = compute_binding_factors(&key_package.verifying_key, package);
    let rho = binding_factors
        .get(&key_package.identifier)
        .ok_or(FrostError::UnknownIdentifier)?;
    let group_commitment = compute_group_commitment(package, &binding_factors)?;
    let lambda = compute_lagrange_coefficient(&key_package.identifier, &package.identifiers())?;
    let c = challenge(&group_commitment, &key_package.verifying_key, &package.message);

    let z = nonces.hiding.to_scalar()
        + nonces.binding.to_scalar() * rho
        + lambda * key_package.signing_share.to_scalar() * c;

    debug!(
        "{:?} produced a signature share over {} commitments",
        key_package.identifier,
        package.signing_commitments.len()
    );
    Ok(SignatureShare::new(z))
}

/// Check [z_i]G == D_i + [ρ_i]E_i + [c λ_i]Y_i for one signer
pub fn verify_signature_share(
    identifier: &Identifier,
    verifying_share: &VerifyingShare,
    signature_share: &SignatureShare,
    package: &SigningPackage,
    verifying_key: &VerifyingKey,
) -> FrostResult<()> {
    let binding_factors = compute_binding_factors(verifying_key, package);
    let group_commitment = compute_group_commitment(package, &binding_factors)?;
    verify_share_with(
        identifier,
        verifying_share,
        signature_share,
        package,
        &binding_factors,
        &group_commitment,
        verifying_key,
    )
}

fn verify_share_with(
    identifier: &Identifier,
    verifying_share: &VerifyingShare,
    signature_share: &SignatureShare,
    package: &SigningPackage,
    binding_factors: &BTreeMap<Identifier, Scalar>,
    group_commitment: &Element,
    verifying_key: &VerifyingKey,
) -> FrostResult<()> {
    let commitment = package
        .signing_commitment(identifier)
        .ok_or(FrostError::UnknownIdentifier)?;
    let rho = binding_factors
        .get(identifier)
        .ok_or(FrostError::UnknownIdentifier)?;
    let lambda = compute_lagrange_coefficient(identifier, &package.identifiers())?;
    let c = challenge(group_commitment, verifying_key, &package.message);

    let lhs = generator() * signature_share.share;
    let rhs = commitment.hiding.0 + commitment.binding.0 * rho + verifying_share.0 * (c * lambda);

    if lhs == rhs {
        Ok(())
    } else {
        warn!("invalid signature share from {:?}", identifier);
        Err(FrostError::InvalidSignatureShare {
            culprit: *identifier,
        })
    }
}

/// Aggregate signature shares into the final signature
///
/// Every share is verified first so a bad share is reported with its
/// culprit instead of producing an invalid signature.
pub fn aggregate(
    package: &SigningPackage,
    signature_shares: &BTreeMap<Identifier, SignatureShare>,
    public_key_package: &PublicKeyPackage,
) -> FrostResult<Signature> {
    if signature_shares.len() != package.signing_commitments.len() {
        return Err(FrostError::IncorrectNumberOfShares);
    }
    if signature_shares
        .keys()
        .any(|id| !package.signing_commitments.contains_key(id))
    {
        return Err(FrostError::UnknownIdentifier);
    }

    let verifying_key = &public_key_package.verifying_key;
    let binding_factors = compute_binding_factors(verifying_key, package);
    let group_commitment = compute_group_commitment(package, &binding_factors)?;

    for (identifier, share) in signature_shares {
        let verifying_share = public_key_package
            .verifying_shares
            .get(identifier)
            .ok_or(FrostError::UnknownIdentifier)?;
        verify_share_with(
            identifier,
            verifying_share,
            share,
            package,
            &binding_factors,
            &group_commitment,
            verifying_key,
        )?;
    }

    let z = signature_shares.values().map(|s| s.share).sum();
    let signature = Signature::new(group_commitment, z);
    verifying_key.verify(&package.message, &signature)?;

    debug!("aggregated {} signature shares", signature_shares.len());
    Ok(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{generate_with_dealer, IdentifierList};
    use rand::rngs::OsRng;

    fn key_packages(max: u16, min: u16) -> (BTreeMap<Identifier, KeyPackage>, PublicKeyPackage) {
        let mut rng = OsRng;
        let (shares, pubkeys) = generate_with_dealer(max, min, IdentifierList::Default, &mut rng).unwrap();
        let key_packages = shares
            .into_iter()
            .map(|(id, share)| (id, KeyPackage::try_from(share).unwrap()))
            .collect();
        (key_packages, pubkeys)
    }

    fn run_round1(
        signers: &[&KeyPackage],
    ) -> (BTreeMap<Identifier, SigningNonces>, BTreeMap<Identifier, SigningCommitments>) {
        let mut rng = OsRng;
        let mut nonces = BTreeMap::new();
        let mut commitments = BTreeMap::new();
        for key_package in signers {
            let (n, c) = commit(key_package.signing_share(), &mut rng);
            nonces.insert(*key_package.identifier(), n);
            commitments.insert(*key_package.identifier(), c);
        }
        (nonces, commitments)
    }

    #[test]
    fn test_full_signing_protocol() {
        let (key_packages, pubkeys) = key_packages(3, 2);
        let signers: Vec<&KeyPackage> = key_packages.values().take(2).collect();
        let (nonces, commitments) = run_round1(&signers);

        let message = b"Hello, FROST!";
        let package = SigningPackage::new(commitments, message);

        let mut shares = BTreeMap::new();
        for (id, n) in nonces {
            let share = sign(&package, n, &key_packages[&id]).unwrap();
            verify_signature_share(
                &id,
                key_packages[&id].verifying_share(),
                &share,
                &package,
                pubkeys.verifying_key(),
            )
            .unwrap();
            shares.insert(id, share);
        }

        let signature = aggregate(&package, &shares, &pubkeys).unwrap();
        assert!(pubkeys.verifying_key().verify(message, &signature).is_ok());
    }

    #[test]
    fn test_tampered_share_is_attributed() {
        let (key_packages, pubkeys) = key_packages(3, 2);
        let signers: Vec<&KeyPackage> = key_packages.values().skip(1).collect();
        let (nonces, commitments) = run_round1(&signers);
        let package = SigningPackage::new(commitments, b"tamper");

        let mut shares: BTreeMap<Identifier, SignatureShare> = nonces
            .into_iter()
            .map(|(id, n)| (id, sign(&package, n, &key_packages[&id]).unwrap()))
            .collect();

        let victim = Identifier::try_from(3u16).unwrap();
        let tampered = SignatureShare::new(shares[&victim].to_scalar() + Scalar::ONE);
        shares.insert(victim, tampered);

        assert_eq!(
            aggregate(&package, &shares, &pubkeys).unwrap_err(),
            FrostError::InvalidSignatureShare { culprit: victim }
        );
    }

    #[test]
    fn test_sign_rejects_foreign_commitment() {
        let (key_packages, _) = key_packages(3, 2);
        let signers: Vec<&KeyPackage> = key_packages.values().take(2).collect();
        let (mut nonces, commitments) = run_round1(&signers);
        let package = SigningPackage::new(commitments, b"msg");

        let id1 = Identifier::try_from(1u16).unwrap();
        let id2 = Identifier::try_from(2u16).unwrap();
        let nonces_of_2 = nonces.remove(&id2).unwrap();
        assert_eq!(
            sign(&package, nonces_of_2, &key_packages[&id1]).unwrap_err(),
            FrostError::IncorrectCommitment
        );
    }

    #[test]
    fn test_sign_requires_threshold_commitments() {
        let (key_packages, _) = key_packages(3, 3);
        let signers: Vec<&KeyPackage> = key_packages.values().take(2).collect();
        let (mut nonces, commitments) = run_round1(&signers);
        let package = SigningPackage::new(commitments, b"msg");

        let id1 = Identifier::try_from(1u16).unwrap();
        let n = nonces.remove(&id1).unwrap();
        assert_eq!(
            sign(&package, n, &key_packages[&id1]).unwrap_err(),
            FrostError::IncorrectNumberOfCommitments
        );
    }

    #[test]
    fn test_sign_requires_own_commitment() {
        let (key_packages, _) = key_packages(3, 2);
        let signers: Vec<&KeyPackage> = key_packages.values().take(2).collect();
        let (_, commitments) = run_round1(&signers);
        let package = SigningPackage::new(commitments, b"msg");

        let id3 = Identifier::try_from(3u16).unwrap();
        let (n, _) = commit(key_packages[&id3].signing_share(), &mut OsRng);
        assert_eq!(
            sign(&package, n, &key_packages[&id3]).unwrap_err(),
            FrostError::MissingCommitment
        );
    }

    #[test]
    fn test_aggregate_share_count_mismatch() {
        let (key_packages, pubkeys) = key_packages(3, 2);
        let signers: Vec<&KeyPackage> = key_packages.values().take(2).collect();
        let (mut nonces, commitments) = run_round1(&signers);
        let package = SigningPackage::new(commitments, b"msg");

        let id1 = Identifier::try_from(1u16).unwrap();
        let share = sign(&package, nonces.remove(&id1).unwrap(), &key_packages[&id1]).unwrap();
        let shares = BTreeMap::from([(id1, share)]);
        assert_eq!(
            aggregate(&package, &shares, &pubkeys).unwrap_err(),
            FrostError::IncorrectNumberOfShares
        );
    }

    #[test]
    fn test_nonces_roundtrip() {
        let (key_packages, _) = key_packages(3, 2);
        let key_package = key_packages.values().next().unwrap();
        let (nonces, commitments) = commit(key_package.signing_share(), &mut OsRng);

        let decoded = SigningNonces::from_bytes(&nonces.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.commitments(), &commitments);
    }

    #[test]
    fn test_lagrange_coefficient() {
        let p1 = Identifier::try_from(1u16).unwrap();
        let p2 = Identifier::try_from(2u16).unwrap();
        let p3 = Identifier::try_from(3u16).unwrap();

        let participants = BTreeSet::from([p1, p2]);

        // λ_1 = 2 / (2-1) = 2
        let lambda1 = compute_lagrange_coefficient(&p1, &participants).unwrap();
        assert_eq!(lambda1, Scalar::from(2u64));

        // λ_2 = 1 / (1-2) = -1
        let lambda2 = compute_lagrange_coefficient(&p2, &participants).unwrap();
        assert_eq!(lambda2, -Scalar::ONE);

        assert_eq!(
            compute_lagrange_coefficient(&p3, &participants),
            Err(FrostError::UnknownIdentifier)
        );
    }
}
