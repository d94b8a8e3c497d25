//! Distributed Key Generation (DKG) Protocol
//!
//! Implements the three-part Pedersen DKG with proofs of knowledge used by FROST.
//! Protocol flow:
//! 1. Each participant samples a secret polynomial, broadcasts its Feldman
//!    commitment and a Schnorr proof of knowledge of the constant term
//! 2. Participants verify every proof and send each peer its share f_i(ℓ)
//! 3. Participants verify received shares against the senders' commitments
//!    and sum them into their final signing share
//!
//! Secret packages are consumed by the following part, so a participant
//! cannot run a part twice with the same state.

use crate::ciphersuite::{self, generator, random_nonzero, Element, Scalar};
use crate::keys::{validate_num_of_signers, KeyPackage, PublicKeyPackage};
use crate::types::*;
use crate::{FrostError, FrostResult};
use log::{debug, warn};
use rand_core::{CryptoRng, RngCore};
use std::collections::{BTreeMap, BTreeSet};

/// Round 1 messages and state
pub mod round1 {
    use super::*;
    use crate::encoding::{from_bincode, to_bincode};
    use serde::{Deserialize, Serialize};
    use std::fmt;

    /// Broadcast by every participant after part 1
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Package {
        pub(crate) header: Header,
        pub(crate) commitment: VerifiableSecretSharingCommitment,
        pub(crate) proof_of_knowledge: Signature,
    }

    impl Package {
        /// Sender's commitment to its secret polynomial
        pub fn commitment(&self) -> &VerifiableSecretSharingCommitment {
            &self.commitment
        }

        /// Proof of knowledge of the polynomial's constant term
        pub fn proof_of_knowledge(&self) -> &Signature {
            &self.proof_of_knowledge
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

    /// Private state between part 1 and part 2
    pub struct SecretPackage {
        pub(crate) identifier: Identifier,
        pub(crate) polynomial: Polynomial,
        pub(crate) commitment: VerifiableSecretSharingCommitment,
        pub(crate) min_signers: u16,
        pub(crate) max_signers: u16,
    }

    impl SecretPackage {
        /// Owner of this state
        pub fn identifier(&self) -> &Identifier {
            &self.identifier
        }
    }

    impl fmt::Debug for SecretPackage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("round1::SecretPackage")
                .field("identifier", &self.identifier)
                .field("min_signers", &self.min_signers)
                .field("max_signers", &self.max_signers)
                .finish()
        }
    }
}

/// Round 2 messages and state
pub mod round2 {
    use super::*;
    use crate::encoding::{from_bincode, to_bincode};
    use serde::{Deserialize, Serialize};
    use std::fmt;

    /// Sent privately to a single recipient after part 2
    #[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Package {
        pub(crate) header: Header,
        pub(crate) signing_share: SigningShare,
    }

    impl Package {
        /// The sender's polynomial evaluated at the recipient
        pub fn signing_share(&self) -> &SigningShare {
            &self.signing_share
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

    impl fmt::Debug for Package {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("round2::Package")
                .field("signing_share", &self.signing_share)
                .finish()
        }
    }

    /// Private state between part 2 and part 3
    pub struct SecretPackage {
        pub(crate) identifier: Identifier,
        pub(crate) commitment: VerifiableSecretSharingCommitment,
        pub(crate) own_share: SecretScalar,
        pub(crate) min_signers: u16,
        pub(crate) max_signers: u16,
    }

    impl SecretPackage {
        /// Owner of this state
        pub fn identifier(&self) -> &Identifier {
            &self.identifier
        }
    }

    impl fmt::Debug for SecretPackage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("round2::SecretPackage")
                .field("identifier", &self.identifier)
                .field("min_signers", &self.min_signers)
                .field("max_signers", &self.max_signers)
                .finish()
        }
    }
}

/// Challenge for the proof of knowledge: H(id || φ_0 || R)
fn pok_challenge(identifier: &Identifier, phi0: &Element, r: &Element) -> Scalar {
    let mut preimage = Vec::with_capacity(96);
    preimage.extend_from_slice(&identifier.to_bytes());
    preimage.extend_from_slice(&ciphersuite::serialize_element(phi0));
    preimage.extend_from_slice(&ciphersuite::serialize_element(r));
    ciphersuite::hdkg(&preimage)
}

fn compute_proof_of_knowledge<R: RngCore + CryptoRng>(
    identifier: &Identifier,
    polynomial: &Polynomial,
    commitment: &VerifiableSecretSharingCommitment,
    rng: &mut R,
) -> FrostResult<Signature> {
    let k = SecretScalar::new(random_nonzero(rng));
    let r = generator() * k.as_scalar();
    let phi0 = commitment.verifying_key()?.to_element();
    let c = pok_challenge(identifier, &phi0, &r);
    let mu = k.as_scalar() + polynomial.constant_term() * c;
    Ok(Signature::new(r, mu))
}

fn verify_proof_of_knowledge(identifier: &Identifier, package: &round1::Package) -> FrostResult<()> {
    let phi0 = package.commitment.verifying_key()?.to_element();
    let r = package.proof_of_knowledge.r();
    let mu = package.proof_of_knowledge.z();
    let c = pok_challenge(identifier, &phi0, &r);
    // R == [μ]G - [c]φ_0
    if r != generator() * mu - phi0 * c {
        warn!("invalid proof of knowledge from {:?}", identifier);
        return Err(FrostError::InvalidProofOfKnowledge {
            culprit: *identifier,
        });
    }
    Ok(())
}

/// Part 1: sample a secret polynomial and publish its commitment with a proof of knowledge
pub fn part1<R: RngCore + CryptoRng>(
    identifier: Identifier,
    max_signers: u16,
    min_signers: u16,
    rng: &mut R,
) -> FrostResult<(round1::SecretPackage, round1::Package)> {
    validate_num_of_signers(min_signers, max_signers)?;

    let constant = random_nonzero(rng);
    let polynomial = Polynomial::random(min_signers, constant, rng);
    let commitment = polynomial.commitment();
    let proof_of_knowledge = compute_proof_of_knowledge(&identifier, &polynomial, &commitment, rng)?;

    debug!("{:?} completed DKG part 1", identifier);
    let package = round1::Package {
        header: Header,
        commitment: commitment.clone(),
        proof_of_knowledge,
    };
    let secret = round1::SecretPackage {
        identifier,
        polynomial,
        commitment,
        min_signers,
        max_signers,
    };
    Ok((secret, package))
}

/// Part 2: check every peer's proof and compute the share owed to each peer
pub fn part2(
    secret_package: round1::SecretPackage,
    round1_packages: &BTreeMap<Identifier, round1::Package>,
) -> FrostResult<(round2::SecretPackage, BTreeMap<Identifier, round2::Package>)> {
    if round1_packages.len() != usize::from(secret_package.max_signers) - 1 {
        return Err(FrostError::IncorrectNumberOfPackages);
    }
    if round1_packages.contains_key(&secret_package.identifier) {
        return Err(FrostError::IncorrectPackage);
    }

    let mut round2_packages = BTreeMap::new();
    for (sender, package) in round1_packages {
        if package.commitment.min_signers() != usize::from(secret_package.min_signers) {
            return Err(FrostError::IncorrectNumberOfCommitments);
        }
        verify_proof_of_knowledge(sender, package)?;

        let share = secret_package.polynomial.evaluate(&sender.to_scalar());
        round2_packages.insert(
            *sender,
            round2::Package {
                header: Header,
                signing_share: SigningShare::new(share),
            },
        );
    }

    let own_share = secret_package
        .polynomial
        .evaluate(&secret_package.identifier.to_scalar());
    debug!(
        "{:?} completed DKG part 2 with {} peers",
        secret_package.identifier,
        round2_packages.len()
    );

    let secret = round2::SecretPackage {
        identifier: secret_package.identifier,
        commitment: secret_package.commitment.clone(),
        own_share: SecretScalar::new(own_share),
        min_signers: secret_package.min_signers,
        max_signers: secret_package.max_signers,
    };
    Ok((secret, round2_packages))
}

/// Part 3: verify received shares and derive the final key material
///
/// The result is normalized so the group key has an even y coordinate; when
/// the summed key does not, every participant negates its share, which all
/// of them do consistently because they see the same commitments.
pub fn part3(
    secret_package: round2::SecretPackage,
    round1_packages: &BTreeMap<Identifier, round1::Package>,
    round2_packages: &BTreeMap<Identifier, round2::Package>,
) -> FrostResult<(KeyPackage, PublicKeyPackage)> {
    let expected = usize::from(secret_package.max_signers) - 1;
    if round1_packages.len() != expected || round2_packages.len() != expected {
        return Err(FrostError::IncorrectNumberOfPackages);
    }
    if !round1_packages.keys().eq(round2_packages.keys()) {
        return Err(FrostError::IncorrectPackage);
    }

    let identifier = secret_package.identifier;
    let mut signing_share = *secret_package.own_share.as_scalar();
    for (sender, package) in round2_packages {
        let commitment = &round1_packages
            .get(sender)
            .ok_or(FrostError::PackageNotFound)?
            .commitment;
        let share = package.signing_share.to_scalar();
        if generator() * share != commitment.evaluate(&identifier) {
            warn!("share sent by {:?} does not match its commitment", sender);
            return Err(FrostError::InvalidSecretShare { culprit: *sender });
        }
        signing_share += share;
    }

    let group_commitment = VerifiableSecretSharingCommitment::sum(
        round1_packages
            .values()
            .map(|p| &p.commitment)
            .chain(std::iter::once(&secret_package.commitment)),
    )?;

    let mut identifiers: BTreeSet<Identifier> = round1_packages.keys().copied().collect();
    identifiers.insert(identifier);

    let (signing_share, group_commitment) = if group_commitment.verifying_key()?.has_even_y() {
        (SigningShare::new(signing_share), group_commitment)
    } else {
        debug!("negating DKG output for an even-y group key");
        (SigningShare::new(-signing_share), group_commitment.negate())
    };
    let public_key_package = PublicKeyPackage::from_commitment(&identifiers, &group_commitment)?;

    let verifying_share = signing_share.verifying_share();
    if public_key_package.verifying_shares().get(&identifier) != Some(&verifying_share) {
        return Err(FrostError::InvalidSecretShare { culprit: identifier });
    }

    let key_package = KeyPackage::new(
        identifier,
        signing_share,
        verifying_share,
        *public_key_package.verifying_key(),
        secret_package.min_signers,
    );
    debug!("{:?} completed DKG part 3", identifier);
    Ok((key_package, public_key_package))
}
