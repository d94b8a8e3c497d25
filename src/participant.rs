//! Signer side of the two signing rounds

use crate::coordinator::FrostSigningPackage;
use crate::randomized::FrostRandomizer;
use crate::{FrostKeyPackage, ParticipantIdentifier};
use frost_pallas_core::signing::{
    self, SignatureShare, SigningCommitments, SigningNonces, SigningPackage,
};
use frost_pallas_core::{randomized, FrostError as CoreError, FrostResult, Identifier};
use log::{debug, warn};
use rand_core::OsRng;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use crate::error::{Round1Error, Round2Error};

/// Round-1 secret nonces; used once by [`sign`], which consumes them
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct FrostSigningNonces {
    pub data: Vec<u8>,
}

impl FrostSigningNonces {
    pub fn from_nonces(nonces: &SigningNonces) -> FrostResult<Self> {
        Ok(FrostSigningNonces {
            data: nonces.to_bytes()?,
        })
    }

    pub fn to_signing_nonces(&self) -> FrostResult<SigningNonces> {
        SigningNonces::from_bytes(&self.data)
    }
}

impl fmt::Debug for FrostSigningNonces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FrostSigningNonces(<redacted>)")
    }
}

/// Public commitments broadcast by `identifier` in round 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrostSigningCommitments {
    pub identifier: ParticipantIdentifier,
    pub data: Vec<u8>,
}

impl FrostSigningCommitments {
    pub fn with_identifier_and_commitments(
        identifier: Identifier,
        commitments: SigningCommitments,
    ) -> FrostResult<Self> {
        Ok(FrostSigningCommitments {
            identifier: identifier.into(),
            data: commitments.to_bytes()?,
        })
    }

    pub fn to_commitments(&self) -> FrostResult<SigningCommitments> {
        SigningCommitments::from_bytes(&self.data)
    }
}

/// Round-1 output: nonces stay local, commitments go to the coordinator
#[derive(Debug)]
pub struct FirstRoundCommitment {
    pub nonces: FrostSigningNonces,
    pub commitments: FrostSigningCommitments,
}

/// A signer's round-2 output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrostSignatureShare {
    pub identifier: ParticipantIdentifier,
    pub data: Vec<u8>,
}

impl FrostSignatureShare {
    pub fn from_signature_share(
        identifier: Identifier,
        share: SignatureShare,
    ) -> FrostResult<Self> {
        Ok(FrostSignatureShare {
            identifier: identifier.into(),
            data: share.to_bytes().to_vec(),
        })
    }

    pub fn to_signature_share(&self) -> FrostResult<SignatureShare> {
        SignatureShare::from_bytes(&self.data)
    }
}

/// Round 1: sample fresh nonces bound to this participant's signing share
pub fn generate_nonces_and_commitments(
    key_package: &FrostKeyPackage,
) -> Result<FirstRoundCommitment, Round1Error> {
    let key_package = key_package
        .into_key_package()
        .map_err(|_| Round1Error::InvalidKeyPackage)?;

    let (nonces, commitments) = signing::commit(key_package.signing_share(), &mut OsRng);

    Ok(FirstRoundCommitment {
        nonces: FrostSigningNonces::from_nonces(&nonces)
            .map_err(|_| Round1Error::NonceSerializationError)?,
        commitments: FrostSigningCommitments::with_identifier_and_commitments(
            *key_package.identifier(),
            commitments,
        )
        .map_err(|_| Round1Error::CommitmentSerializationError)?,
    })
}

/// Round 2: produce this signer's share, under the randomized key if a
/// randomizer is given
pub fn sign(
    signing_package: &FrostSigningPackage,
    nonces: FrostSigningNonces,
    key_package: &FrostKeyPackage,
    randomizer: Option<&FrostRandomizer>,
) -> Result<FrostSignatureShare, Round2Error> {
    let signing_package = SigningPackage::from_bytes(&signing_package.data)
        .map_err(|_| Round2Error::SigningPackageDeserializationError)?;

    let nonces = nonces
        .to_signing_nonces()
        .map_err(|_| Round2Error::NonceSerializationError)?;

    let key_package = key_package
        .into_key_package()
        .map_err(|_| Round2Error::InvalidKeyPackage)?;
    let identifier = *key_package.identifier();

    let share = match randomizer {
        Some(randomizer) => {
            let randomizer = randomizer
                .into_randomizer()
                .map_err(|_| Round2Error::InvalidRandomizer)?;
            randomized::sign(&signing_package, nonces, &key_package, &randomizer)
        }
        None => signing::sign(&signing_package, nonces, &key_package),
    }
    .map_err(|error| {
        warn!("{:?} could not sign: {}", identifier, error);
        match error {
            CoreError::MissingCommitment | CoreError::UnknownIdentifier => {
                Round2Error::InvalidKeyPackage
            }
            CoreError::IncorrectCommitment => Round2Error::IncorrectCommitment,
            other => Round2Error::SigningFailed {
                message: other.to_string(),
            },
        }
    })?;

    debug!("{:?} signed round 2", identifier);
    FrostSignatureShare::from_signature_share(identifier, share).map_err(|error| {
        Round2Error::SigningFailed {
            message: error.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{new_signing_package, Message};
    use crate::{trusted_dealer_keygen_from, verify_and_get_key_package_from, Configuration};

    fn key_packages() -> Vec<FrostKeyPackage> {
        let keygen = trusted_dealer_keygen_from(&Configuration {
            min_signers: 2,
            max_signers: 3,
            secret: Vec::new(),
        })
        .unwrap();
        let mut packages: Vec<_> = keygen
            .secret_shares
            .values()
            .map(|share| verify_and_get_key_package_from(share).unwrap())
            .collect();
        packages.sort_by_key(|p| p.identifier.into_identifier().unwrap());
        packages
    }

    #[test]
    fn test_commitments_match_nonces() {
        let packages = key_packages();
        let round1 = generate_nonces_and_commitments(&packages[0]).unwrap();

        assert_eq!(round1.commitments.identifier, packages[0].identifier);
        let nonces = round1.nonces.to_signing_nonces().unwrap();
        assert_eq!(
            nonces.commitments(),
            &round1.commitments.to_commitments().unwrap()
        );
    }

    #[test]
    fn test_round1_rejects_garbage_key_package() {
        let garbage = FrostKeyPackage {
            identifier: crate::identifier_from_uint16(1).unwrap(),
            data: vec![1, 2, 3],
        };
        assert_eq!(
            generate_nonces_and_commitments(&garbage).unwrap_err(),
            Round1Error::InvalidKeyPackage
        );
    }

    #[test]
    fn test_sign_requires_own_commitment() {
        let packages = key_packages();
        let first = generate_nonces_and_commitments(&packages[0]).unwrap();
        let second = generate_nonces_and_commitments(&packages[1]).unwrap();
        let third = generate_nonces_and_commitments(&packages[2]).unwrap();

        let signing_package = new_signing_package(
            &Message {
                data: b"hello".to_vec(),
            },
            vec![second.commitments.clone(), third.commitments.clone()],
        )
        .unwrap();

        assert_eq!(
            sign(&signing_package, first.nonces, &packages[0], None).unwrap_err(),
            Round2Error::InvalidKeyPackage
        );
    }

    #[test]
    fn test_sign_detects_mismatched_nonces() {
        let packages = key_packages();
        let first = generate_nonces_and_commitments(&packages[0]).unwrap();
        let stale = generate_nonces_and_commitments(&packages[0]).unwrap();
        let second = generate_nonces_and_commitments(&packages[1]).unwrap();

        let signing_package = new_signing_package(
            &Message {
                data: b"hello".to_vec(),
            },
            vec![first.commitments.clone(), second.commitments.clone()],
        )
        .unwrap();

        assert_eq!(
            sign(&signing_package, stale.nonces, &packages[0], None).unwrap_err(),
            Round2Error::IncorrectCommitment
        );
    }

    #[test]
    fn test_sign_rejects_relabeled_key_package() {
        let packages = key_packages();
        let first = generate_nonces_and_commitments(&packages[0]).unwrap();
        let second = generate_nonces_and_commitments(&packages[1]).unwrap();

        let signing_package = new_signing_package(
            &Message {
                data: b"hello".to_vec(),
            },
            vec![first.commitments.clone(), second.commitments.clone()],
        )
        .unwrap();

        let relabeled = FrostKeyPackage {
            identifier: packages[1].identifier.clone(),
            data: packages[0].data.clone(),
        };
        assert_eq!(
            sign(&signing_package, first.nonces, &relabeled, None).unwrap_err(),
            Round2Error::InvalidKeyPackage
        );
    }

    #[test]
    fn test_sign_rejects_bad_randomizer() {
        let packages = key_packages();
        let first = generate_nonces_and_commitments(&packages[0]).unwrap();
        let second = generate_nonces_and_commitments(&packages[1]).unwrap();

        let signing_package = new_signing_package(
            &Message {
                data: b"hello".to_vec(),
            },
            vec![first.commitments.clone(), second.commitments.clone()],
        )
        .unwrap();

        let randomizer = FrostRandomizer {
            data: vec![0xff; 32],
        };
        assert_eq!(
            sign(&signing_package, first.nonces, &packages[0], Some(&randomizer)).unwrap_err(),
            Round2Error::InvalidRandomizer
        );
    }
}
