//! Distributed key generation over SDK records
//!
//! Each participant runs [`part_1`], broadcasts its round-1 package, runs
//! [`part_2`] on everyone else's round-1 packages, sends each round-2 package
//! privately to its recipient and finally runs [`part_3`]. Secret packages
//! are consumed by the next part and cannot be cloned.

use crate::{FrostError, FrostKeyPackage, FrostPublicKeyPackage, ParticipantIdentifier};
use frost_pallas_core::dkg::{self, round1, round2};
use frost_pallas_core::{FrostError as CoreError, Identifier};
use log::{debug, warn};
use rand_core::OsRng;
use std::collections::{BTreeMap, HashMap};

/// Secret state between part 1 and part 2
#[derive(Debug)]
pub struct DkgRound1SecretPackage(round1::SecretPackage);

/// Secret state between part 2 and part 3
#[derive(Debug)]
pub struct DkgRound2SecretPackage(round2::SecretPackage);

/// Broadcast package of `identifier` (the sender)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DkgRound1Package {
    pub identifier: ParticipantIdentifier,
    pub data: Vec<u8>,
}

/// Private package addressed to `identifier` (the recipient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DkgRound2Package {
    pub identifier: ParticipantIdentifier,
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub struct DkgPart1Result {
    pub secret: DkgRound1SecretPackage,
    pub package: DkgRound1Package,
}

#[derive(Debug)]
pub struct DkgPart2Result {
    pub secret: DkgRound2SecretPackage,
    pub packages: Vec<DkgRound2Package>,
}

#[derive(Debug)]
pub struct DkgPart3Result {
    pub public_key_package: FrostPublicKeyPackage,
    pub key_package: FrostKeyPackage,
}

/// Sample this participant's polynomial and its public commitment
pub fn part_1(
    participant_identifier: &ParticipantIdentifier,
    max_signers: u16,
    min_signers: u16,
) -> Result<DkgPart1Result, FrostError> {
    let identifier = participant_identifier.into_identifier()?;

    let (secret, package) = dkg::part1(identifier, max_signers, min_signers, &mut OsRng)
        .map_err(|error| match error {
            CoreError::InvalidMinSigners => FrostError::InvalidMinSigners,
            CoreError::InvalidMaxSigners => FrostError::InvalidMaxSigners,
            _ => FrostError::InvalidConfiguration,
        })?;

    Ok(DkgPart1Result {
        secret: DkgRound1SecretPackage(secret),
        package: DkgRound1Package {
            identifier: participant_identifier.clone(),
            data: package.to_bytes()?,
        },
    })
}

/// Check every peer's proof of knowledge and compute the shares owed to them
///
/// `round1_packages` must hold exactly one package from every other
/// participant, keyed by sender.
pub fn part_2(
    secret_package: DkgRound1SecretPackage,
    round1_packages: &HashMap<ParticipantIdentifier, DkgRound1Package>,
) -> Result<DkgPart2Result, FrostError> {
    let round1_packages = decode_round1_packages(round1_packages)?;

    let (secret, packages) =
        dkg::part2(secret_package.0, &round1_packages).map_err(|error| match error {
            CoreError::IncorrectNumberOfPackages => FrostError::DkgPart2IncorrectNumberOfPackages,
            CoreError::IncorrectNumberOfCommitments => {
                FrostError::DkgPart2IncorrectNumberOfCommitments
            }
            other => other.into(),
        })?;

    let packages = packages
        .iter()
        .map(|(recipient, package)| {
            Ok(DkgRound2Package {
                identifier: (*recipient).into(),
                data: package.to_bytes()?,
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    Ok(DkgPart2Result {
        secret: DkgRound2SecretPackage(secret),
        packages,
    })
}

/// Verify the shares received from every peer and derive the final keys
///
/// `round1_packages` is the same map given to [`part_2`]; `round2_packages`
/// holds the packages addressed to this participant, keyed by sender. A
/// package whose recipient is someone else is rejected with
/// [`FrostError::IncorrectPackage`].
pub fn part_3(
    secret_package: DkgRound2SecretPackage,
    round1_packages: &HashMap<ParticipantIdentifier, DkgRound1Package>,
    round2_packages: &HashMap<ParticipantIdentifier, DkgRound2Package>,
) -> Result<DkgPart3Result, FrostError> {
    let round1_packages = decode_round1_packages(round1_packages)
        .map_err(|_| FrostError::DkgPart3IncorrectRound1Packages)?;

    let own_identifier = *secret_package.0.identifier();
    let mut decoded = BTreeMap::new();
    for (sender, package) in round2_packages {
        let sender = sender.into_identifier()?;
        if package.identifier.into_identifier()? != own_identifier {
            warn!(
                "round 2 package from {:?} is addressed to {}, not {:?}",
                sender, package.identifier.data, own_identifier
            );
            return Err(FrostError::IncorrectPackage);
        }
        decoded.insert(sender, round2::Package::from_bytes(&package.data)?);
    }

    let (key_package, public_key_package) =
        dkg::part3(secret_package.0, &round1_packages, &decoded).map_err(|error| match error {
            CoreError::IncorrectNumberOfPackages => FrostError::DkgPart3IncorrectNumberOfPackages,
            CoreError::IncorrectPackage | CoreError::PackageNotFound => {
                FrostError::DkgPart3PackageSendersMismatch
            }
            other => other.into(),
        })?;

    debug!("DKG finished for {:?}", key_package.identifier());
    Ok(DkgPart3Result {
        public_key_package: FrostPublicKeyPackage::from_public_key_package(&public_key_package),
        key_package: FrostKeyPackage::from_key_package(&key_package)?,
    })
}

fn decode_round1_packages(
    packages: &HashMap<ParticipantIdentifier, DkgRound1Package>,
) -> Result<BTreeMap<Identifier, round1::Package>, FrostError> {
    let mut decoded = BTreeMap::new();
    for (sender, package) in packages {
        decoded.insert(
            sender.into_identifier()?,
            round1::Package::from_bytes(&package.data)?,
        );
    }
    Ok(decoded)
}
