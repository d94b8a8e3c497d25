mod helpers;

use frost_pallas_sdk::coordinator::{
    aggregate, new_signing_package, verify_signature, CoordinationError,
};
use frost_pallas_sdk::participant::{sign, FrostSignatureShare, Round2Error};
use frost_pallas_sdk::{trusted_dealer_keygen_from, Configuration, FrostPublicKeyPackage};
use helpers::{build_signing_package, key_packages, message, round_1, round_2, subset};
use proptest::prelude::*;
use std::collections::HashMap;

const SECRET: [u8; 32] = [
    123, 28, 51, 211, 245, 41, 29, 133, 222, 102, 72, 51, 190, 177, 173, 70, 159, 127, 182, 2, 90,
    14, 199, 139, 58, 121, 12, 110, 19, 169, 131, 4,
];

fn configuration(min_signers: u16, max_signers: u16, secret: &[u8]) -> Configuration {
    Configuration {
        min_signers,
        max_signers,
        secret: secret.to_vec(),
    }
}

fn sign_and_verify(config: &Configuration, signers: usize) {
    let keygen = trusted_dealer_keygen_from(config).unwrap();
    let key_packages = subset(key_packages(&keygen.secret_shares), signers);
    let (nonces, commitments) = round_1(&key_packages);
    let message = message();

    let signing_package = build_signing_package(commitments, &message);
    let signature_shares = round_2(nonces, &key_packages, &signing_package, None);

    let group_signature = aggregate(
        &signing_package,
        signature_shares.into_values().collect(),
        &keygen.public_key_package,
        None,
    )
    .unwrap();

    assert_eq!(
        verify_signature(&message, &group_signature, &keygen.public_key_package),
        Ok(())
    );
}

#[test]
fn test_trusted_from_configuration_with_secret() {
    sign_and_verify(&configuration(2, 3, &SECRET), 3);
}

#[test]
fn test_trusted_from_configuration_without_secret() {
    sign_and_verify(&configuration(2, 3, &[]), 2);
}

#[test]
fn check_keygen_with_dealer_with_secret_with_large_num_of_signers() {
    sign_and_verify(&configuration(14, 20, &SECRET), 14);
}

#[test]
fn test_every_threshold_subset_signs() {
    let keygen = trusted_dealer_keygen_from(&configuration(2, 3, &[])).unwrap();
    let all: Vec<_> = key_packages(&keygen.secret_shares).into_iter().collect();

    for skip in 0..all.len() {
        let chosen: HashMap<_, _> = all
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != skip)
            .map(|(_, (identifier, package))| (identifier.clone(), package.clone()))
            .collect();
        let (nonces, commitments) = round_1(&chosen);
        let signing_package = build_signing_package(commitments, &message());
        let shares = round_2(nonces, &chosen, &signing_package, None);

        let signature = aggregate(
            &signing_package,
            shares.into_values().collect(),
            &keygen.public_key_package,
            None,
        )
        .unwrap();
        assert_eq!(
            verify_signature(&message(), &signature, &keygen.public_key_package),
            Ok(())
        );
    }
}

#[test]
fn test_fewer_than_threshold_cannot_sign() {
    let keygen = trusted_dealer_keygen_from(&configuration(3, 5, &[])).unwrap();
    let key_packages = subset(key_packages(&keygen.secret_shares), 2);
    let (mut nonces, commitments) = round_1(&key_packages);
    let signing_package = build_signing_package(commitments, &message());

    let (identifier, key_package) = key_packages.iter().next().unwrap();
    let result = sign(
        &signing_package,
        nonces.remove(identifier).unwrap(),
        key_package,
        None,
    );
    assert!(matches!(result, Err(Round2Error::SigningFailed { .. })));
}

#[test]
fn test_tampered_share_names_the_culprit() {
    let keygen = trusted_dealer_keygen_from(&configuration(2, 3, &[])).unwrap();
    let key_packages = key_packages(&keygen.secret_shares);
    let (nonces, commitments) = round_1(&key_packages);
    let signing_package = build_signing_package(commitments, &message());
    let mut shares = round_2(nonces, &key_packages, &signing_package, None);

    // swap one signer's share for another's: both decode, only one verifies
    let mut identifiers: Vec<_> = shares.keys().cloned().collect();
    identifiers.sort_by_key(|identifier| identifier.into_identifier().unwrap());
    let (victim, donor) = (&identifiers[0], &identifiers[1]);
    let forged = FrostSignatureShare {
        identifier: victim.clone(),
        data: shares[donor].data.clone(),
    };
    shares.insert(victim.clone(), forged);

    let error = aggregate(
        &signing_package,
        shares.into_values().collect(),
        &keygen.public_key_package,
        None,
    )
    .unwrap_err();
    assert_eq!(
        error,
        CoordinationError::InvalidSignatureShare {
            culprit: victim.clone()
        }
    );
}

#[test]
fn test_signature_does_not_verify_under_another_group_key() {
    let keygen = trusted_dealer_keygen_from(&configuration(2, 3, &[])).unwrap();
    let other = trusted_dealer_keygen_from(&configuration(2, 3, &[])).unwrap();
    let key_packages = key_packages(&keygen.secret_shares);
    let (nonces, commitments) = round_1(&key_packages);
    let signing_package = build_signing_package(commitments, &message());
    let shares = round_2(nonces, &key_packages, &signing_package, None);

    let signature = aggregate(
        &signing_package,
        shares.into_values().collect(),
        &keygen.public_key_package,
        None,
    )
    .unwrap();

    let other_key: FrostPublicKeyPackage = other.public_key_package;
    assert!(verify_signature(&message(), &signature, &other_key).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn signing_package_is_independent_of_commitment_order(
        data in proptest::collection::vec(any::<u8>(), 0..128),
        rotation in 0usize..3,
    ) {
        let keygen = trusted_dealer_keygen_from(&configuration(2, 3, &[])).unwrap();
        let key_packages = key_packages(&keygen.secret_shares);
        let (_, commitments) = round_1(&key_packages);
        let message = frost_pallas_sdk::coordinator::Message { data };

        let mut commitments: Vec<_> = commitments.into_values().collect();
        let first = new_signing_package(&message, commitments.clone()).unwrap();
        commitments.rotate_left(rotation);
        commitments.reverse();
        let second = new_signing_package(&message, commitments).unwrap();

        prop_assert_eq!(first, second);
    }
}
