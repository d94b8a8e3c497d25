#![allow(dead_code)]

use frost_pallas_sdk::coordinator::{new_signing_package, FrostSigningPackage, Message};
use frost_pallas_sdk::participant::{
    generate_nonces_and_commitments, sign, FrostSignatureShare, FrostSigningCommitments,
    FrostSigningNonces,
};
use frost_pallas_sdk::randomized::FrostRandomizer;
use frost_pallas_sdk::{
    verify_and_get_key_package_from, FrostKeyPackage, FrostSecretKeyShare, ParticipantIdentifier,
};
use std::collections::HashMap;

pub fn key_packages(
    shares: &HashMap<ParticipantIdentifier, FrostSecretKeyShare>,
) -> HashMap<ParticipantIdentifier, FrostKeyPackage> {
    shares
        .iter()
        .map(|(identifier, share)| {
            (
                identifier.clone(),
                verify_and_get_key_package_from(share).unwrap(),
            )
        })
        .collect()
}

pub fn round_1(
    key_packages: &HashMap<ParticipantIdentifier, FrostKeyPackage>,
) -> (
    HashMap<ParticipantIdentifier, FrostSigningNonces>,
    HashMap<ParticipantIdentifier, FrostSigningCommitments>,
) {
    let mut nonces_map = HashMap::new();
    let mut commitments_map = HashMap::new();

    for (participant, key_package) in key_packages {
        let round1 = generate_nonces_and_commitments(key_package).unwrap();
        nonces_map.insert(participant.clone(), round1.nonces);
        commitments_map.insert(participant.clone(), round1.commitments);
    }

    (nonces_map, commitments_map)
}

pub fn build_signing_package(
    commitments_map: HashMap<ParticipantIdentifier, FrostSigningCommitments>,
    message: &Message,
) -> FrostSigningPackage {
    new_signing_package(message, commitments_map.into_values().collect()).unwrap()
}

pub fn round_2(
    nonces_map: HashMap<ParticipantIdentifier, FrostSigningNonces>,
    key_packages: &HashMap<ParticipantIdentifier, FrostKeyPackage>,
    signing_package: &FrostSigningPackage,
    randomizer: Option<&FrostRandomizer>,
) -> HashMap<ParticipantIdentifier, FrostSignatureShare> {
    nonces_map
        .into_iter()
        .map(|(participant, nonces)| {
            let share = sign(
                signing_package,
                nonces,
                &key_packages[&participant],
                randomizer,
            )
            .unwrap();
            (participant, share)
        })
        .collect()
}

/// Keep only the first `count` participants in identifier order
pub fn subset<T>(
    map: HashMap<ParticipantIdentifier, T>,
    count: usize,
) -> HashMap<ParticipantIdentifier, T> {
    let mut entries: Vec<_> = map.into_iter().collect();
    entries.sort_by_key(|(identifier, _)| identifier.into_identifier().unwrap());
    entries.into_iter().take(count).collect()
}

pub fn message() -> Message {
    Message {
        data: "i am a message".as_bytes().to_vec(),
    }
}
