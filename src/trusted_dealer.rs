//! Trusted dealer key generation
//!
//! The dealer either samples a fresh group key or splits the secret from the
//! [`Configuration`]. Every share is verified into a key package before any
//! output is returned, so a dealer run either fully succeeds or yields nothing.

use crate::{
    validate_config, Configuration, FrostError, FrostPublicKeyPackage, FrostSecretKeyShare,
    ParticipantIdentifier,
};
use frost_pallas_core::keys::{
    generate_with_dealer, split, IdentifierList, KeyPackage, PublicKeyPackage, SecretShare,
    SigningKey,
};
use frost_pallas_core::Identifier;
use log::{debug, warn};
use rand_core::{CryptoRng, OsRng, RngCore};
use std::collections::{BTreeMap, HashMap};

/// Dealer run with default identifiers, returning SDK records
pub fn trusted_dealer_keygen_from_configuration(
    configuration: &Configuration,
) -> Result<
    (
        FrostPublicKeyPackage,
        HashMap<ParticipantIdentifier, FrostSecretKeyShare>,
    ),
    FrostError,
> {
    let (shares, public_key_package) =
        trusted_dealer_keygen(configuration, IdentifierList::Default, &mut OsRng)?;

    Ok((
        FrostPublicKeyPackage::from_public_key_package(&public_key_package),
        share_records(shares.values())?,
    ))
}

/// Dealer run over core types
pub fn trusted_dealer_keygen<R: RngCore + CryptoRng>(
    configuration: &Configuration,
    identifiers: IdentifierList,
    rng: &mut R,
) -> Result<(BTreeMap<Identifier, SecretShare>, PublicKeyPackage), FrostError> {
    validate_config(configuration)?;

    let (shares, public_key_package) = split_secret(configuration, identifiers, rng)?;

    for share in shares.values() {
        KeyPackage::try_from(share.clone())?;
    }

    debug!(
        "dealer issued {} verified shares, threshold {}",
        shares.len(),
        configuration.min_signers
    );
    Ok((shares, public_key_package))
}

/// Share the configured secret, or a fresh one when none is given
pub(crate) fn split_secret<R: RngCore + CryptoRng>(
    configuration: &Configuration,
    identifiers: IdentifierList,
    rng: &mut R,
) -> Result<(BTreeMap<Identifier, SecretShare>, PublicKeyPackage), FrostError> {
    let result = if configuration.secret.is_empty() {
        generate_with_dealer(
            configuration.max_signers,
            configuration.min_signers,
            identifiers,
            rng,
        )
    } else {
        let signing_key = SigningKey::from_bytes(&configuration.secret).map_err(|_| {
            warn!("configured dealer secret is not a valid signing key");
            FrostError::InvalidSecretKey
        })?;
        split(
            &signing_key,
            configuration.max_signers,
            configuration.min_signers,
            identifiers,
            rng,
        )
    };

    result.map_err(FrostError::from)
}

/// Wrap core shares into SDK records keyed by participant
pub(crate) fn share_records<'a>(
    shares: impl Iterator<Item = &'a SecretShare>,
) -> Result<HashMap<ParticipantIdentifier, FrostSecretKeyShare>, FrostError> {
    shares
        .map(|share| {
            let record = FrostSecretKeyShare::from_secret_share(share)?;
            Ok((record.identifier.clone(), record))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    fn config(secret: Vec<u8>) -> Configuration {
        Configuration {
            min_signers: 2,
            max_signers: 3,
            secret,
        }
    }

    #[test]
    fn return_invalid_secret_key_error_if_secret_is_invalid() {
        let mut rng = thread_rng();
        let out = split_secret(
            &config(b"invalidsecret".to_vec()),
            IdentifierList::Default,
            &mut rng,
        );

        assert_eq!(out.unwrap_err(), FrostError::InvalidSecretKey);
    }

    #[test]
    fn return_invalid_secret_key_error_if_secret_is_short() {
        let mut rng = thread_rng();
        let secret: Vec<u8> = vec![
            123, 28, 51, 211, 245, 41, 29, 133, 222, 102, 72, 51, 190, 177, 173, 70, 159, 127, 182,
            2, 90, 14, 199, 139, 58, 121, 12, 110, 19, 169, 131,
        ];

        let out = split_secret(&config(secret), IdentifierList::Default, &mut rng);

        assert_eq!(out.unwrap_err(), FrostError::InvalidSecretKey);
    }

    #[test]
    fn return_invalid_secret_key_error_if_secret_is_zero() {
        let mut rng = thread_rng();
        let out = split_secret(&config(vec![0u8; 32]), IdentifierList::Default, &mut rng);

        assert_eq!(out.unwrap_err(), FrostError::InvalidSecretKey);
    }

    #[test]
    fn configured_secret_determines_the_group_key() {
        let mut rng = thread_rng();
        let secret: Vec<u8> = vec![
            123, 28, 51, 211, 245, 41, 29, 133, 222, 102, 72, 51, 190, 177, 173, 70, 159, 127, 182,
            2, 90, 14, 199, 139, 58, 121, 12, 110, 19, 169, 131, 4,
        ];
        let signing_key = SigningKey::from_bytes(&secret).unwrap();

        let (_, first) =
            trusted_dealer_keygen(&config(secret.clone()), IdentifierList::Default, &mut rng)
                .unwrap();
        let (_, second) =
            trusted_dealer_keygen(&config(secret), IdentifierList::Default, &mut rng).unwrap();

        assert_eq!(first.verifying_key(), second.verifying_key());
        // the dealer may negate the secret to reach an even-y key
        let expected = signing_key.verifying_key();
        assert!(
            *first.verifying_key() == expected
                || first.verifying_key().to_element() == -expected.to_element()
        );
        assert!(first.verifying_key().has_even_y());
    }

    #[test]
    fn invalid_thresholds_are_rejected_before_splitting() {
        let mut rng = thread_rng();
        let bad = Configuration {
            min_signers: 4,
            max_signers: 3,
            secret: Vec::new(),
        };
        assert_eq!(
            trusted_dealer_keygen(&bad, IdentifierList::Default, &mut rng).unwrap_err(),
            FrostError::InvalidMinSigners
        );
    }

    #[test]
    fn records_are_keyed_by_their_owner() {
        let (public_key_package, shares) =
            trusted_dealer_keygen_from_configuration(&config(Vec::new())).unwrap();
        assert_eq!(shares.len(), 3);
        assert_eq!(public_key_package.verifying_shares.len(), 3);
        for (identifier, share) in &shares {
            assert_eq!(identifier, &share.identifier);
            assert!(public_key_package.verifying_shares.contains_key(identifier));
        }
    }
}
