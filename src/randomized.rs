//! Re-randomized signing parameters
//!
//! The coordinator derives a [`FrostRandomizedParams`] from the group key and
//! the signing package and hands the [`FrostRandomizer`] to every signer with
//! the package. Signers and coordinator then pass it to
//! [`crate::participant::sign`] and [`crate::coordinator::aggregate`].

use crate::coordinator::FrostSigningPackage;
use crate::{FrostError, FrostPublicKeyPackage};
use frost_pallas_core::{
    FrostError as CoreError, FrostResult, RandomizedParams, Randomizer, SigningPackage,
};
use log::debug;

/// Session randomizer α, a 32-byte scalar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrostRandomizer {
    pub data: Vec<u8>,
}

impl FrostRandomizer {
    pub fn from_randomizer(randomizer: &Randomizer) -> Self {
        FrostRandomizer {
            data: randomizer.to_bytes().to_vec(),
        }
    }

    pub fn into_randomizer(&self) -> FrostResult<Randomizer> {
        Randomizer::from_bytes(&self.data)
    }
}

/// Randomizer plus the randomized group key it induces
#[derive(Debug)]
pub struct FrostRandomizedParams {
    params: RandomizedParams,
}

impl FrostRandomizedParams {
    /// Hex encoding of `vk + [α]G`, the key the final signature verifies under
    pub fn randomized_verifying_key(&self) -> String {
        hex::encode(self.params.randomized_verifying_key().to_bytes())
    }
}

/// Derive the session parameters every party agrees on
pub fn randomized_params_from_public_key_and_signing_package(
    public_key: &FrostPublicKeyPackage,
    signing_package: &FrostSigningPackage,
) -> Result<FrostRandomizedParams, FrostError> {
    let public_key_package = public_key.into_public_key_package()?;
    let signing_package = SigningPackage::from_bytes(&signing_package.data)?;

    let params = RandomizedParams::new(public_key_package.verifying_key(), &signing_package)?;
    debug!(
        "randomized parameters derived for {} signers",
        signing_package.signing_commitments().len()
    );
    Ok(FrostRandomizedParams { params })
}

/// Extract the randomizer to ship alongside the signing package
pub fn randomizer_from_params(
    randomized_params: &FrostRandomizedParams,
) -> Result<FrostRandomizer, FrostError> {
    Ok(FrostRandomizer::from_randomizer(
        randomized_params.params.randomizer(),
    ))
}

/// Import a randomizer from its hex encoding
pub fn randomizer_from_hex_string(hex_string: &str) -> Result<FrostRandomizer, FrostError> {
    let bytes = hex::decode(hex_string).map_err(|_| FrostError::DeserializationError)?;
    let randomizer = Randomizer::from_bytes(&bytes).map_err(|error| match error {
        CoreError::MalformedScalar => FrostError::DeserializationError,
        other => other.into(),
    })?;
    Ok(FrostRandomizer::from_randomizer(&randomizer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{new_signing_package, Message};
    use crate::participant::generate_nonces_and_commitments;
    use crate::{trusted_dealer_keygen_from, verify_and_get_key_package_from, Configuration};

    #[test]
    fn test_randomizer_from_hex_string() {
        let hex = "6fe2e6f26bca5f3a4bc1cd811327cdfc6a4581dc3fe1c101b0c5115a21697510";
        let randomizer = randomizer_from_hex_string(hex).unwrap();
        assert_eq!(hex::encode(&randomizer.data), hex);

        assert_eq!(
            randomizer_from_hex_string("not hex").unwrap_err(),
            FrostError::DeserializationError
        );
        assert_eq!(
            randomizer_from_hex_string(&"ff".repeat(32)).unwrap_err(),
            FrostError::DeserializationError
        );
    }

    #[test]
    fn test_params_are_agreed_by_everyone() {
        let keygen = trusted_dealer_keygen_from(&Configuration {
            min_signers: 2,
            max_signers: 3,
            secret: Vec::new(),
        })
        .unwrap();
        let commitments: Vec<_> = keygen
            .secret_shares
            .values()
            .take(2)
            .map(|share| {
                let key_package = verify_and_get_key_package_from(share).unwrap();
                generate_nonces_and_commitments(&key_package)
                    .unwrap()
                    .commitments
            })
            .collect();
        let signing_package = new_signing_package(
            &Message {
                data: b"randomize me".to_vec(),
            },
            commitments,
        )
        .unwrap();

        let first = randomized_params_from_public_key_and_signing_package(
            &keygen.public_key_package,
            &signing_package,
        )
        .unwrap();
        let second = randomized_params_from_public_key_and_signing_package(
            &keygen.public_key_package,
            &signing_package,
        )
        .unwrap();

        assert_eq!(
            randomizer_from_params(&first).unwrap(),
            randomizer_from_params(&second).unwrap()
        );
        assert_ne!(
            first.randomized_verifying_key(),
            keygen.public_key_package.verifying_key
        );
    }
}
