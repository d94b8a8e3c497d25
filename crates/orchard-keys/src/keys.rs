//! Orchard full viewing key components

use crate::address::OrchardAddress;
use crate::{OrchardKeyError, OrchardResult, ZcashNetwork};
use log::debug;
use orchard::keys::{
    CommitIvkRandomness, FullViewingKey, NullifierDerivingKey, SpendValidatingKey, SpendingKey,
};
use rand_core::{OsRng, RngCore};
use std::fmt;
use zcash_address::unified::{self, Container, Encoding, Fvk, Ufvk};
use zeroize::Zeroize;
use zip32::{AccountId, Scope};

fn spending_key_from_seed(seed: &[u8], network: ZcashNetwork) -> OrchardResult<SpendingKey> {
    SpendingKey::from_zip32_seed(seed, network.coin_type(), AccountId::ZERO).map_err(|e| {
        OrchardKeyError::KeyDerivationError {
            message: e.to_string(),
        }
    })
}

/// `nk` and `rivk` generated from a throwaway seed
///
/// Used when a FROST group wants fresh viewing key material to go with its
/// group key. The seed is discarded, so these bytes must be backed up.
#[derive(Clone)]
pub struct OrchardKeyParts {
    /// Nullifier deriving key
    pub nk: Vec<u8>,
    /// Commit IVK randomness
    pub rivk: Vec<u8>,
}

impl OrchardKeyParts {
    /// Derive `nk` and `rivk` from a random 32-byte seed at account 0
    pub fn random(network: ZcashNetwork) -> OrchardResult<Self> {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        let spending_key = spending_key_from_seed(&seed, network);
        seed.zeroize();
        let spending_key = spending_key?;

        let nk = NullifierDerivingKey::from(&spending_key);
        let rivk = CommitIvkRandomness::from(&spending_key);

        Ok(OrchardKeyParts {
            nk: nk.to_bytes().to_vec(),
            rivk: rivk.to_bytes().to_vec(),
        })
    }
}

impl fmt::Debug for OrchardKeyParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OrchardKeyParts(<redacted>)")
    }
}

/// Spend validating key `ak`, the FROST group verifying key
#[derive(Clone)]
pub struct OrchardSpendValidatingKey {
    key: SpendValidatingKey,
}

impl OrchardSpendValidatingKey {
    /// Decode a 32-byte `ak`; the point must have an even y coordinate
    pub fn from_bytes(bytes: &[u8]) -> OrchardResult<Self> {
        SpendValidatingKey::from_bytes(bytes)
            .map(|key| OrchardSpendValidatingKey { key })
            .ok_or(OrchardKeyError::DeserializationError)
    }

    /// 32-byte encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        self.key.to_bytes().to_vec()
    }
}

impl PartialEq for OrchardSpendValidatingKey {
    fn eq(&self, other: &Self) -> bool {
        self.key.to_bytes() == other.key.to_bytes()
    }
}

impl Eq for OrchardSpendValidatingKey {}

impl fmt::Debug for OrchardSpendValidatingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OrchardSpendValidatingKey")
            .field(&self.key.to_bytes())
            .finish()
    }
}

/// Nullifier deriving key `nk`
#[derive(Clone, Copy)]
pub struct OrchardNullifierDerivingKey {
    nk: NullifierDerivingKey,
}

impl OrchardNullifierDerivingKey {
    /// Decode a 32-byte `nk`
    pub fn new(bytes: &[u8]) -> OrchardResult<Self> {
        NullifierDerivingKey::from_bytes(bytes)
            .map(|nk| OrchardNullifierDerivingKey { nk })
            .ok_or(OrchardKeyError::DeserializationError)
    }

    /// 32-byte encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        self.nk.to_bytes().to_vec()
    }
}

/// Commit IVK randomness `rivk`
#[derive(Clone, Copy)]
pub struct OrchardCommitIvkRandomness {
    rivk: CommitIvkRandomness,
}

impl OrchardCommitIvkRandomness {
    /// Decode a 32-byte `rivk`
    pub fn new(bytes: &[u8]) -> OrchardResult<Self> {
        CommitIvkRandomness::from_bytes(bytes)
            .map(|rivk| OrchardCommitIvkRandomness { rivk })
            .ok_or(OrchardKeyError::DeserializationError)
    }

    /// 32-byte encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        self.rivk.to_bytes().to_vec()
    }
}

/// Orchard full viewing key bound to a network
#[derive(Clone)]
pub struct OrchardFullViewingKey {
    network: ZcashNetwork,
    fvk: FullViewingKey,
}

impl OrchardFullViewingKey {
    /// Combine a FROST `ak` with `nk` and `rivk` derived from a ZIP-32 seed
    /// (account 0, coin type of `network`)
    pub fn new_from_validating_key_and_seed(
        validating_key: &OrchardSpendValidatingKey,
        zip32_seed: &[u8],
        network: ZcashNetwork,
    ) -> OrchardResult<Self> {
        let spending_key = spending_key_from_seed(zip32_seed, network)?;
        let nk = NullifierDerivingKey::from(&spending_key);
        let rivk = CommitIvkRandomness::from(&spending_key);

        // ak || nk || rivk, validated by the FVK decoder
        let mut fvk_bytes = [0u8; 96];
        fvk_bytes[..32].copy_from_slice(&validating_key.key.to_bytes());
        fvk_bytes[32..64].copy_from_slice(&nk.to_bytes());
        fvk_bytes[64..].copy_from_slice(&rivk.to_bytes());

        let fvk = FullViewingKey::from_bytes(&fvk_bytes).ok_or_else(|| {
            OrchardKeyError::KeyDerivationError {
                message: "could not build a full viewing key from ak, nk and rivk".to_string(),
            }
        })?;
        debug!("derived Orchard full viewing key for {:?}", network);
        Ok(OrchardFullViewingKey { network, fvk })
    }

    /// Compose a full viewing key from already validated parts
    pub fn new_from_checked_parts(
        ak: &OrchardSpendValidatingKey,
        nk: &OrchardNullifierDerivingKey,
        rivk: &OrchardCommitIvkRandomness,
        network: ZcashNetwork,
    ) -> OrchardResult<Self> {
        let fvk = FullViewingKey::from_checked_parts(ak.key.clone(), nk.nk, rivk.rivk);
        Ok(OrchardFullViewingKey { network, fvk })
    }

    /// Encode as a Unified Full Viewing Key holding only the Orchard item
    pub fn encode(&self) -> OrchardResult<String> {
        let ufvk = Ufvk::try_from_items(vec![Fvk::Orchard(self.fvk.to_bytes())]).map_err(|e| {
            OrchardKeyError::KeyDerivationError {
                message: e.to_string(),
            }
        })?;
        Ok(ufvk.encode(&self.network.network_type()))
    }

    /// Decode a Unified Full Viewing Key encoded for `network`
    pub fn decode(encoded: &str, network: ZcashNetwork) -> OrchardResult<Self> {
        let (network_type, ufvk) =
            Ufvk::decode(encoded).map_err(|_| OrchardKeyError::DeserializationError)?;
        if ZcashNetwork::from_network_type(network_type)? != network {
            return Err(OrchardKeyError::DeserializationError);
        }

        let orchard_bytes = ufvk
            .items()
            .into_iter()
            .find_map(|item| match item {
                Fvk::Orchard(bytes) => Some(bytes),
                _ => None,
            })
            .ok_or_else(|| OrchardKeyError::KeyDerivationError {
                message: "no Orchard key in unified viewing key".to_string(),
            })?;

        let fvk =
            FullViewingKey::from_bytes(&orchard_bytes).ok_or(OrchardKeyError::DeserializationError)?;
        Ok(OrchardFullViewingKey { network, fvk })
    }

    /// External address at diversifier index 0, as an Orchard-only Unified Address
    pub fn derive_address(&self) -> OrchardResult<OrchardAddress> {
        let address = self.fvk.address_at(0u32, Scope::External);
        let receiver = unified::Receiver::Orchard(address.to_raw_address_bytes());
        let ua = unified::Address::try_from_items(vec![receiver])
            .map_err(|_| OrchardKeyError::SerializationError)?;
        Ok(OrchardAddress::new(self.network, ua))
    }

    /// Spend validating key `ak`
    pub fn ak(&self) -> OrchardSpendValidatingKey {
        OrchardSpendValidatingKey {
            key: self.fvk.ak().clone(),
        }
    }

    /// Nullifier deriving key `nk`
    pub fn nk(&self) -> OrchardNullifierDerivingKey {
        OrchardNullifierDerivingKey { nk: *self.fvk.nk() }
    }

    /// Commit IVK randomness `rivk` for the external scope
    pub fn rivk(&self) -> OrchardCommitIvkRandomness {
        OrchardCommitIvkRandomness {
            rivk: self.fvk.rivk(Scope::External),
        }
    }

    /// Network this key is encoded for
    pub fn network(&self) -> ZcashNetwork {
        self.network
    }
}

impl PartialEq for OrchardFullViewingKey {
    fn eq(&self, other: &Self) -> bool {
        self.network == other.network && self.fvk.to_bytes() == other.fvk.to_bytes()
    }
}

impl Eq for OrchardFullViewingKey {}

impl fmt::Debug for OrchardFullViewingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrchardFullViewingKey")
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}
