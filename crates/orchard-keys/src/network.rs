//! Zcash network tags

use crate::{OrchardKeyError, OrchardResult};
use zcash_protocol::consensus::NetworkType;
use zcash_protocol::constants::{mainnet, testnet};

/// Network a key or address is encoded for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZcashNetwork {
    /// Zcash mainnet
    Mainnet,
    /// Zcash testnet
    Testnet,
}

impl ZcashNetwork {
    pub(crate) fn network_type(&self) -> NetworkType {
        match self {
            ZcashNetwork::Mainnet => NetworkType::Main,
            ZcashNetwork::Testnet => NetworkType::Test,
        }
    }

    /// ZIP-32 coin type used for account derivation
    pub fn coin_type(&self) -> u32 {
        match self {
            ZcashNetwork::Mainnet => mainnet::COIN_TYPE,
            ZcashNetwork::Testnet => testnet::COIN_TYPE,
        }
    }

    /// Regtest has no variant here and is rejected, so decoded strings
    /// re-encode to the same prefix
    pub(crate) fn from_network_type(network_type: NetworkType) -> OrchardResult<Self> {
        match network_type {
            NetworkType::Main => Ok(ZcashNetwork::Mainnet),
            NetworkType::Test => Ok(ZcashNetwork::Testnet),
            NetworkType::Regtest => Err(OrchardKeyError::DeserializationError),
        }
    }
}

impl std::str::FromStr for ZcashNetwork {
    type Err = OrchardKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(ZcashNetwork::Mainnet),
            "testnet" | "test" => Ok(ZcashNetwork::Testnet),
            other => Err(OrchardKeyError::OtherError {
                message: format!("unknown network {other}"),
            }),
        }
    }
}
