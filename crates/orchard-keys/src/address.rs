//! Unified Addresses carrying an Orchard receiver

use crate::{OrchardKeyError, OrchardResult, ZcashNetwork};
use zcash_address::unified::{self, Container, Encoding};

/// A Unified Address and the network it is encoded for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchardAddress {
    network: ZcashNetwork,
    addr: unified::Address,
}

impl OrchardAddress {
    pub(crate) fn new(network: ZcashNetwork, addr: unified::Address) -> Self {
        OrchardAddress { network, addr }
    }

    /// Parse a string-encoded Unified Address
    pub fn new_from_string(encoded: &str) -> OrchardResult<Self> {
        let (network_type, addr) =
            unified::Address::decode(encoded).map_err(|_| OrchardKeyError::DeserializationError)?;
        Ok(OrchardAddress {
            network: ZcashNetwork::from_network_type(network_type)?,
            addr,
        })
    }

    /// String encoding of the Unified Address
    pub fn string_encoded(&self) -> String {
        self.addr.encode(&self.network.network_type())
    }

    /// Network the address belongs to
    pub fn network(&self) -> ZcashNetwork {
        self.network
    }

    /// Raw 43-byte Orchard receiver, if the address has one
    pub fn orchard_receiver(&self) -> Option<[u8; 43]> {
        self.addr.items().into_iter().find_map(|receiver| match receiver {
            unified::Receiver::Orchard(bytes) => Some(bytes),
            _ => None,
        })
    }
}
