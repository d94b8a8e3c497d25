//! Orchard key hierarchy for FROST-controlled spend authority
//!
//! A FROST(Pallas) group verifying key is used directly as the Orchard spend
//! validating key `ak`. The remaining full viewing key components (`nk`,
//! `rivk`) come from a ZIP-32 seed, after which the key can be exported as a
//! Unified Full Viewing Key and used to derive a Unified Address.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod address;
mod keys;
mod network;

pub use address::OrchardAddress;
pub use keys::{
    OrchardCommitIvkRandomness, OrchardFullViewingKey, OrchardKeyParts,
    OrchardNullifierDerivingKey, OrchardSpendValidatingKey,
};
pub use network::ZcashNetwork;

use thiserror::Error;

/// Orchard key errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchardKeyError {
    /// ZIP-32 derivation or key composition failed
    #[error("Failed to derive key: {message}")]
    KeyDerivationError {
        /// Underlying failure
        message: String,
    },

    /// Key could not be encoded
    #[error("Failed to serialize key")]
    SerializationError,

    /// Bytes or string do not encode a valid key for the requested network
    #[error("Failed to deserialize key")]
    DeserializationError,

    /// Any other failure
    #[error("Orchard key operation failed: {message}")]
    OtherError {
        /// Underlying failure
        message: String,
    },
}

/// Result type for Orchard key operations
pub type OrchardResult<T> = Result<T, OrchardKeyError>;
