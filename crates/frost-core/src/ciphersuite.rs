//! FROST(Pallas, BLAKE2b-512) ciphersuite
//!
//! Group: Pallas with the Orchard spend authorization base as generator, so
//! group verifying keys double as Orchard `ak` values.
//! Hash: BLAKE2b-512 personalized with `Zcash_RedPallasH`, reduced wide into
//! the scalar field. Every FROST hash is domain separated by the context
//! string followed by a short tag, the signature challenge uses the plain
//! RedPallas `H*`.

use crate::{FrostError, FrostResult};
use blake2b_simd::{Params, State};
use ff::{Field, FromUniformBytes, PrimeField};
use group::{Group, GroupEncoding};
use pasta_curves::arithmetic::CurveExt;
use pasta_curves::pallas;
use std::sync::OnceLock;

/// Scalar field element
pub type Scalar = pallas::Scalar;

/// Group element
pub type Element = pallas::Point;

/// Ciphersuite context string, also carried in every serialized header
pub const CONTEXT_STRING: &str = "FROST(Pallas, BLAKE2b-512)";

/// BLAKE2b personalization shared with RedPallas
const PERSONALIZATION: &[u8; 16] = b"Zcash_RedPallasH";

/// Orchard spend authorization base `GroupHash("z.cash:Orchard", "G")`
pub fn generator() -> Element {
    static SPEND_AUTH_BASE: OnceLock<Element> = OnceLock::new();
    *SPEND_AUTH_BASE.get_or_init(|| pallas::Point::hash_to_curve("z.cash:Orchard")(b"G"))
}

/// Wide-reduction hash into the scalar field (`H*` in the Zcash protocol)
#[derive(Clone)]
pub(crate) struct HStar {
    state: State,
}

impl Default for HStar {
    fn default() -> Self {
        let state = Params::new()
            .hash_length(64)
            .personal(PERSONALIZATION)
            .to_state();
        HStar { state }
    }
}

impl HStar {
    /// Hasher prefixed with the context string and a domain tag
    fn tagged(tag: &[u8]) -> Self {
        let mut hasher = HStar::default();
        hasher.update(CONTEXT_STRING.as_bytes()).update(tag);
        hasher
    }

    pub(crate) fn update(&mut self, data: &[u8]) -> &mut Self {
        self.state.update(data);
        self
    }

    pub(crate) fn finalize(&self) -> Scalar {
        let mut wide = [0u8; 64];
        wide.copy_from_slice(self.state.finalize().as_bytes());
        Scalar::from_uniform_bytes(&wide)
    }
}

fn hash_to_array(inputs: &[&[u8]]) -> [u8; 64] {
    let mut state = Params::new()
        .hash_length(64)
        .personal(PERSONALIZATION)
        .to_state();
    for input in inputs {
        state.update(input);
    }
    let mut output = [0u8; 64];
    output.copy_from_slice(state.finalize().as_bytes());
    output
}

/// H1: binding factor
pub(crate) fn h1(m: &[u8]) -> Scalar {
    HStar::tagged(b"rho").update(m).finalize()
}

/// H2: signature challenge, identical to the RedPallas challenge
pub(crate) fn h2(m: &[u8]) -> Scalar {
    HStar::default().update(m).finalize()
}

/// H3: nonce derivation
pub(crate) fn h3(m: &[u8]) -> Scalar {
    HStar::tagged(b"nonce").update(m).finalize()
}

/// H4: message digest
pub(crate) fn h4(m: &[u8]) -> [u8; 64] {
    hash_to_array(&[CONTEXT_STRING.as_bytes(), b"msg", m])
}

/// H5: commitment list digest
pub(crate) fn h5(m: &[u8]) -> [u8; 64] {
    hash_to_array(&[CONTEXT_STRING.as_bytes(), b"com", m])
}

/// Proof of knowledge challenge for the DKG
pub(crate) fn hdkg(m: &[u8]) -> Scalar {
    HStar::tagged(b"dkg").update(m).finalize()
}

/// Identifier derivation from arbitrary bytes
pub(crate) fn hid(m: &[u8]) -> Scalar {
    HStar::tagged(b"id").update(m).finalize()
}

/// Session randomizer derivation
pub(crate) fn hrandomizer(m: &[u8]) -> Scalar {
    HStar::tagged(b"randomizer").update(m).finalize()
}

/// Encode a group element (32 bytes, compressed)
pub fn serialize_element(element: &Element) -> [u8; 32] {
    element.to_bytes()
}

/// Decode a group element, rejecting non-canonical encodings and the identity
pub fn deserialize_element(bytes: &[u8]) -> FrostResult<Element> {
    let repr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| FrostError::MalformedElement)?;
    let element: Option<Element> = pallas::Point::from_bytes(&repr).into();
    match element {
        Some(e) if bool::from(e.is_identity()) => Err(FrostError::InvalidIdentityElement),
        Some(e) => Ok(e),
        None => Err(FrostError::MalformedElement),
    }
}

/// Encode a scalar (32 bytes, little-endian)
pub fn serialize_scalar(scalar: &Scalar) -> [u8; 32] {
    scalar.to_repr()
}

/// Decode a canonical scalar
pub fn deserialize_scalar(bytes: &[u8]) -> FrostResult<Scalar> {
    let repr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| FrostError::MalformedScalar)?;
    Option::<Scalar>::from(Scalar::from_repr(repr)).ok_or(FrostError::MalformedScalar)
}

/// Whether the element's encoding has a clear sign bit (ỹ = 0)
pub fn has_even_y(element: &Element) -> bool {
    serialize_element(element)[31] >> 7 == 0
}

/// Sample a uniformly random nonzero scalar
pub fn random_nonzero<R: rand_core::RngCore + rand_core::CryptoRng>(rng: &mut R) -> Scalar {
    loop {
        let scalar = Scalar::random(&mut *rng);
        if !bool::from(scalar.is_zero()) {
            return scalar;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_generator_is_not_identity() {
        assert!(!bool::from(generator().is_identity()));
        assert_ne!(generator(), pallas::Point::generator());
    }

    #[test]
    fn test_element_roundtrip() {
        let element = generator() * Scalar::from(7u64);
        let bytes = serialize_element(&element);
        assert_eq!(deserialize_element(&bytes).unwrap(), element);
    }

    #[test]
    fn test_identity_is_rejected() {
        let bytes = serialize_element(&Element::identity());
        assert_eq!(
            deserialize_element(&bytes),
            Err(FrostError::InvalidIdentityElement)
        );
    }

    #[test]
    fn test_non_canonical_scalar_is_rejected() {
        assert_eq!(
            deserialize_scalar(&[0xff; 32]),
            Err(FrostError::MalformedScalar)
        );
        assert_eq!(deserialize_scalar(&[1u8; 31]), Err(FrostError::MalformedScalar));
    }

    #[test]
    fn test_domain_separation() {
        let m = b"same input";
        assert_ne!(h1(m), h3(m));
        assert_ne!(h1(m), h2(m));
        assert_ne!(h4(m), h5(m));
        assert_ne!(hdkg(m), hid(m));
    }

    #[test]
    fn test_random_nonzero() {
        let mut rng = OsRng;
        assert!(!bool::from(random_nonzero(&mut rng).is_zero()));
    }
}
