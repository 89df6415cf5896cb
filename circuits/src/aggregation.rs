//! Proof aggregation handles.
//!
//! An [`AggregationObject`] stands for "these underlying proofs verify".
//! The circuits never look inside one; they only ask a [`ProofAggregator`]
//! to fold two handles into one.

use std::io::{Cursor, Read};

use serde::Serialize;

use crate::error::Result;
use crate::serialize::{Decode, Encode};

/// Opaque, copyable aggregation token. The all-zero token is "nothing yet".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AggregationObject(#[serde(with = "hex::serde")] pub [u8; 32]);

impl AggregationObject {
    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl Encode for AggregationObject {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }
}

impl Decode for AggregationObject {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        let mut bytes = [0u8; 32];
        reader.read_exact(&mut bytes)?;
        Ok(Self(bytes))
    }
}

/// The "aggregate two proof handles into one" capability of the proof backend.
pub trait ProofAggregator {
    fn combine(&self, a: &AggregationObject, b: &AggregationObject) -> AggregationObject;

    /// Handle for a freshly produced proof over the given public inputs.
    fn prove(&self, public_inputs: &[u8]) -> AggregationObject;
}

// ============================================================================
// Digest Aggregator (mock backend)
// ============================================================================

/// Mock backend: handles are BLAKE3 digests, so equal inputs give equal
/// handles and any change in either input changes the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestAggregator;

const COMBINE_DOMAIN: &[u8] = b"tessera:aggregate:v1";
const PROVE_DOMAIN: &[u8] = b"tessera:mock-proof:v1";

impl ProofAggregator for DigestAggregator {
    fn combine(&self, a: &AggregationObject, b: &AggregationObject) -> AggregationObject {
        let mut hasher = blake3::Hasher::new();
        hasher.update(COMBINE_DOMAIN);
        hasher.update(&a.0);
        hasher.update(&b.0);
        AggregationObject(*hasher.finalize().as_bytes())
    }

    fn prove(&self, public_inputs: &[u8]) -> AggregationObject {
        let mut hasher = blake3::Hasher::new();
        hasher.update(PROVE_DOMAIN);
        hasher.update(public_inputs);
        AggregationObject(*hasher.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_is_ordered_and_deterministic() {
        let agg = DigestAggregator;
        let a = AggregationObject([1u8; 32]);
        let b = AggregationObject([2u8; 32]);
        assert_eq!(agg.combine(&a, &b), agg.combine(&a, &b));
        assert_ne!(agg.combine(&a, &b), agg.combine(&b, &a));
        assert!(!agg.combine(&a, &b).is_empty());
    }

    #[test]
    fn test_prove_differs_from_combine() {
        let agg = DigestAggregator;
        let empty = AggregationObject::default();
        assert!(empty.is_empty());
        assert_ne!(agg.prove(&[0u8; 64]), agg.combine(&empty, &empty));
    }
}
