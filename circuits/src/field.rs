//! Field element helpers: canonical 32-byte big-endian encoding and the
//! high/low split used to carry 256-bit digests as two field elements.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};

use crate::error::{CircuitError, Result};

pub const FIELD_BYTES: usize = 32;

pub fn fr_to_bytes(value: &Fr) -> [u8; FIELD_BYTES] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; FIELD_BYTES];
    out[FIELD_BYTES - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Rejects encodings at or above the modulus.
pub fn fr_from_bytes(bytes: &[u8; FIELD_BYTES]) -> Result<Fr> {
    let value = Fr::from_be_bytes_mod_order(bytes);
    if fr_to_bytes(&value) != *bytes {
        return Err(CircuitError::NonCanonicalField(hex::encode(bytes)));
    }
    Ok(value)
}

/// Reduces arbitrary bytes into the field. Only for values that are not
/// field elements on the wire (signature scalars, digests).
pub fn fr_from_bytes_reduced(bytes: &[u8]) -> Fr {
    Fr::from_be_bytes_mod_order(bytes)
}

pub fn fr_to_hex(value: &Fr) -> String {
    format!("0x{}", hex::encode(fr_to_bytes(value)))
}

/// Splits a 256-bit digest into `[high, low]`, each half zero-extended on the left.
pub fn split_digest(digest: &[u8; 32]) -> [Fr; 2] {
    let high = Fr::from_be_bytes_mod_order(&digest[..16]);
    let low = Fr::from_be_bytes_mod_order(&digest[16..]);
    [high, low]
}

/// Inverse of [`split_digest`]. Fails if either half is wider than 128 bits.
pub fn join_digest(halves: &[Fr; 2]) -> Result<[u8; 32]> {
    let mut out = [0u8; 32];
    for (i, half) in halves.iter().enumerate() {
        let bytes = fr_to_bytes(half);
        if bytes[..16].iter().any(|b| *b != 0) {
            return Err(CircuitError::NonCanonicalField(hex::encode(bytes)));
        }
        out[i * 16..(i + 1) * 16].copy_from_slice(&bytes[16..]);
    }
    Ok(out)
}

/// Low 64 bits of a field element.
pub fn fr_low_u64(value: &Fr) -> u64 {
    value.into_bigint().as_ref()[0]
}
