//! Positional big-endian codec shared by every record.
//!
//! No tags or field names go on the wire: both sides agree on field order.
//!
//! | Type              | Layout                                   |
//! |-------------------|------------------------------------------|
//! | `Fr`              | 32 bytes, canonical                      |
//! | `u8` / `bool`     | 1 byte (`bool` must be 0 or 1)           |
//! | `u32` / `u64`     | 4 / 8 bytes                              |
//! | `[T; N]`          | N items, no prefix                       |
//! | `Vec<T>`/`String` | u32 length prefix, then items            |
//! | `BoundedVec<T,N>` | exactly N slots, empty slots zero-filled |

use std::io::{Cursor, Read};

use ark_bn254::Fr;
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

use crate::error::{CircuitError, Result};
use crate::field::{FIELD_BYTES, fr_from_bytes, fr_to_bytes};

pub trait Encode {
    fn encode(&self, out: &mut Vec<u8>);

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

pub trait Decode: Sized {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self>;
}

/// Decodes one record and rejects anything left over.
pub fn from_bytes<T: Decode>(bytes: &[u8]) -> Result<T> {
    let mut reader = Cursor::new(bytes);
    let value = T::decode(&mut reader)?;
    match remaining(&reader) {
        0 => Ok(value),
        extra => Err(CircuitError::TrailingBytes(extra)),
    }
}

fn remaining(reader: &Cursor<&[u8]>) -> usize {
    reader.get_ref().len().saturating_sub(reader.position() as usize)
}

fn read_len(reader: &mut Cursor<&[u8]>) -> Result<usize> {
    let len = reader.read_u32::<BigEndian>()? as usize;
    let available = remaining(reader);
    if len > available {
        return Err(CircuitError::LengthOverflow {
            len,
            remaining: available,
        });
    }
    Ok(len)
}

// ============================================================================
// Scalars
// ============================================================================

impl Encode for u8 {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }
}

impl Decode for u8 {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        Ok(reader.read_u8()?)
    }
}

impl Encode for bool {
    fn encode(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }
}

impl Decode for bool {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CircuitError::InvalidBool(other)),
        }
    }
}

impl Encode for u32 {
    fn encode(&self, out: &mut Vec<u8>) {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, *self);
        out.extend_from_slice(&buf);
    }
}

impl Decode for u32 {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        Ok(reader.read_u32::<BigEndian>()?)
    }
}

impl Encode for u64 {
    fn encode(&self, out: &mut Vec<u8>) {
        let mut buf = [0u8; 8];
        BigEndian::write_u64(&mut buf, *self);
        out.extend_from_slice(&buf);
    }
}

impl Decode for u64 {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        Ok(reader.read_u64::<BigEndian>()?)
    }
}

impl Encode for Fr {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&fr_to_bytes(self));
    }
}

impl Decode for Fr {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        let mut bytes = [0u8; FIELD_BYTES];
        reader.read_exact(&mut bytes)?;
        fr_from_bytes(&bytes)
    }
}

// ============================================================================
// Sequences
// ============================================================================

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, out: &mut Vec<u8>) {
        for item in self {
            item.encode(out);
        }
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        let items = (0..N)
            .map(|_| T::decode(reader))
            .collect::<Result<Vec<T>>>()?;
        items.try_into().map_err(|items: Vec<T>| CircuitError::ArrayLength {
            expected: N,
            got: items.len(),
        })
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, out: &mut Vec<u8>) {
        (self.len() as u32).encode(out);
        for item in self {
            item.encode(out);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        let len = read_len(reader)?;
        (0..len).map(|_| T::decode(reader)).collect()
    }
}

impl Encode for String {
    fn encode(&self, out: &mut Vec<u8>) {
        (self.len() as u32).encode(out);
        out.extend_from_slice(self.as_bytes());
    }
}

impl Decode for String {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        let len = read_len(reader)?;
        let mut bytes = vec![0u8; len];
        reader.read_exact(&mut bytes)?;
        Ok(String::from_utf8(bytes)?)
    }
}

// Tuples carry multi-argument entry point inputs.
macro_rules! impl_tuple_codec {
    ($($name:ident),+) => {
        impl<$($name: Encode),+> Encode for ($($name,)+) {
            #[allow(non_snake_case)]
            fn encode(&self, out: &mut Vec<u8>) {
                let ($($name,)+) = self;
                $( $name.encode(out); )+
            }
        }

        impl<$($name: Decode),+> Decode for ($($name,)+) {
            fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
                Ok(($($name::decode(reader)?,)+))
            }
        }
    };
}

impl_tuple_codec!(A, B);
impl_tuple_codec!(A, B, C);
impl_tuple_codec!(A, B, C, D);

/// Implements [`Encode`] and [`Decode`] for a struct, fields in the given order.
macro_rules! impl_codec {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::serialize::Encode for $ty {
            fn encode(&self, out: &mut Vec<u8>) {
                $( $crate::serialize::Encode::encode(&self.$field, out); )*
            }
        }

        impl $crate::serialize::Decode for $ty {
            fn decode(reader: &mut std::io::Cursor<&[u8]>) -> $crate::error::Result<Self> {
                Ok(Self {
                    $( $field: $crate::serialize::Decode::decode(reader)?, )*
                })
            }
        }
    };
}

pub(crate) use impl_codec;
