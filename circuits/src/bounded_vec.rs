//! Fixed-capacity ordered sequences.
//!
//! Kernel outputs carry at most `N` items of each kind. The in-memory form
//! only holds the populated prefix; the wire form always has `N` slots.

use std::io::Cursor;

use ark_bn254::Fr;
use ark_std::Zero;

use crate::error::{CircuitError, Result};
use crate::serialize::{Decode, Encode};

/// A value with a canonical "nothing here" representative.
pub trait Empty {
    fn empty() -> Self;
    fn is_empty(&self) -> bool;
}

impl Empty for Fr {
    fn empty() -> Self {
        Fr::zero()
    }

    fn is_empty(&self) -> bool {
        self.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedVec<T, const N: usize> {
    items: Vec<T>,
}

impl<T, const N: usize> Default for BoundedVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> BoundedVec<T, N> {
    pub const CAPACITY: usize = N;

    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(N),
        }
    }

    pub fn from_vec(items: Vec<T>) -> Result<Self> {
        if items.len() > N {
            return Err(CircuitError::CapacityExceeded {
                what: "bounded array",
                capacity: N,
            });
        }
        Ok(Self { items })
    }

    /// Appends `item`; overflowing the capacity is fatal.
    pub fn push(&mut self, item: T, what: &'static str) -> Result<()> {
        if self.items.len() == N {
            return Err(CircuitError::CapacityExceeded { what, capacity: N });
        }
        self.items.push(item);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Empty + Clone, const N: usize> BoundedVec<T, N> {
    /// All `N` slots, empties included.
    pub fn padded(&self) -> impl Iterator<Item = T> + '_ {
        self.items
            .iter()
            .cloned()
            .chain(std::iter::repeat_with(T::empty).take(N - self.items.len()))
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a BoundedVec<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Encode + Empty, const N: usize> Encode for BoundedVec<T, N> {
    fn encode(&self, out: &mut Vec<u8>) {
        for item in &self.items {
            item.encode(out);
        }
        for _ in self.items.len()..N {
            T::empty().encode(out);
        }
    }
}

impl<T: Decode + Empty, const N: usize> Decode for BoundedVec<T, N> {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        let mut items = Vec::with_capacity(N);
        let mut seen_empty = false;
        for index in 0..N {
            let item = T::decode(reader)?;
            if item.is_empty() {
                seen_empty = true;
            } else if seen_empty {
                return Err(CircuitError::NonContiguous { index });
            } else {
                items.push(item);
            }
        }
        Ok(Self { items })
    }
}
