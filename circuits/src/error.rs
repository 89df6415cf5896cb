//! Fatal input-validation errors.
//!
//! Anything here aborts the current call with no partial result. Protocol
//! violations that a proof would merely fail to satisfy are not errors; they
//! go through [`crate::composer::Diagnostics`].
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CircuitError {
    /// Input ended before the record was complete
    #[error("Truncated input: {0}")]
    Io(#[from] std::io::Error),

    /// Decoded 32 bytes are not below the field modulus
    #[error("Non-canonical field element: 0x{0}")]
    NonCanonicalField(String),

    #[error("Invalid boolean byte: {0}")]
    InvalidBool(u8),

    #[error("Invalid rollup type tag: {0}")]
    InvalidRollupType(u8),

    #[error("Invalid UTF-8 string: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),

    #[error("Length prefix {len} exceeds remaining input of {remaining} bytes")]
    LengthOverflow { len: usize, remaining: usize },

    #[error("Expected {expected} array items, got {got}")]
    ArrayLength { expected: usize, got: usize },

    /// A bounded array had a populated slot after an empty one
    #[error("Non-contiguous bounded array: populated slot {index} follows an empty slot")]
    NonContiguous { index: usize },

    #[error("Capacity exceeded for {what}: at most {capacity} items")]
    CapacityExceeded { what: &'static str, capacity: usize },

    #[error("Too many leaves: got {got}, tree holds {max}")]
    TooManyLeaves { got: usize, max: usize },

    #[error("Subtree of height {subtree_height} cannot be inserted at leaf {index}")]
    MisalignedInsertion { index: u64, subtree_height: u32 },

    #[error("Tree of depth {depth} has no room at leaf {index}")]
    TreeFull { depth: usize, index: u64 },

    #[error("Leaf index {index} out of range for depth {depth}")]
    InvalidLeafIndex { index: u64, depth: usize },

    #[error("Empty call stack: a transaction needs at least one call")]
    EmptyCallStack,

    /// The constraint backend itself failed (not an unsatisfied constraint)
    #[error("Constraint synthesis failed: {0}")]
    Synthesis(String),
}

pub type Result<T> = std::result::Result<T, CircuitError>;
