//! Rollup circuits
//!
//! Base rollups apply two kernels' effects to the live trees; merge
//! rollups pair up equal-height results; the root rollup closes the block.
//!
//! ```text
//!                      root
//!                    /      \
//!               merge        merge
//!              /    \        /    \
//!          base    base   base    base
//!          k0 k1   k0 k1  k0 k1   k0 k1
//! ```

pub mod base;
pub mod components;
pub mod merge;
pub mod root;

pub use base::base_rollup_circuit;
pub use components::{compute_calldata_hash, compute_messages_hash};
pub use merge::merge_rollup_circuit;
pub use root::root_rollup_circuit;
