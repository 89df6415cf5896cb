//! Kernel and rollup circuits for the Tessera privacy rollup.
//!
//! Every circuit is a plain function generic over a [`Composer`]: the same
//! code runs natively for simulation and emits R1CS constraints through
//! arkworks when proving.

pub mod abis;
pub mod aggregation;
pub mod bounded_vec;
pub mod composer;
pub mod constants;
pub mod entry;
pub mod error;
pub mod field;
pub mod hash;
pub mod kernel;
pub mod merkle;
pub mod rollup;
pub mod serialize;

// Re-export key types for external usage
pub use aggregation::{AggregationObject, DigestAggregator, ProofAggregator};
pub use composer::{
    Composer, ConstraintFailure, Diagnostics, FailureMode, NativeComposer, R1csComposer,
};
pub use error::{CircuitError, Result};
pub use kernel::{CallData, KernelState, KernelVerificationKey, execute_call_stack, kernel_circuit};
pub use merkle::{MerkleTree, RollupVkRoots, WorldState};
pub use rollup::{base_rollup_circuit, merge_rollup_circuit, root_rollup_circuit};
