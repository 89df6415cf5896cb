//! Kernel state transition
//!
//! Proves that one call's declared effects are legitimate and folds them
//! onto everything the transaction has produced so far.
//!
//! ```text
//!   ┌──────────────────────────┐  call 0   ┌─────────────────────┐
//!   │ Seed { signed tx, roots }├──────────►│ KernelPublicInputs  │
//!   └──────────────────────────┘           └─────────┬───────────┘
//!                                                    │ wrap as PreviousKernelData
//!                                                    ▼
//!   ┌──────────────────────────┐  call n   ┌─────────────────────┐
//!   │ Chained(previous kernel) ├──────────►│ KernelPublicInputs  │──► … ──► rollup
//!   └──────────────────────────┘           └─────────────────────┘
//! ```
//!
//! Iteration stops when both call stacks are exhausted.

mod transition;

use ark_bn254::Fr;

use crate::abis::{
    CallStackItem, HistoricTreeRoots, KernelPublicInputs, MembershipWitness, PreviousKernelData,
    SignedTxRequest, VerificationKeyData,
};
use crate::aggregation::{AggregationObject, ProofAggregator};
use crate::composer::Composer;
use crate::constants::{CONTRACT_TREE_HEIGHT, FUNCTION_TREE_HEIGHT, VK_TREE_HEIGHT};
use crate::error::{CircuitError, Result};
use crate::serialize::Encode;

pub use transition::kernel_circuit;

/// One executed call, with the witnesses the kernel needs to accept it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallData {
    pub call_stack_item: CallStackItem,
    pub proof: AggregationObject,
    pub vk: VerificationKeyData,
    pub acir_hash: Fr,
    /// Function leaf position in the contract's function tree
    pub function_leaf_membership_witness: MembershipWitness<FUNCTION_TREE_HEIGHT>,
    /// Contract leaf position in the historic contract tree
    pub contract_leaf_membership_witness: MembershipWitness<CONTRACT_TREE_HEIGHT>,
}

/// The two states of the kernel machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelState {
    /// No prior kernel: the first call of a transaction
    Seed {
        signed_tx_request: SignedTxRequest,
        historic_tree_roots: HistoricTreeRoots,
    },
    Chained(PreviousKernelData),
}

/// The kernel circuit's own key and its place in the kernel vk tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelVerificationKey {
    pub vk: VerificationKeyData,
    pub vk_index: u32,
    pub vk_path: [Fr; VK_TREE_HEIGHT],
}

/// Runs the kernel over every call of a transaction, seed first.
///
/// `calls` must be ordered the way the call stacks pop: each call after the
/// first is the current top of the private stack, or of the public stack
/// once the private one is empty.
pub fn execute_call_stack<C: Composer, A: ProofAggregator>(
    composer: &mut C,
    aggregator: &A,
    signed_tx_request: &SignedTxRequest,
    historic_tree_roots: HistoricTreeRoots,
    calls: &[CallData],
    kernel_vk: &KernelVerificationKey,
) -> Result<PreviousKernelData> {
    let (first, rest) = calls.split_first().ok_or(CircuitError::EmptyCallStack)?;

    let seed = KernelState::Seed {
        signed_tx_request: *signed_tx_request,
        historic_tree_roots,
    };
    let mut previous = finish_iteration(
        aggregator,
        kernel_circuit(composer, aggregator, &seed, first)?,
        kernel_vk,
    );

    for call in rest {
        let state = KernelState::Chained(previous);
        let public_inputs = kernel_circuit(composer, aggregator, &state, call)?;
        previous = finish_iteration(aggregator, public_inputs, kernel_vk);
    }

    let end = &previous.public_inputs.end;
    composer.assert_true(
        end.private_call_stack.is_empty(),
        "private call stack not exhausted",
    );
    composer.assert_true(
        end.public_call_stack.is_empty(),
        "public call stack not exhausted",
    );

    log::debug!(
        "Transaction kernel done after {} calls: {} commitments, {} nullifiers, {} contracts",
        calls.len(),
        end.new_commitments.len(),
        end.new_nullifiers.len(),
        end.new_contracts.len()
    );
    Ok(previous)
}

fn finish_iteration<A: ProofAggregator>(
    aggregator: &A,
    public_inputs: KernelPublicInputs,
    kernel_vk: &KernelVerificationKey,
) -> PreviousKernelData {
    let proof = aggregator.prove(&public_inputs.to_bytes());
    PreviousKernelData {
        public_inputs,
        proof,
        vk: kernel_vk.vk.clone(),
        vk_index: kernel_vk.vk_index,
        vk_path: kernel_vk.vk_path,
    }
}
