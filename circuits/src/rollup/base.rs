//! Base rollup: two kernels' effects applied to the live trees.

use ark_bn254::Fr;
use ark_std::Zero;
use sha2::{Digest, Sha256};

use crate::abis::{
    AppendOnlyTreeSnapshot, BaseOrMergeRollupPublicInputs, BaseRollupInputs, ConstantRollupData,
    PreviousKernelData, RollupType,
};
use crate::aggregation::ProofAggregator;
use crate::bounded_vec::Empty;
use crate::composer::Composer;
use crate::constants::{
    CONTRACT_SUBTREE_HEIGHT, KERNEL_PUBLIC_DATA_UPDATE_REQUESTS_LENGTH, NULLIFIER_SUBTREE_HEIGHT,
    PRIVATE_DATA_SUBTREE_HEIGHT,
};
use crate::error::Result;
use crate::field::{fr_low_u64, fr_to_bytes, split_digest};
use crate::merkle::{
    check_membership, compute_tree_root, empty_tree_root, insert_subtree_to_snapshot_tree,
    root_from_path,
};

pub fn base_rollup_circuit<C: Composer, A: ProofAggregator>(
    composer: &mut C,
    aggregator: &A,
    inputs: &BaseRollupInputs,
) -> Result<BaseOrMergeRollupPublicInputs> {
    let [k0, k1] = &inputs.kernel_data;

    composer.assert_true(
        k0.public_inputs.constants.historic_tree_roots
            == k1.public_inputs.constants.historic_tree_roots,
        "kernels were built against different historic roots",
    );
    verify_historic_roots(composer, inputs);
    verify_kernel_vks(composer, &inputs.kernel_data, &inputs.constants);

    let commitments = collect_leaves(&inputs.kernel_data, |k| {
        k.public_inputs.end.new_commitments.padded().collect()
    });
    let end_private_data_tree_snapshot = insert_leaves(
        composer,
        &inputs.start_private_data_tree_snapshot,
        &inputs.new_commitments_subtree_sibling_path,
        &commitments,
        PRIVATE_DATA_SUBTREE_HEIGHT,
        "private data tree insertion",
    )?;

    let nullifiers = collect_leaves(&inputs.kernel_data, |k| {
        k.public_inputs.end.new_nullifiers.padded().collect()
    });
    let end_nullifier_tree_snapshot = insert_leaves(
        composer,
        &inputs.start_nullifier_tree_snapshot,
        &inputs.new_nullifiers_subtree_sibling_path,
        &nullifiers,
        NULLIFIER_SUBTREE_HEIGHT,
        "nullifier tree insertion",
    )?;

    let contract_leaves = collect_leaves(&inputs.kernel_data, |k| {
        k.public_inputs
            .end
            .new_contracts
            .padded()
            .map(|c| c.hash())
            .collect()
    });
    let end_contract_tree_snapshot = insert_leaves(
        composer,
        &inputs.start_contract_tree_snapshot,
        &inputs.new_contracts_subtree_sibling_path,
        &contract_leaves,
        CONTRACT_SUBTREE_HEIGHT,
        "contract tree insertion",
    )?;

    let end_public_data_tree_root = apply_public_data_writes(composer, inputs);

    log::debug!(
        "Base rollup: private data {} -> {}, nullifiers {} -> {}, contracts {} -> {}",
        inputs.start_private_data_tree_snapshot.next_available_leaf_index,
        end_private_data_tree_snapshot.next_available_leaf_index,
        inputs.start_nullifier_tree_snapshot.next_available_leaf_index,
        end_nullifier_tree_snapshot.next_available_leaf_index,
        inputs.start_contract_tree_snapshot.next_available_leaf_index,
        end_contract_tree_snapshot.next_available_leaf_index,
    );

    Ok(BaseOrMergeRollupPublicInputs {
        rollup_type: RollupType::Base,
        rollup_subtree_height: 0,
        end_aggregation_object: aggregator.combine(&k0.proof, &k1.proof),
        constants: inputs.constants,
        start_private_data_tree_snapshot: inputs.start_private_data_tree_snapshot,
        end_private_data_tree_snapshot,
        start_nullifier_tree_snapshot: inputs.start_nullifier_tree_snapshot,
        end_nullifier_tree_snapshot,
        start_contract_tree_snapshot: inputs.start_contract_tree_snapshot,
        end_contract_tree_snapshot,
        start_public_data_tree_root: inputs.start_public_data_tree_root,
        end_public_data_tree_root,
        calldata_hash: compute_kernels_calldata_hash(&inputs.kernel_data),
    })
}

/// Kernel 0's leaves, then kernel 1's.
fn collect_leaves(
    kernels: &[PreviousKernelData; 2],
    leaves: impl Fn(&PreviousKernelData) -> Vec<Fr>,
) -> Vec<Fr> {
    kernels.iter().flat_map(leaves).collect()
}

/// Inserts `leaves` as one subtree, or leaves the snapshot alone when they are all zero.
fn insert_leaves<C: Composer>(
    composer: &mut C,
    snapshot: &AppendOnlyTreeSnapshot,
    sibling_path: &[Fr],
    leaves: &[Fr],
    subtree_height: u32,
    message: &str,
) -> Result<AppendOnlyTreeSnapshot> {
    if leaves.iter().all(Fr::is_zero) {
        return Ok(*snapshot);
    }
    let height = subtree_height as usize;
    let subtree_root = compute_tree_root(leaves, height, Fr::zero())?;
    insert_subtree_to_snapshot_tree(
        composer,
        snapshot,
        sibling_path,
        empty_tree_root(height),
        subtree_root,
        subtree_height,
        message,
    )
}

/// The roots each kernel read from must be leaves of the block's historic trees.
fn verify_historic_roots<C: Composer>(composer: &mut C, inputs: &BaseRollupInputs) {
    let constants = &inputs.constants;
    for (i, kernel) in inputs.kernel_data.iter().enumerate() {
        let roots = &kernel.public_inputs.constants.historic_tree_roots;
        check_membership(
            composer,
            roots.private_data_tree_root,
            &inputs.historic_private_data_tree_root_membership_witnesses[i],
            constants
                .start_tree_of_historic_private_data_tree_roots_snapshot
                .root,
            "historic private data tree root not found",
        );
        check_membership(
            composer,
            roots.contract_tree_root,
            &inputs.historic_contract_tree_root_membership_witnesses[i],
            constants.start_tree_of_historic_contract_tree_roots_snapshot.root,
            "historic contract tree root not found",
        );
    }
}

fn verify_kernel_vks<C: Composer>(
    composer: &mut C,
    kernels: &[PreviousKernelData; 2],
    constants: &ConstantRollupData,
) {
    for kernel in kernels {
        let vk_tree_root = if kernel.public_inputs.is_private {
            constants.private_kernel_vk_tree_root
        } else {
            constants.public_kernel_vk_tree_root
        };
        let computed = root_from_path(
            kernel.vk.hash(),
            u64::from(kernel.vk_index),
            &kernel.vk_path,
        );
        composer.assert_equal(computed, vk_tree_root, "kernel vk is not in the vk tree");
    }
}

/// Applies every non-empty write in order; the returned root reflects the last write per slot.
fn apply_public_data_writes<C: Composer>(composer: &mut C, inputs: &BaseRollupInputs) -> Fr {
    let mut root = inputs.start_public_data_tree_root;
    for (k, kernel) in inputs.kernel_data.iter().enumerate() {
        let requests = &kernel.public_inputs.end.public_data_update_requests;
        for (j, request) in requests.iter().enumerate() {
            if request.is_empty() {
                continue;
            }
            let path =
                &inputs.new_public_data_update_requests_sibling_paths
                    [k * KERNEL_PUBLIC_DATA_UPDATE_REQUESTS_LENGTH + j];
            let index = public_data_tree_index(&request.leaf_index);
            composer.assert_equal(
                root_from_path(request.old_value, index, path),
                root,
                "public data write old value mismatch",
            );
            root = root_from_path(request.new_value, index, path);
        }
    }
    root
}

/// Position of a siloed public data leaf in the height-32 public data tree.
///
/// Only the low 32 bits of the leaf index are kept, so two storage slots
/// whose siloed indices agree in those bits share a leaf. With 2^32 leaves
/// a collision is expected after roughly 2^16 distinct slots; callers that
/// need more must widen `PUBLIC_DATA_TREE_HEIGHT`.
pub fn public_data_tree_index(leaf_index: &Fr) -> u64 {
    fr_low_u64(leaf_index) & 0xffff_ffff
}

/// SHA-256 over everything the two kernels make visible to L1.
///
/// Layout, each slot a 32-byte big-endian word and kernel 0 before kernel 1
/// within each group: commitments, nullifiers, public data writes as
/// `(leaf index, new value)`, L2-to-L1 messages, contract leaves, then
/// contract `(address, portal)` pairs.
pub fn compute_kernels_calldata_hash(kernels: &[PreviousKernelData; 2]) -> [Fr; 2] {
    let mut words: Vec<Fr> = Vec::new();
    let ends = kernels.each_ref().map(|k| &k.public_inputs.end);

    for end in ends {
        words.extend(end.new_commitments.padded());
    }
    for end in ends {
        words.extend(end.new_nullifiers.padded());
    }
    for end in ends {
        for write in end.public_data_update_requests.padded() {
            words.push(write.leaf_index);
            words.push(write.new_value);
        }
    }
    for end in ends {
        words.extend(end.new_l2_to_l1_msgs.padded());
    }
    for end in ends {
        words.extend(end.new_contracts.padded().map(|c| c.hash()));
    }
    for end in ends {
        for contract in end.new_contracts.padded() {
            words.push(contract.contract_address);
            words.push(contract.portal_contract_address);
        }
    }

    let mut hasher = Sha256::new();
    for word in &words {
        hasher.update(fr_to_bytes(word));
    }
    let digest: [u8; 32] = hasher.finalize().into();
    split_digest(&digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abis::{PublicDataUpdateRequest, VerificationKeyData};
    use crate::aggregation::{AggregationObject, DigestAggregator};
    use crate::composer::NativeComposer;
    use crate::constants::VK_TREE_HEIGHT;
    use crate::error::CircuitError;
    use crate::merkle::{RollupVkRoots, WorldState};

    fn vk_roots() -> RollupVkRoots {
        let root = root_from_path(
            VerificationKeyData::default().hash(),
            0,
            &[Fr::zero(); VK_TREE_HEIGHT],
        );
        RollupVkRoots {
            private_kernel_vk_tree_root: root,
            public_kernel_vk_tree_root: root,
            ..Default::default()
        }
    }

    fn kernel(state: &WorldState, commitments: &[u64]) -> PreviousKernelData {
        let mut kernel = PreviousKernelData::empty_with_roots(state.historic_tree_roots());
        for c in commitments {
            kernel
                .public_inputs
                .end
                .new_commitments
                .push(Fr::from(*c), "new commitments")
                .unwrap();
        }
        kernel.proof = AggregationObject([commitments.len() as u8; 32]);
        kernel
    }

    fn build(state: &mut WorldState, kernels: [PreviousKernelData; 2]) -> BaseRollupInputs {
        let constants = state.rollup_constants(&vk_roots());
        state.build_base_rollup_inputs(kernels, constants).unwrap()
    }

    #[test]
    fn test_dummy_kernels_change_nothing() {
        let mut state = WorldState::new().unwrap();
        let kernels = [kernel(&state, &[]), kernel(&state, &[])];
        let inputs = build(&mut state, kernels);

        let mut composer = NativeComposer::default();
        let out = base_rollup_circuit(&mut composer, &DigestAggregator, &inputs).unwrap();

        assert!(!composer.has_failed(), "{:?}", composer.diagnostics().failures());
        assert_eq!(out.rollup_type, RollupType::Base);
        assert_eq!(out.rollup_subtree_height, 0);
        assert_eq!(out.start_private_data_tree_snapshot, out.end_private_data_tree_snapshot);
        assert_eq!(out.start_nullifier_tree_snapshot, out.end_nullifier_tree_snapshot);
        assert_eq!(out.start_contract_tree_snapshot, out.end_contract_tree_snapshot);
        assert_eq!(out.start_public_data_tree_root, out.end_public_data_tree_root);
        assert_eq!(
            out.end_aggregation_object,
            DigestAggregator.combine(&inputs.kernel_data[0].proof, &inputs.kernel_data[1].proof)
        );
    }

    #[test]
    fn test_commitments_land_in_tree_order() {
        let mut state = WorldState::new().unwrap();
        let kernels = [kernel(&state, &[1, 2]), kernel(&state, &[3])];
        let inputs = build(&mut state, kernels);

        let mut composer = NativeComposer::default();
        let out = base_rollup_circuit(&mut composer, &DigestAggregator, &inputs).unwrap();

        assert!(!composer.has_failed(), "{:?}", composer.diagnostics().failures());
        assert_eq!(out.end_private_data_tree_snapshot, state.private_data.snapshot());
        assert_eq!(out.end_private_data_tree_snapshot.next_available_leaf_index, 8);
        assert_eq!(state.private_data.get_leaf(4), Fr::from(3u64));
        assert_eq!(out.start_nullifier_tree_snapshot, out.end_nullifier_tree_snapshot);
    }

    #[test]
    fn test_stale_snapshot_is_soft_failure() {
        let mut state = WorldState::new().unwrap();
        let kernels = [kernel(&state, &[1]), kernel(&state, &[])];
        let mut inputs = build(&mut state, kernels);
        inputs.start_private_data_tree_snapshot.root = Fr::from(5u64);

        let mut composer = NativeComposer::default();
        base_rollup_circuit(&mut composer, &DigestAggregator, &inputs).unwrap();
        assert_eq!(
            composer.diagnostics().first_failure().unwrap().message,
            "private data tree insertion"
        );
    }

    #[test]
    fn test_misaligned_insertion_is_fatal() {
        let mut state = WorldState::new().unwrap();
        let kernels = [kernel(&state, &[1]), kernel(&state, &[])];
        let mut inputs = build(&mut state, kernels);
        inputs
            .start_private_data_tree_snapshot
            .next_available_leaf_index = 3;

        let mut composer = NativeComposer::default();
        let err = base_rollup_circuit(&mut composer, &DigestAggregator, &inputs).unwrap_err();
        assert!(matches!(
            err,
            CircuitError::MisalignedInsertion { index: 3, subtree_height: 3 }
        ));
    }

    #[test]
    fn test_last_public_write_wins() {
        let mut state = WorldState::new().unwrap();
        let slot = Fr::from(7u64);
        let mut k0 = kernel(&state, &[]);
        for (old, new) in [(0u64, 10u64), (10, 20)] {
            k0.public_inputs
                .end
                .public_data_update_requests
                .push(
                    PublicDataUpdateRequest {
                        leaf_index: slot,
                        old_value: Fr::from(old),
                        new_value: Fr::from(new),
                    },
                    "public data update requests",
                )
                .unwrap();
        }
        let kernels = [k0, kernel(&state, &[])];
        let inputs = build(&mut state, kernels);

        let mut composer = NativeComposer::default();
        let out = base_rollup_circuit(&mut composer, &DigestAggregator, &inputs).unwrap();

        assert!(!composer.has_failed(), "{:?}", composer.diagnostics().failures());
        assert_eq!(out.end_public_data_tree_root, state.public_data.root());
        assert_eq!(state.public_data.get_leaf(7), Fr::from(20u64));
    }

    #[test]
    fn test_wrong_old_public_value_is_soft_failure() {
        let mut state = WorldState::new().unwrap();
        let mut k0 = kernel(&state, &[]);
        k0.public_inputs
            .end
            .public_data_update_requests
            .push(
                PublicDataUpdateRequest {
                    leaf_index: Fr::from(1u64),
                    old_value: Fr::from(4u64),
                    new_value: Fr::from(5u64),
                },
                "public data update requests",
            )
            .unwrap();
        let kernels = [k0, kernel(&state, &[])];
        let inputs = build(&mut state, kernels);

        let mut composer = NativeComposer::default();
        base_rollup_circuit(&mut composer, &DigestAggregator, &inputs).unwrap();
        assert_eq!(
            composer.diagnostics().first_failure().unwrap().message,
            "public data write old value mismatch"
        );
    }

    #[test]
    fn test_unknown_kernel_vk_is_soft_failure() {
        let mut state = WorldState::new().unwrap();
        let mut k1 = kernel(&state, &[]);
        k1.vk.circuit_size = 64;
        let kernels = [kernel(&state, &[]), k1];
        let inputs = build(&mut state, kernels);

        let mut composer = NativeComposer::default();
        base_rollup_circuit(&mut composer, &DigestAggregator, &inputs).unwrap();
        assert_eq!(
            composer.diagnostics().first_failure().unwrap().message,
            "kernel vk is not in the vk tree"
        );
    }

    #[test]
    fn test_mismatched_historic_roots_is_soft_failure() {
        let mut state = WorldState::new().unwrap();
        let mut k1 = kernel(&state, &[]);
        k1.public_inputs
            .constants
            .historic_tree_roots
            .private_data_tree_root = Fr::from(3u64);
        let kernels = [kernel(&state, &[]), k1];
        let inputs = build(&mut state, kernels);

        let mut composer = NativeComposer::default();
        base_rollup_circuit(&mut composer, &DigestAggregator, &inputs).unwrap();
        assert_eq!(
            composer.diagnostics().first_failure().unwrap().message,
            "kernels were built against different historic roots"
        );
    }

    #[test]
    fn test_public_data_index_keeps_low_32_bits() {
        let high = Fr::from((5u64 << 32) | 9);
        assert_eq!(public_data_tree_index(&high), 9);
        assert_eq!(public_data_tree_index(&Fr::from(9u64)), 9);
    }

    #[test]
    fn test_empty_calldata_layout() {
        let kernels = [PreviousKernelData::empty(), PreviousKernelData::empty()];
        // 8 commitments, 8 nullifiers, 8 writes as pairs, 4 messages,
        // 2 contract leaves, 2 contract pairs.
        let words = 8 + 8 + 16 + 4 + 2 + 4;
        let digest: [u8; 32] = Sha256::digest(vec![0u8; words * 32]).into();
        assert_eq!(compute_kernels_calldata_hash(&kernels), split_digest(&digest));
    }

    #[test]
    fn test_calldata_covers_both_kernels() {
        let state = WorldState::new().unwrap();
        let a = compute_kernels_calldata_hash(&[kernel(&state, &[1]), kernel(&state, &[])]);
        let b = compute_kernels_calldata_hash(&[kernel(&state, &[]), kernel(&state, &[1])]);
        assert_ne!(a, b);
    }
}
