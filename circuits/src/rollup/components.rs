//! Checks and digests shared by the merge and root rollups.

use ark_bn254::Fr;
use sha2::{Digest, Sha256};

use crate::abis::{
    BaseOrMergeRollupPublicInputs, ConstantRollupData, PreviousRollupData, RollupType,
};
use crate::aggregation::{AggregationObject, ProofAggregator};
use crate::composer::Composer;
use crate::field::{fr_to_bytes, split_digest};

pub fn assert_same_rollup_type<C: Composer>(
    composer: &mut C,
    left: &BaseOrMergeRollupPublicInputs,
    right: &BaseOrMergeRollupPublicInputs,
) {
    composer.assert_true(
        left.rollup_type == right.rollup_type,
        "input proofs are of different rollup types",
    );
}

/// Returns the shared height, the left one if they differ.
pub fn assert_same_height<C: Composer>(
    composer: &mut C,
    left: &BaseOrMergeRollupPublicInputs,
    right: &BaseOrMergeRollupPublicInputs,
) -> u32 {
    composer.assert_equal(
        Fr::from(left.rollup_subtree_height),
        Fr::from(right.rollup_subtree_height),
        "input proofs are of different rollup heights",
    );
    left.rollup_subtree_height
}

pub fn assert_equal_constants<C: Composer>(
    composer: &mut C,
    left: &ConstantRollupData,
    right: &ConstantRollupData,
) {
    let message = "input proofs have different constants";
    composer.assert_snapshot_equal(
        &left.start_tree_of_historic_private_data_tree_roots_snapshot,
        &right.start_tree_of_historic_private_data_tree_roots_snapshot,
        message,
    );
    composer.assert_snapshot_equal(
        &left.start_tree_of_historic_contract_tree_roots_snapshot,
        &right.start_tree_of_historic_contract_tree_roots_snapshot,
        message,
    );
    composer.assert_snapshot_equal(
        &left.start_tree_of_historic_l1_to_l2_msg_tree_roots_snapshot,
        &right.start_tree_of_historic_l1_to_l2_msg_tree_roots_snapshot,
        message,
    );
    composer.assert_fields_equal(
        &[
            left.private_kernel_vk_tree_root,
            left.public_kernel_vk_tree_root,
            left.base_rollup_vk_hash,
            left.merge_rollup_vk_hash,
        ],
        &[
            right.private_kernel_vk_tree_root,
            right.public_kernel_vk_tree_root,
            right.base_rollup_vk_hash,
            right.merge_rollup_vk_hash,
        ],
        message,
    );
}

/// Every tree the right half starts from must be where the left half ended.
pub fn assert_prev_rollups_follow_on<C: Composer>(
    composer: &mut C,
    left: &BaseOrMergeRollupPublicInputs,
    right: &BaseOrMergeRollupPublicInputs,
) {
    composer.assert_snapshot_equal(
        &left.end_private_data_tree_snapshot,
        &right.start_private_data_tree_snapshot,
        "input proofs have different private data tree snapshots",
    );
    composer.assert_snapshot_equal(
        &left.end_nullifier_tree_snapshot,
        &right.start_nullifier_tree_snapshot,
        "input proofs have different nullifier tree snapshots",
    );
    composer.assert_snapshot_equal(
        &left.end_contract_tree_snapshot,
        &right.start_contract_tree_snapshot,
        "input proofs have different contract tree snapshots",
    );
    composer.assert_equal(
        left.end_public_data_tree_root,
        right.start_public_data_tree_root,
        "input proofs have different public data tree roots",
    );
}

/// Each previous rollup must carry the vk its level is pinned to in the constants.
pub fn assert_previous_rollup_vks<C: Composer>(
    composer: &mut C,
    previous_rollup_data: &[PreviousRollupData; 2],
) {
    for previous in previous_rollup_data {
        let inputs = &previous.base_or_merge_rollup_public_inputs;
        let expected = match inputs.rollup_type {
            RollupType::Base => inputs.constants.base_rollup_vk_hash,
            RollupType::Merge => inputs.constants.merge_rollup_vk_hash,
        };
        composer.assert_equal(
            previous.vk.hash(),
            expected,
            "previous rollup vk does not match its rollup type",
        );
    }
}

pub fn aggregate_proofs<A: ProofAggregator>(
    aggregator: &A,
    left: &BaseOrMergeRollupPublicInputs,
    right: &BaseOrMergeRollupPublicInputs,
) -> AggregationObject {
    aggregator.combine(&left.end_aggregation_object, &right.end_aggregation_object)
}

/// SHA-256 over `left.high ‖ left.low ‖ right.high ‖ right.low`, split back into two fields.
pub fn compute_calldata_hash(previous_rollup_data: &[PreviousRollupData; 2]) -> [Fr; 2] {
    let mut hasher = Sha256::new();
    for previous in previous_rollup_data {
        for half in &previous.base_or_merge_rollup_public_inputs.calldata_hash {
            hasher.update(fr_to_bytes(half));
        }
    }
    let digest: [u8; 32] = hasher.finalize().into();
    split_digest(&digest)
}

/// SHA-256 over the 32-byte big-endian encodings of `messages`, as `[high, low]`.
pub fn compute_messages_hash(messages: &[Fr]) -> [Fr; 2] {
    let mut hasher = Sha256::new();
    for message in messages {
        hasher.update(fr_to_bytes(message));
    }
    let digest: [u8; 32] = hasher.finalize().into();
    split_digest(&digest)
}
