//! Merge rollup: two adjacent results of equal height become one.

use crate::abis::{BaseOrMergeRollupPublicInputs, MergeRollupInputs, RollupType};
use crate::aggregation::ProofAggregator;
use crate::composer::Composer;
use crate::rollup::components;

pub fn merge_rollup_circuit<C: Composer, A: ProofAggregator>(
    composer: &mut C,
    aggregator: &A,
    inputs: &MergeRollupInputs,
) -> BaseOrMergeRollupPublicInputs {
    let [left, right] = inputs
        .previous_rollup_data
        .each_ref()
        .map(|previous| &previous.base_or_merge_rollup_public_inputs);

    components::assert_previous_rollup_vks(composer, &inputs.previous_rollup_data);
    components::assert_same_rollup_type(composer, left, right);
    let height = components::assert_same_height(composer, left, right);
    components::assert_equal_constants(composer, &left.constants, &right.constants);
    components::assert_prev_rollups_follow_on(composer, left, right);

    log::debug!(
        "Merge rollup at height {}: private data {} -> {}",
        height + 1,
        left.start_private_data_tree_snapshot.next_available_leaf_index,
        right.end_private_data_tree_snapshot.next_available_leaf_index,
    );

    BaseOrMergeRollupPublicInputs {
        rollup_type: RollupType::Merge,
        rollup_subtree_height: height + 1,
        end_aggregation_object: components::aggregate_proofs(aggregator, left, right),
        constants: left.constants,
        start_private_data_tree_snapshot: left.start_private_data_tree_snapshot,
        end_private_data_tree_snapshot: right.end_private_data_tree_snapshot,
        start_nullifier_tree_snapshot: left.start_nullifier_tree_snapshot,
        end_nullifier_tree_snapshot: right.end_nullifier_tree_snapshot,
        start_contract_tree_snapshot: left.start_contract_tree_snapshot,
        end_contract_tree_snapshot: right.end_contract_tree_snapshot,
        start_public_data_tree_root: left.start_public_data_tree_root,
        end_public_data_tree_root: right.end_public_data_tree_root,
        calldata_hash: components::compute_calldata_hash(&inputs.previous_rollup_data),
    }
}
