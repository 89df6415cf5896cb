//! Root rollup: closes the block.
//!
//! Besides the merge checks, records the new tree roots in the historic
//! trees and appends the block's L1-to-L2 message batch.

use ark_bn254::Fr;
use ark_std::Zero;

use crate::abis::{RootRollupInputs, RootRollupPublicInputs};
use crate::aggregation::ProofAggregator;
use crate::composer::Composer;
use crate::constants::L1_TO_L2_MSG_SUBTREE_DEPTH;
use crate::error::Result;
use crate::merkle::{compute_tree_root, empty_tree_root, insert_subtree_to_snapshot_tree};
use crate::rollup::components;

pub fn root_rollup_circuit<C: Composer, A: ProofAggregator>(
    composer: &mut C,
    aggregator: &A,
    inputs: &RootRollupInputs,
) -> Result<RootRollupPublicInputs> {
    let [left, right] = inputs
        .previous_rollup_data
        .each_ref()
        .map(|previous| &previous.base_or_merge_rollup_public_inputs);

    let end_aggregation_object = components::aggregate_proofs(aggregator, left, right);
    components::assert_previous_rollup_vks(composer, &inputs.previous_rollup_data);
    components::assert_same_rollup_type(composer, left, right);
    components::assert_same_height(composer, left, right);
    components::assert_equal_constants(composer, &left.constants, &right.constants);
    components::assert_prev_rollups_follow_on(composer, left, right);

    let constants = &left.constants;
    let end_tree_of_historic_private_data_tree_roots_snapshot = insert_subtree_to_snapshot_tree(
        composer,
        &constants.start_tree_of_historic_private_data_tree_roots_snapshot,
        &inputs.new_historic_private_data_tree_root_sibling_path,
        Fr::zero(),
        right.end_private_data_tree_snapshot.root,
        0,
        "historic private data tree roots insertion",
    )?;
    let end_tree_of_historic_contract_tree_roots_snapshot = insert_subtree_to_snapshot_tree(
        composer,
        &constants.start_tree_of_historic_contract_tree_roots_snapshot,
        &inputs.new_historic_contract_tree_root_sibling_path,
        Fr::zero(),
        right.end_contract_tree_snapshot.root,
        0,
        "historic contract tree roots insertion",
    )?;

    // Precondition: the batch always lands in never-written space, so the
    // current subtree is the empty one.
    let depth = L1_TO_L2_MSG_SUBTREE_DEPTH as usize;
    let l1_to_l2_subtree_root = compute_tree_root(&inputs.l1_to_l2_messages, depth, Fr::zero())?;
    let end_l1_to_l2_messages_tree_snapshot = insert_subtree_to_snapshot_tree(
        composer,
        &inputs.start_l1_to_l2_message_tree_snapshot,
        &inputs.new_l1_to_l2_message_tree_root_sibling_path,
        empty_tree_root(depth),
        l1_to_l2_subtree_root,
        L1_TO_L2_MSG_SUBTREE_DEPTH,
        "l1 to l2 message tree insertion",
    )?;

    composer.assert_snapshot_equal(
        &inputs.start_historic_tree_l1_to_l2_message_tree_roots_snapshot,
        &constants.start_tree_of_historic_l1_to_l2_msg_tree_roots_snapshot,
        "historic l1 to l2 message roots snapshot differs from the constants",
    );
    let end_tree_of_historic_l1_to_l2_messages_tree_roots_snapshot =
        insert_subtree_to_snapshot_tree(
            composer,
            &inputs.start_historic_tree_l1_to_l2_message_tree_roots_snapshot,
            &inputs.new_historic_l1_to_l2_message_roots_tree_sibling_path,
            Fr::zero(),
            end_l1_to_l2_messages_tree_snapshot.root,
            0,
            "historic l1 to l2 message tree roots insertion",
        )?;

    log::info!(
        "Root rollup: block closes at private data index {}, l1 to l2 index {}",
        right.end_private_data_tree_snapshot.next_available_leaf_index,
        end_l1_to_l2_messages_tree_snapshot.next_available_leaf_index,
    );

    Ok(RootRollupPublicInputs {
        end_aggregation_object,
        start_private_data_tree_snapshot: left.start_private_data_tree_snapshot,
        end_private_data_tree_snapshot: right.end_private_data_tree_snapshot,
        start_nullifier_tree_snapshot: left.start_nullifier_tree_snapshot,
        end_nullifier_tree_snapshot: right.end_nullifier_tree_snapshot,
        start_contract_tree_snapshot: left.start_contract_tree_snapshot,
        end_contract_tree_snapshot: right.end_contract_tree_snapshot,
        start_public_data_tree_root: left.start_public_data_tree_root,
        end_public_data_tree_root: right.end_public_data_tree_root,
        start_tree_of_historic_private_data_tree_roots_snapshot: constants
            .start_tree_of_historic_private_data_tree_roots_snapshot,
        end_tree_of_historic_private_data_tree_roots_snapshot,
        start_tree_of_historic_contract_tree_roots_snapshot: constants
            .start_tree_of_historic_contract_tree_roots_snapshot,
        end_tree_of_historic_contract_tree_roots_snapshot,
        start_l1_to_l2_messages_tree_snapshot: inputs.start_l1_to_l2_message_tree_snapshot,
        end_l1_to_l2_messages_tree_snapshot,
        start_tree_of_historic_l1_to_l2_messages_tree_roots_snapshot: inputs
            .start_historic_tree_l1_to_l2_message_tree_roots_snapshot,
        end_tree_of_historic_l1_to_l2_messages_tree_roots_snapshot,
        calldata_hash: components::compute_calldata_hash(&inputs.previous_rollup_data),
        l1_to_l2_messages_hash: components::compute_messages_hash(&inputs.l1_to_l2_messages),
    })
}
