//! Rollup records: snapshots, per-level public inputs and circuit inputs.

use std::io::Cursor;

use ark_bn254::Fr;
use ark_std::Zero;

use crate::abis::kernel::PreviousKernelData;
use crate::abis::verification_key::VerificationKeyData;
use crate::aggregation::AggregationObject;
use crate::constants::{
    CONTRACT_SUBTREE_SIBLING_PATH_LENGTH, CONTRACT_TREE_ROOTS_TREE_HEIGHT, KERNELS_PER_BASE_ROLLUP,
    L1_TO_L2_MSG_SUBTREE_SIBLING_PATH_LENGTH, L1_TO_L2_MSG_TREE_ROOTS_TREE_HEIGHT,
    NULLIFIER_SUBTREE_SIBLING_PATH_LENGTH, NUMBER_OF_L1_L2_MESSAGES_PER_ROLLUP,
    PRIVATE_DATA_SUBTREE_SIBLING_PATH_LENGTH, PRIVATE_DATA_TREE_ROOTS_TREE_HEIGHT,
    PUBLIC_DATA_TREE_HEIGHT, PUBLIC_DATA_WRITES_PER_BASE_ROLLUP,
};
use crate::error::{CircuitError, Result};
use crate::serialize::{Decode, Encode, impl_codec};

/// `(root, next free leaf)` of an append-only tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOnlyTreeSnapshot {
    pub root: Fr,
    pub next_available_leaf_index: u64,
}

impl_codec!(AppendOnlyTreeSnapshot {
    root,
    next_available_leaf_index,
});

/// Leaf position plus siblings from the leaf level upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipWitness<const N: usize> {
    pub leaf_index: u64,
    pub sibling_path: [Fr; N],
}

impl<const N: usize> Default for MembershipWitness<N> {
    fn default() -> Self {
        Self {
            leaf_index: 0,
            sibling_path: [Fr::zero(); N],
        }
    }
}

impl<const N: usize> Encode for MembershipWitness<N> {
    fn encode(&self, out: &mut Vec<u8>) {
        self.leaf_index.encode(out);
        self.sibling_path.encode(out);
    }
}

impl<const N: usize> Decode for MembershipWitness<N> {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        Ok(Self {
            leaf_index: u64::decode(reader)?,
            sibling_path: <[Fr; N]>::decode(reader)?,
        })
    }
}

/// Block-wide values every rollup in the block must agree on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantRollupData {
    pub start_tree_of_historic_private_data_tree_roots_snapshot: AppendOnlyTreeSnapshot,
    pub start_tree_of_historic_contract_tree_roots_snapshot: AppendOnlyTreeSnapshot,
    pub start_tree_of_historic_l1_to_l2_msg_tree_roots_snapshot: AppendOnlyTreeSnapshot,
    pub private_kernel_vk_tree_root: Fr,
    pub public_kernel_vk_tree_root: Fr,
    pub base_rollup_vk_hash: Fr,
    pub merge_rollup_vk_hash: Fr,
}

impl_codec!(ConstantRollupData {
    start_tree_of_historic_private_data_tree_roots_snapshot,
    start_tree_of_historic_contract_tree_roots_snapshot,
    start_tree_of_historic_l1_to_l2_msg_tree_roots_snapshot,
    private_kernel_vk_tree_root,
    public_kernel_vk_tree_root,
    base_rollup_vk_hash,
    merge_rollup_vk_hash,
});

#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RollupType {
    #[default]
    Base = 0,
    Merge = 1,
}

impl Encode for RollupType {
    fn encode(&self, out: &mut Vec<u8>) {
        (*self as u8).encode(out);
    }
}

impl Decode for RollupType {
    fn decode(reader: &mut Cursor<&[u8]>) -> Result<Self> {
        match u8::decode(reader)? {
            0 => Ok(RollupType::Base),
            1 => Ok(RollupType::Merge),
            other => Err(CircuitError::InvalidRollupType(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseOrMergeRollupPublicInputs {
    pub rollup_type: RollupType,
    /// Number of merge levels below this record (base = 0)
    pub rollup_subtree_height: u32,
    pub end_aggregation_object: AggregationObject,
    pub constants: ConstantRollupData,

    pub start_private_data_tree_snapshot: AppendOnlyTreeSnapshot,
    pub end_private_data_tree_snapshot: AppendOnlyTreeSnapshot,
    pub start_nullifier_tree_snapshot: AppendOnlyTreeSnapshot,
    pub end_nullifier_tree_snapshot: AppendOnlyTreeSnapshot,
    pub start_contract_tree_snapshot: AppendOnlyTreeSnapshot,
    pub end_contract_tree_snapshot: AppendOnlyTreeSnapshot,
    pub start_public_data_tree_root: Fr,
    pub end_public_data_tree_root: Fr,

    /// SHA-256 of the externally visible data, as `[high, low]`
    pub calldata_hash: [Fr; 2],
}

impl_codec!(BaseOrMergeRollupPublicInputs {
    rollup_type,
    rollup_subtree_height,
    end_aggregation_object,
    constants,
    start_private_data_tree_snapshot,
    end_private_data_tree_snapshot,
    start_nullifier_tree_snapshot,
    end_nullifier_tree_snapshot,
    start_contract_tree_snapshot,
    end_contract_tree_snapshot,
    start_public_data_tree_root,
    end_public_data_tree_root,
    calldata_hash,
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviousRollupData {
    pub base_or_merge_rollup_public_inputs: BaseOrMergeRollupPublicInputs,
    pub proof: AggregationObject,
    pub vk: VerificationKeyData,
}

impl_codec!(PreviousRollupData {
    base_or_merge_rollup_public_inputs,
    proof,
    vk,
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRollupInputs {
    pub kernel_data: [PreviousKernelData; KERNELS_PER_BASE_ROLLUP],

    pub start_private_data_tree_snapshot: AppendOnlyTreeSnapshot,
    pub start_nullifier_tree_snapshot: AppendOnlyTreeSnapshot,
    pub start_contract_tree_snapshot: AppendOnlyTreeSnapshot,
    pub start_public_data_tree_root: Fr,

    pub new_commitments_subtree_sibling_path: [Fr; PRIVATE_DATA_SUBTREE_SIBLING_PATH_LENGTH],
    pub new_nullifiers_subtree_sibling_path: [Fr; NULLIFIER_SUBTREE_SIBLING_PATH_LENGTH],
    pub new_contracts_subtree_sibling_path: [Fr; CONTRACT_SUBTREE_SIBLING_PATH_LENGTH],
    /// One path per write slot, kernel 0's slots first
    pub new_public_data_update_requests_sibling_paths:
        [[Fr; PUBLIC_DATA_TREE_HEIGHT]; PUBLIC_DATA_WRITES_PER_BASE_ROLLUP],

    pub historic_private_data_tree_root_membership_witnesses:
        [MembershipWitness<PRIVATE_DATA_TREE_ROOTS_TREE_HEIGHT>; KERNELS_PER_BASE_ROLLUP],
    pub historic_contract_tree_root_membership_witnesses:
        [MembershipWitness<CONTRACT_TREE_ROOTS_TREE_HEIGHT>; KERNELS_PER_BASE_ROLLUP],

    pub constants: ConstantRollupData,
}

impl_codec!(BaseRollupInputs {
    kernel_data,
    start_private_data_tree_snapshot,
    start_nullifier_tree_snapshot,
    start_contract_tree_snapshot,
    start_public_data_tree_root,
    new_commitments_subtree_sibling_path,
    new_nullifiers_subtree_sibling_path,
    new_contracts_subtree_sibling_path,
    new_public_data_update_requests_sibling_paths,
    historic_private_data_tree_root_membership_witnesses,
    historic_contract_tree_root_membership_witnesses,
    constants,
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRollupInputs {
    pub previous_rollup_data: [PreviousRollupData; 2],
}

impl_codec!(MergeRollupInputs {
    previous_rollup_data,
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRollupInputs {
    pub previous_rollup_data: [PreviousRollupData; 2],

    pub new_historic_private_data_tree_root_sibling_path: [Fr; PRIVATE_DATA_TREE_ROOTS_TREE_HEIGHT],
    pub new_historic_contract_tree_root_sibling_path: [Fr; CONTRACT_TREE_ROOTS_TREE_HEIGHT],

    pub l1_to_l2_messages: [Fr; NUMBER_OF_L1_L2_MESSAGES_PER_ROLLUP],
    pub new_l1_to_l2_message_tree_root_sibling_path: [Fr; L1_TO_L2_MSG_SUBTREE_SIBLING_PATH_LENGTH],
    pub start_l1_to_l2_message_tree_snapshot: AppendOnlyTreeSnapshot,

    pub start_historic_tree_l1_to_l2_message_tree_roots_snapshot: AppendOnlyTreeSnapshot,
    pub new_historic_l1_to_l2_message_roots_tree_sibling_path:
        [Fr; L1_TO_L2_MSG_TREE_ROOTS_TREE_HEIGHT],
}

impl_codec!(RootRollupInputs {
    previous_rollup_data,
    new_historic_private_data_tree_root_sibling_path,
    new_historic_contract_tree_root_sibling_path,
    l1_to_l2_messages,
    new_l1_to_l2_message_tree_root_sibling_path,
    start_l1_to_l2_message_tree_snapshot,
    start_historic_tree_l1_to_l2_message_tree_roots_snapshot,
    new_historic_l1_to_l2_message_roots_tree_sibling_path,
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootRollupPublicInputs {
    pub end_aggregation_object: AggregationObject,

    pub start_private_data_tree_snapshot: AppendOnlyTreeSnapshot,
    pub end_private_data_tree_snapshot: AppendOnlyTreeSnapshot,
    pub start_nullifier_tree_snapshot: AppendOnlyTreeSnapshot,
    pub end_nullifier_tree_snapshot: AppendOnlyTreeSnapshot,
    pub start_contract_tree_snapshot: AppendOnlyTreeSnapshot,
    pub end_contract_tree_snapshot: AppendOnlyTreeSnapshot,
    pub start_public_data_tree_root: Fr,
    pub end_public_data_tree_root: Fr,

    pub start_tree_of_historic_private_data_tree_roots_snapshot: AppendOnlyTreeSnapshot,
    pub end_tree_of_historic_private_data_tree_roots_snapshot: AppendOnlyTreeSnapshot,
    pub start_tree_of_historic_contract_tree_roots_snapshot: AppendOnlyTreeSnapshot,
    pub end_tree_of_historic_contract_tree_roots_snapshot: AppendOnlyTreeSnapshot,

    pub start_l1_to_l2_messages_tree_snapshot: AppendOnlyTreeSnapshot,
    pub end_l1_to_l2_messages_tree_snapshot: AppendOnlyTreeSnapshot,
    pub start_tree_of_historic_l1_to_l2_messages_tree_roots_snapshot: AppendOnlyTreeSnapshot,
    pub end_tree_of_historic_l1_to_l2_messages_tree_roots_snapshot: AppendOnlyTreeSnapshot,

    pub calldata_hash: [Fr; 2],
    pub l1_to_l2_messages_hash: [Fr; 2],
}

impl_codec!(RootRollupPublicInputs {
    end_aggregation_object,
    start_private_data_tree_snapshot,
    end_private_data_tree_snapshot,
    start_nullifier_tree_snapshot,
    end_nullifier_tree_snapshot,
    start_contract_tree_snapshot,
    end_contract_tree_snapshot,
    start_public_data_tree_root,
    end_public_data_tree_root,
    start_tree_of_historic_private_data_tree_roots_snapshot,
    end_tree_of_historic_private_data_tree_roots_snapshot,
    start_tree_of_historic_contract_tree_roots_snapshot,
    end_tree_of_historic_contract_tree_roots_snapshot,
    start_l1_to_l2_messages_tree_snapshot,
    end_l1_to_l2_messages_tree_snapshot,
    start_tree_of_historic_l1_to_l2_messages_tree_roots_snapshot,
    end_tree_of_historic_l1_to_l2_messages_tree_roots_snapshot,
    calldata_hash,
    l1_to_l2_messages_hash,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::from_bytes;

    #[test]
    fn test_rollup_type_tag() {
        assert_eq!(RollupType::Merge.to_bytes(), vec![1]);
        assert!(matches!(
            from_bytes::<RollupType>(&[7]),
            Err(CircuitError::InvalidRollupType(7))
        ));
    }

    #[test]
    fn test_public_inputs_codec() {
        let mut inputs = BaseOrMergeRollupPublicInputs {
            rollup_type: RollupType::Merge,
            rollup_subtree_height: 3,
            ..Default::default()
        };
        inputs.end_private_data_tree_snapshot.next_available_leaf_index = 16;
        inputs.calldata_hash = [Fr::from(1u64), Fr::from(2u64)];
        let decoded: BaseOrMergeRollupPublicInputs = from_bytes(&inputs.to_bytes()).unwrap();
        assert_eq!(decoded, inputs);
    }

    #[test]
    fn test_membership_witness_codec() {
        let witness = MembershipWitness::<3> {
            leaf_index: 5,
            sibling_path: [Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)],
        };
        let bytes = witness.to_bytes();
        assert_eq!(bytes.len(), 8 + 3 * 32);
        assert_eq!(from_bytes::<MembershipWitness<3>>(&bytes).unwrap(), witness);
    }
}
