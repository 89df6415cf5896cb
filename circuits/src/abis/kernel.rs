//! Kernel outputs: what one transaction has produced so far.

use ark_bn254::Fr;

use crate::abis::call_stack_item::PublicDataUpdateRequest;
use crate::abis::contract::NewContractData;
use crate::abis::tx::TxContext;
use crate::abis::verification_key::VerificationKeyData;
use crate::aggregation::AggregationObject;
use crate::bounded_vec::BoundedVec;
use crate::constants::{
    KERNEL_NEW_COMMITMENTS_LENGTH, KERNEL_NEW_CONTRACTS_LENGTH, KERNEL_NEW_L2_TO_L1_MSGS_LENGTH,
    KERNEL_NEW_NULLIFIERS_LENGTH, KERNEL_PRIVATE_CALL_STACK_LENGTH,
    KERNEL_PUBLIC_CALL_STACK_LENGTH, KERNEL_PUBLIC_DATA_UPDATE_REQUESTS_LENGTH, VK_TREE_HEIGHT,
};
use crate::serialize::impl_codec;

/// Tree roots a transaction was built against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoricTreeRoots {
    pub private_data_tree_root: Fr,
    pub nullifier_tree_root: Fr,
    pub contract_tree_root: Fr,
    pub l1_to_l2_messages_tree_root: Fr,
    pub public_data_tree_root: Fr,
}

impl_codec!(HistoricTreeRoots {
    private_data_tree_root,
    nullifier_tree_root,
    contract_tree_root,
    l1_to_l2_messages_tree_root,
    public_data_tree_root,
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombinedConstantData {
    pub historic_tree_roots: HistoricTreeRoots,
    pub tx_context: TxContext,
}

impl_codec!(CombinedConstantData {
    historic_tree_roots,
    tx_context,
});

/// Side effects accumulated across kernel iterations, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedAccumulatedData {
    pub aggregation_object: AggregationObject,
    pub private_call_stack: BoundedVec<Fr, KERNEL_PRIVATE_CALL_STACK_LENGTH>,
    pub public_call_stack: BoundedVec<Fr, KERNEL_PUBLIC_CALL_STACK_LENGTH>,
    pub new_commitments: BoundedVec<Fr, KERNEL_NEW_COMMITMENTS_LENGTH>,
    pub new_nullifiers: BoundedVec<Fr, KERNEL_NEW_NULLIFIERS_LENGTH>,
    pub new_l2_to_l1_msgs: BoundedVec<Fr, KERNEL_NEW_L2_TO_L1_MSGS_LENGTH>,
    pub new_contracts: BoundedVec<NewContractData, KERNEL_NEW_CONTRACTS_LENGTH>,
    pub public_data_update_requests:
        BoundedVec<PublicDataUpdateRequest, KERNEL_PUBLIC_DATA_UPDATE_REQUESTS_LENGTH>,
}

impl_codec!(CombinedAccumulatedData {
    aggregation_object,
    private_call_stack,
    public_call_stack,
    new_commitments,
    new_nullifiers,
    new_l2_to_l1_msgs,
    new_contracts,
    public_data_update_requests,
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelPublicInputs {
    pub end: CombinedAccumulatedData,
    pub constants: CombinedConstantData,
    pub is_private: bool,
}

impl_codec!(KernelPublicInputs {
    end,
    constants,
    is_private,
});

/// A finished kernel iteration plus what is needed to verify it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviousKernelData {
    pub public_inputs: KernelPublicInputs,
    pub proof: AggregationObject,
    pub vk: VerificationKeyData,
    /// Position of `vk` in the kernel vk tree
    pub vk_index: u32,
    pub vk_path: [Fr; VK_TREE_HEIGHT],
}

impl_codec!(PreviousKernelData {
    public_inputs,
    proof,
    vk,
    vk_index,
    vk_path,
});

impl PreviousKernelData {
    /// Padding transaction: no side effects, default vk at index 0.
    pub fn empty() -> Self {
        Self {
            public_inputs: KernelPublicInputs {
                is_private: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Padding transaction pinned to the same historic roots as a real one.
    pub fn empty_with_roots(historic_tree_roots: HistoricTreeRoots) -> Self {
        let mut kernel = Self::empty();
        kernel.public_inputs.constants.historic_tree_roots = historic_tree_roots;
        kernel
    }

    pub fn has_side_effects(&self) -> bool {
        let end = &self.public_inputs.end;
        !(end.new_commitments.is_empty()
            && end.new_nullifiers.is_empty()
            && end.new_l2_to_l1_msgs.is_empty()
            && end.new_contracts.is_empty()
            && end.public_data_update_requests.is_empty())
    }
}
