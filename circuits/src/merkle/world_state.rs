//! Reference copies of every tree a block touches.
//!
//! Builds rollup inputs the way a sequencer would: read sibling paths,
//! then apply the same insertions the circuit is about to prove.

use ark_bn254::Fr;
use ark_std::Zero;

use crate::abis::{
    BaseRollupInputs, ConstantRollupData, HistoricTreeRoots,
    MembershipWitness, PreviousKernelData, PreviousRollupData, RootRollupInputs,
};
use crate::bounded_vec::Empty;
use crate::constants::{
    CONTRACT_SUBTREE_HEIGHT, CONTRACT_TREE_HEIGHT, CONTRACT_TREE_ROOTS_TREE_HEIGHT,
    KERNEL_PUBLIC_DATA_UPDATE_REQUESTS_LENGTH, L1_TO_L2_MSG_SUBTREE_DEPTH,
    L1_TO_L2_MSG_TREE_HEIGHT, L1_TO_L2_MSG_TREE_ROOTS_TREE_HEIGHT, NULLIFIER_SUBTREE_HEIGHT,
    NULLIFIER_TREE_HEIGHT, NUMBER_OF_L1_L2_MESSAGES_PER_ROLLUP, PRIVATE_DATA_SUBTREE_HEIGHT,
    PRIVATE_DATA_TREE_HEIGHT, PRIVATE_DATA_TREE_ROOTS_TREE_HEIGHT, PUBLIC_DATA_TREE_HEIGHT,
    PUBLIC_DATA_WRITES_PER_BASE_ROLLUP,
};
use crate::error::{CircuitError, Result};
use crate::merkle::MerkleTree;
use crate::rollup::base::public_data_tree_index;

/// Verification keys the rollup levels are pinned to for a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollupVkRoots {
    pub private_kernel_vk_tree_root: Fr,
    pub public_kernel_vk_tree_root: Fr,
    pub base_rollup_vk_hash: Fr,
    pub merge_rollup_vk_hash: Fr,
}

#[derive(Debug, Clone)]
pub struct WorldState {
    pub private_data: MerkleTree,
    pub nullifiers: MerkleTree,
    pub contracts: MerkleTree,
    pub public_data: MerkleTree,
    pub l1_to_l2_messages: MerkleTree,
    pub historic_private_data_roots: MerkleTree,
    pub historic_contract_roots: MerkleTree,
    pub historic_l1_to_l2_roots: MerkleTree,
}

impl WorldState {
    /// Empty trees, with each historic tree already holding the genesis root.
    pub fn new() -> Result<Self> {
        let mut state = Self {
            private_data: MerkleTree::new(PRIVATE_DATA_TREE_HEIGHT),
            nullifiers: MerkleTree::new(NULLIFIER_TREE_HEIGHT),
            contracts: MerkleTree::new(CONTRACT_TREE_HEIGHT),
            public_data: MerkleTree::new(PUBLIC_DATA_TREE_HEIGHT),
            l1_to_l2_messages: MerkleTree::new(L1_TO_L2_MSG_TREE_HEIGHT),
            historic_private_data_roots: MerkleTree::new(PRIVATE_DATA_TREE_ROOTS_TREE_HEIGHT),
            historic_contract_roots: MerkleTree::new(CONTRACT_TREE_ROOTS_TREE_HEIGHT),
            historic_l1_to_l2_roots: MerkleTree::new(L1_TO_L2_MSG_TREE_ROOTS_TREE_HEIGHT),
        };
        state
            .historic_private_data_roots
            .append_leaves(&[state.private_data.root()])?;
        state
            .historic_contract_roots
            .append_leaves(&[state.contracts.root()])?;
        state
            .historic_l1_to_l2_roots
            .append_leaves(&[state.l1_to_l2_messages.root()])?;
        Ok(state)
    }

    /// Roots a kernel built against the current state would read.
    pub fn historic_tree_roots(&self) -> HistoricTreeRoots {
        HistoricTreeRoots {
            private_data_tree_root: self.private_data.root(),
            nullifier_tree_root: self.nullifiers.root(),
            contract_tree_root: self.contracts.root(),
            l1_to_l2_messages_tree_root: self.l1_to_l2_messages.root(),
            public_data_tree_root: self.public_data.root(),
        }
    }

    /// Block constants; take them before building any rollup of the block.
    pub fn rollup_constants(&self, vks: &RollupVkRoots) -> ConstantRollupData {
        ConstantRollupData {
            start_tree_of_historic_private_data_tree_roots_snapshot: self
                .historic_private_data_roots
                .snapshot(),
            start_tree_of_historic_contract_tree_roots_snapshot: self
                .historic_contract_roots
                .snapshot(),
            start_tree_of_historic_l1_to_l2_msg_tree_roots_snapshot: self
                .historic_l1_to_l2_roots
                .snapshot(),
            private_kernel_vk_tree_root: vks.private_kernel_vk_tree_root,
            public_kernel_vk_tree_root: vks.public_kernel_vk_tree_root,
            base_rollup_vk_hash: vks.base_rollup_vk_hash,
            merge_rollup_vk_hash: vks.merge_rollup_vk_hash,
        }
    }

    /// Witnesses for a base rollup over `kernels`, then applies their effects.
    pub fn build_base_rollup_inputs(
        &mut self,
        kernel_data: [PreviousKernelData; 2],
        constants: ConstantRollupData,
    ) -> Result<BaseRollupInputs> {
        let start_private_data_tree_snapshot = self.private_data.snapshot();
        let start_nullifier_tree_snapshot = self.nullifiers.snapshot();
        let start_contract_tree_snapshot = self.contracts.snapshot();
        let start_public_data_tree_root = self.public_data.root();

        let historic_private_data_tree_root_membership_witnesses = historic_witnesses(
            &self.historic_private_data_roots,
            &kernel_data,
            |roots| roots.private_data_tree_root,
        )?;
        let historic_contract_tree_root_membership_witnesses = historic_witnesses(
            &self.historic_contract_roots,
            &kernel_data,
            |roots| roots.contract_tree_root,
        )?;

        let commitments: Vec<Fr> = kernel_data
            .iter()
            .flat_map(|k| k.public_inputs.end.new_commitments.padded())
            .collect();
        let new_commitments_subtree_sibling_path = fixed(append_subtree(
            &mut self.private_data,
            &commitments,
            PRIVATE_DATA_SUBTREE_HEIGHT,
        )?)?;

        let nullifiers: Vec<Fr> = kernel_data
            .iter()
            .flat_map(|k| k.public_inputs.end.new_nullifiers.padded())
            .collect();
        let new_nullifiers_subtree_sibling_path = fixed(append_subtree(
            &mut self.nullifiers,
            &nullifiers,
            NULLIFIER_SUBTREE_HEIGHT,
        )?)?;

        let contract_leaves: Vec<Fr> = kernel_data
            .iter()
            .flat_map(|k| k.public_inputs.end.new_contracts.padded().map(|c| c.hash()))
            .collect();
        let new_contracts_subtree_sibling_path = fixed(append_subtree(
            &mut self.contracts,
            &contract_leaves,
            CONTRACT_SUBTREE_HEIGHT,
        )?)?;

        let mut new_public_data_update_requests_sibling_paths =
            [[Fr::zero(); PUBLIC_DATA_TREE_HEIGHT]; PUBLIC_DATA_WRITES_PER_BASE_ROLLUP];
        for (k, kernel) in kernel_data.iter().enumerate() {
            for (j, request) in kernel.public_inputs.end.public_data_update_requests.iter().enumerate() {
                if request.is_empty() {
                    continue;
                }
                let index = public_data_tree_index(&request.leaf_index);
                new_public_data_update_requests_sibling_paths
                    [k * KERNEL_PUBLIC_DATA_UPDATE_REQUESTS_LENGTH + j] =
                    fixed(self.public_data.sibling_path(index)?)?;
                self.public_data.update_leaf(index, request.new_value)?;
            }
        }

        Ok(BaseRollupInputs {
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
        })
    }

    /// Witnesses for the block's root rollup, then advances the historic trees.
    pub fn build_root_rollup_inputs(
        &mut self,
        previous_rollup_data: [PreviousRollupData; 2],
        l1_to_l2_messages: [Fr; NUMBER_OF_L1_L2_MESSAGES_PER_ROLLUP],
    ) -> Result<RootRollupInputs> {
        let new_historic_private_data_tree_root_sibling_path =
            fixed(self.historic_private_data_roots.subtree_sibling_path(0)?)?;
        self.historic_private_data_roots
            .append_leaves(&[self.private_data.root()])?;

        let new_historic_contract_tree_root_sibling_path =
            fixed(self.historic_contract_roots.subtree_sibling_path(0)?)?;
        self.historic_contract_roots
            .append_leaves(&[self.contracts.root()])?;

        let start_l1_to_l2_message_tree_snapshot = self.l1_to_l2_messages.snapshot();
        let new_l1_to_l2_message_tree_root_sibling_path = fixed(
            self.l1_to_l2_messages
                .subtree_sibling_path(L1_TO_L2_MSG_SUBTREE_DEPTH)?,
        )?;
        self.l1_to_l2_messages.append_leaves(&l1_to_l2_messages)?;

        let start_historic_tree_l1_to_l2_message_tree_roots_snapshot =
            self.historic_l1_to_l2_roots.snapshot();
        let new_historic_l1_to_l2_message_roots_tree_sibling_path =
            fixed(self.historic_l1_to_l2_roots.subtree_sibling_path(0)?)?;
        self.historic_l1_to_l2_roots
            .append_leaves(&[self.l1_to_l2_messages.root()])?;

        Ok(RootRollupInputs {
            previous_rollup_data,
            new_historic_private_data_tree_root_sibling_path,
            new_historic_contract_tree_root_sibling_path,
            l1_to_l2_messages,
            new_l1_to_l2_message_tree_root_sibling_path,
            start_l1_to_l2_message_tree_snapshot,
            start_historic_tree_l1_to_l2_message_tree_roots_snapshot,
            new_historic_l1_to_l2_message_roots_tree_sibling_path,
        })
    }
}

fn historic_witnesses<const N: usize>(
    tree: &MerkleTree,
    kernels: &[PreviousKernelData; 2],
    root: impl Fn(&HistoricTreeRoots) -> Fr,
) -> Result<[MembershipWitness<N>; 2]> {
    let mut witnesses = [MembershipWitness::default(); 2];
    for (witness, kernel) in witnesses.iter_mut().zip(kernels) {
        let value = root(&kernel.public_inputs.constants.historic_tree_roots);
        // Unknown roots keep the default witness and fail in the circuit.
        if let Some(index) = tree.find_leaf_index(&value) {
            *witness = tree.membership_witness(index)?;
        }
    }
    Ok(witnesses)
}

/// Sibling path for `leaves` at the cursor, then appends them. All-zero
/// subtrees are not appended and get an all-zero path.
fn append_subtree(tree: &mut MerkleTree, leaves: &[Fr], subtree_height: u32) -> Result<Vec<Fr>> {
    let path_length = tree.depth() - subtree_height as usize;
    if leaves.iter().all(Fr::is_zero) {
        return Ok(vec![Fr::zero(); path_length]);
    }
    let path = tree.subtree_sibling_path(subtree_height)?;
    tree.append_leaves(leaves)?;
    Ok(path)
}

fn fixed<const N: usize>(path: Vec<Fr>) -> Result<[Fr; N]> {
    path.try_into().map_err(|path: Vec<Fr>| CircuitError::ArrayLength {
        expected: N,
        got: path.len(),
    })
}
