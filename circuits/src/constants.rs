//! Circuit-design-time sizes and hash domain tags.
//!
//! Every array length and tree height below is baked into the circuits;
//! changing one changes every verification key.

use ark_bn254::Fr;

// ============================================================================
// Function / call limits
// ============================================================================

pub const FUNCTION_TREE_HEIGHT: usize = 4;
pub const FUNCTION_SELECTOR_NUM_BYTES: usize = 4;

pub const ARGS_LENGTH: usize = 8;
pub const RETURN_VALUES_LENGTH: usize = 4;

pub const NEW_COMMITMENTS_LENGTH: usize = 4;
pub const NEW_NULLIFIERS_LENGTH: usize = 4;
pub const NEW_L2_TO_L1_MSGS_LENGTH: usize = 2;
pub const PRIVATE_CALL_STACK_LENGTH: usize = 4;
pub const PUBLIC_CALL_STACK_LENGTH: usize = 4;
pub const CONTRACT_STORAGE_UPDATE_REQUESTS_LENGTH: usize = 4;

// ============================================================================
// Kernel accumulation limits (per transaction)
// ============================================================================

pub const KERNEL_NEW_COMMITMENTS_LENGTH: usize = 4;
pub const KERNEL_NEW_NULLIFIERS_LENGTH: usize = 4;
pub const KERNEL_NEW_L2_TO_L1_MSGS_LENGTH: usize = 2;
pub const KERNEL_NEW_CONTRACTS_LENGTH: usize = 1;
pub const KERNEL_PRIVATE_CALL_STACK_LENGTH: usize = 8;
pub const KERNEL_PUBLIC_CALL_STACK_LENGTH: usize = 8;
pub const KERNEL_PUBLIC_DATA_UPDATE_REQUESTS_LENGTH: usize = 4;

// ============================================================================
// Tree heights
// ============================================================================

pub const VK_TREE_HEIGHT: usize = 3;

pub const PRIVATE_DATA_TREE_HEIGHT: usize = 32;
pub const NULLIFIER_TREE_HEIGHT: usize = 32;
pub const CONTRACT_TREE_HEIGHT: usize = 16;
pub const PUBLIC_DATA_TREE_HEIGHT: usize = 32;
pub const L1_TO_L2_MSG_TREE_HEIGHT: usize = 16;

pub const PRIVATE_DATA_TREE_ROOTS_TREE_HEIGHT: usize = 8;
pub const CONTRACT_TREE_ROOTS_TREE_HEIGHT: usize = 8;
pub const L1_TO_L2_MSG_TREE_ROOTS_TREE_HEIGHT: usize = 8;

/// Deepest tree any circuit touches; bounds the cached empty roots.
pub const MAX_TREE_HEIGHT: usize = 32;

// ============================================================================
// Base rollup subtrees (two kernels per base rollup)
// ============================================================================

pub const KERNELS_PER_BASE_ROLLUP: usize = 2;

pub const COMMITMENTS_PER_BASE_ROLLUP: usize = KERNELS_PER_BASE_ROLLUP * KERNEL_NEW_COMMITMENTS_LENGTH;
pub const NULLIFIERS_PER_BASE_ROLLUP: usize = KERNELS_PER_BASE_ROLLUP * KERNEL_NEW_NULLIFIERS_LENGTH;
pub const CONTRACTS_PER_BASE_ROLLUP: usize = KERNELS_PER_BASE_ROLLUP * KERNEL_NEW_CONTRACTS_LENGTH;
pub const PUBLIC_DATA_WRITES_PER_BASE_ROLLUP: usize =
    KERNELS_PER_BASE_ROLLUP * KERNEL_PUBLIC_DATA_UPDATE_REQUESTS_LENGTH;

pub const PRIVATE_DATA_SUBTREE_HEIGHT: u32 = 3;
pub const NULLIFIER_SUBTREE_HEIGHT: u32 = 3;
pub const CONTRACT_SUBTREE_HEIGHT: u32 = 1;

pub const PRIVATE_DATA_SUBTREE_SIBLING_PATH_LENGTH: usize =
    PRIVATE_DATA_TREE_HEIGHT - PRIVATE_DATA_SUBTREE_HEIGHT as usize;
pub const NULLIFIER_SUBTREE_SIBLING_PATH_LENGTH: usize =
    NULLIFIER_TREE_HEIGHT - NULLIFIER_SUBTREE_HEIGHT as usize;
pub const CONTRACT_SUBTREE_SIBLING_PATH_LENGTH: usize =
    CONTRACT_TREE_HEIGHT - CONTRACT_SUBTREE_HEIGHT as usize;

// ============================================================================
// Root rollup
// ============================================================================

pub const NUMBER_OF_L1_L2_MESSAGES_PER_ROLLUP: usize = 16;
pub const L1_TO_L2_MSG_SUBTREE_DEPTH: u32 = 4;
pub const L1_TO_L2_MSG_SUBTREE_SIBLING_PATH_LENGTH: usize =
    L1_TO_L2_MSG_TREE_HEIGHT - L1_TO_L2_MSG_SUBTREE_DEPTH as usize;

// ============================================================================
// Domain separation
// ============================================================================

/// Domain tag absorbed ahead of every compression.
///
/// Zero is reserved for Merkle node combination, so the numbering starts at 1.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorIndex {
    Commitment = 1,
    CommitmentPlaceholder,
    OuterCommitment,
    NullifierHashedPrivateKey,
    Nullifier,
    InitialisationNullifier,
    OuterNullifier,
    PublicDataRead,
    PublicDataUpdateRequest,
    Vk,
    FunctionData,
    FunctionLeaf,
    ContractDeploymentData,
    Constructor,
    ConstructorArgs,
    ContractAddress,
    ContractLeaf,
    CallContext,
    CallStackItem,
    CallStackItem2,
    L2ToL1Msg,
    PrivateCircuitPublicInputs,
    PublicCircuitPublicInputs,
    TxContext,
    TxRequest,
    PublicLeafIndex,
    PublicDataLeaf,
    SignedTxRequest,
    L1ToL2MessageSecret,
    FunctionArgs,
}

impl GeneratorIndex {
    pub fn as_field(self) -> Fr {
        Fr::from(self as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_numbering() {
        assert_eq!(GeneratorIndex::Commitment as u32, 1);
        assert_eq!(GeneratorIndex::Vk as u32, 10);
        assert_eq!(GeneratorIndex::SignedTxRequest as u32, 28);
        assert_eq!(GeneratorIndex::FunctionArgs as u32, 30);
    }

    #[test]
    fn test_subtree_sizes_fit_kernel_output() {
        assert_eq!(1usize << PRIVATE_DATA_SUBTREE_HEIGHT, COMMITMENTS_PER_BASE_ROLLUP);
        assert_eq!(1usize << NULLIFIER_SUBTREE_HEIGHT, NULLIFIERS_PER_BASE_ROLLUP);
        assert_eq!(1usize << CONTRACT_SUBTREE_HEIGHT, CONTRACTS_PER_BASE_ROLLUP);
        assert_eq!(1usize << L1_TO_L2_MSG_SUBTREE_DEPTH, NUMBER_OF_L1_L2_MESSAGES_PER_ROLLUP);
    }
}
