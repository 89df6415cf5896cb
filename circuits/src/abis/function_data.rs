use ark_bn254::Fr;
use sha3::{Digest, Keccak256};

use crate::constants::{FUNCTION_SELECTOR_NUM_BYTES, FUNCTION_TREE_HEIGHT, GeneratorIndex};
use crate::error::Result;
use crate::hash::compress;
use crate::merkle::compute_tree;
use crate::serialize::impl_codec;

/// First four bytes of keccak-256 over the UTF-8 signature, in digest order.
pub fn compute_function_selector(signature: &str) -> [u8; FUNCTION_SELECTOR_NUM_BYTES] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut selector = [0u8; FUNCTION_SELECTOR_NUM_BYTES];
    selector.copy_from_slice(&digest[..FUNCTION_SELECTOR_NUM_BYTES]);
    selector
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionData {
    pub function_selector: u32,
    pub is_private: bool,
    pub is_constructor: bool,
}

impl_codec!(FunctionData {
    function_selector,
    is_private,
    is_constructor,
});

impl FunctionData {
    pub fn from_signature(signature: &str, is_private: bool, is_constructor: bool) -> Self {
        Self {
            function_selector: u32::from_be_bytes(compute_function_selector(signature)),
            is_private,
            is_constructor,
        }
    }

    pub fn hash(&self) -> Fr {
        compress(
            &[
                Fr::from(self.function_selector),
                Fr::from(self.is_private),
                Fr::from(self.is_constructor),
            ],
            GeneratorIndex::FunctionData,
        )
    }
}

/// Preimage of a function tree leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctionLeafPreimage {
    pub function_selector: u32,
    pub is_private: bool,
    pub vk_hash: Fr,
    pub acir_hash: Fr,
}

impl_codec!(FunctionLeafPreimage {
    function_selector,
    is_private,
    vk_hash,
    acir_hash,
});

impl FunctionLeafPreimage {
    pub fn hash(&self) -> Fr {
        compress(
            &[
                Fr::from(self.function_selector),
                Fr::from(self.is_private),
                self.vk_hash,
                self.acir_hash,
            ],
            GeneratorIndex::FunctionLeaf,
        )
    }

    /// Leaf used to pad function trees: the hash of the empty preimage.
    pub fn zero_leaf() -> Fr {
        Self::default().hash()
    }
}

/// Every node of the function tree over `leaves`, leaves first, root last.
pub fn compute_function_tree(leaves: &[Fr]) -> Result<Vec<Fr>> {
    compute_tree(leaves, FUNCTION_TREE_HEIGHT, FunctionLeafPreimage::zero_leaf())
}

pub fn compute_function_tree_root(leaves: &[Fr]) -> Result<Fr> {
    let tree = compute_function_tree(leaves)?;
    Ok(tree[tree.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CircuitError;

    #[test]
    fn test_transfer_selector() {
        let selector = compute_function_selector("transfer(address,uint256)");
        assert_eq!(hex::encode(selector), "a9059cbb");
        let data = FunctionData::from_signature("transfer(address,uint256)", true, false);
        assert_eq!(data.function_selector, 0xa905_9cbb);
    }

    #[test]
    fn test_flags_change_hash() {
        let a = FunctionData {
            function_selector: 1,
            is_private: true,
            is_constructor: false,
        };
        let b = FunctionData {
            is_private: false,
            ..a
        };
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_zero_leaf_is_not_zero() {
        use ark_std::Zero;
        assert!(!FunctionLeafPreimage::zero_leaf().is_zero());
    }

    #[test]
    fn test_function_tree_shape() {
        let leaves = vec![Fr::from(1u64), Fr::from(2u64)];
        let tree = compute_function_tree(&leaves).unwrap();
        assert_eq!(tree.len(), 2 * (1 << FUNCTION_TREE_HEIGHT) - 1);
        assert_eq!(tree[0], leaves[0]);
        assert_eq!(tree[2], FunctionLeafPreimage::zero_leaf());
        assert_eq!(*tree.last().unwrap(), compute_function_tree_root(&leaves).unwrap());
    }

    #[test]
    fn test_function_tree_overflow() {
        let leaves = vec![Fr::from(1u64); (1 << FUNCTION_TREE_HEIGHT) + 1];
        assert!(matches!(
            compute_function_tree_root(&leaves),
            Err(CircuitError::TooManyLeaves { .. })
        ));
    }
}
