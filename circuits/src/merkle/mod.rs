//! Merkle helpers shared by every tree the circuits touch.
//!
//! All trees are binary, combine nodes with [`hash_pair`], and treat the
//! zero field element as the empty leaf (the function tree pads with its
//! own zero-leaf instead, see [`compute_tree`]).

pub mod snapshot;
pub mod tree;
pub mod world_state;

use std::sync::LazyLock;

use ark_bn254::Fr;
use ark_std::Zero;

use crate::abis::rollup::MembershipWitness;
use crate::composer::Composer;
use crate::constants::MAX_TREE_HEIGHT;
use crate::error::{CircuitError, Result};
use crate::hash::hash_pair;

pub use snapshot::insert_subtree_to_snapshot_tree;
pub use tree::MerkleTree;
pub use world_state::{RollupVkRoots, WorldState};

static EMPTY_ROOTS: LazyLock<Vec<Fr>> = LazyLock::new(|| {
    let mut roots = Vec::with_capacity(MAX_TREE_HEIGHT + 1);
    let mut current = Fr::zero();
    roots.push(current);
    for _ in 0..MAX_TREE_HEIGHT {
        current = hash_pair(&current, &current);
        roots.push(current);
    }
    roots
});

/// Root of a tree of the given depth whose leaves are all zero.
pub fn empty_tree_root(depth: usize) -> Fr {
    match EMPTY_ROOTS.get(depth) {
        Some(root) => *root,
        None => {
            let mut current = EMPTY_ROOTS[MAX_TREE_HEIGHT];
            for _ in MAX_TREE_HEIGHT..depth {
                current = hash_pair(&current, &current);
            }
            current
        }
    }
}

/// Folds `leaf` at `index` up through `path` (leaf-level sibling first).
pub fn root_from_path(leaf: Fr, index: u64, path: &[Fr]) -> Fr {
    let mut current = leaf;
    let mut index = index;
    for sibling in path {
        current = if index & 1 == 1 {
            hash_pair(sibling, &current)
        } else {
            hash_pair(&current, sibling)
        };
        index >>= 1;
    }
    current
}

/// Soft check that `leaf` sits at the witnessed position under `root`.
#[track_caller]
pub fn check_membership<C: Composer, const N: usize>(
    composer: &mut C,
    leaf: Fr,
    witness: &MembershipWitness<N>,
    root: Fr,
    message: &str,
) {
    let computed = root_from_path(leaf, witness.leaf_index, &witness.sibling_path);
    composer.assert_equal(computed, root, message);
}

/// Every node of a perfect tree of `height`, leaves first and root last.
///
/// `leaves` are right-filled with `padding` up to `2^height`.
pub fn compute_tree(leaves: &[Fr], height: usize, padding: Fr) -> Result<Vec<Fr>> {
    let width = 1usize << height;
    if leaves.len() > width {
        return Err(CircuitError::TooManyLeaves {
            got: leaves.len(),
            max: width,
        });
    }

    let mut nodes = Vec::with_capacity(2 * width - 1);
    nodes.extend_from_slice(leaves);
    nodes.resize(width, padding);

    let mut level_start = 0;
    let mut level_width = width;
    while level_width > 1 {
        for i in 0..level_width / 2 {
            let left = nodes[level_start + 2 * i];
            let right = nodes[level_start + 2 * i + 1];
            nodes.push(hash_pair(&left, &right));
        }
        level_start += level_width;
        level_width /= 2;
    }
    Ok(nodes)
}

pub fn compute_tree_root(leaves: &[Fr], height: usize, padding: Fr) -> Result<Fr> {
    let nodes = compute_tree(leaves, height, padding)?;
    Ok(nodes[nodes.len() - 1])
}

/// Sibling path of leaf `index` in a node list laid out by [`compute_tree`].
pub fn sibling_path_from_nodes(nodes: &[Fr], height: usize, index: u64) -> Result<Vec<Fr>> {
    let width = 1usize << height;
    if nodes.len() != 2 * width - 1 || index >= width as u64 {
        return Err(CircuitError::InvalidLeafIndex {
            index,
            depth: height,
        });
    }
    let mut path = Vec::with_capacity(height);
    let mut level_start = 0;
    let mut level_width = width;
    let mut position = index as usize;
    for _ in 0..height {
        path.push(nodes[level_start + (position ^ 1)]);
        level_start += level_width;
        level_width /= 2;
        position >>= 1;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_roots_chain() {
        assert_eq!(empty_tree_root(0), Fr::zero());
        let one = empty_tree_root(1);
        assert_eq!(one, hash_pair(&Fr::zero(), &Fr::zero()));
        assert_eq!(empty_tree_root(2), hash_pair(&one, &one));
        let deep = empty_tree_root(MAX_TREE_HEIGHT + 1);
        let top = empty_tree_root(MAX_TREE_HEIGHT);
        assert_eq!(deep, hash_pair(&top, &top));
    }

    #[test]
    fn test_compute_tree_matches_empty_root() {
        let nodes = compute_tree(&[], 3, Fr::zero()).unwrap();
        assert_eq!(nodes.len(), 15);
        assert_eq!(*nodes.last().unwrap(), empty_tree_root(3));
    }

    #[test]
    fn test_root_from_path_agrees_with_tree() {
        let leaves: Vec<Fr> = (1..=4u64).map(Fr::from).collect();
        let nodes = compute_tree(&leaves, 2, Fr::zero()).unwrap();
        // nodes: [l0 l1 l2 l3 | h01 h23 | root]
        let path = [nodes[3], nodes[4]];
        assert_eq!(root_from_path(leaves[2], 2, &path), nodes[6]);
    }

    #[test]
    fn test_sibling_path_from_nodes() {
        let leaves: Vec<Fr> = (1..=6u64).map(Fr::from).collect();
        let nodes = compute_tree(&leaves, 3, Fr::zero()).unwrap();
        let root = *nodes.last().unwrap();
        for (i, leaf) in leaves.iter().enumerate() {
            let path = sibling_path_from_nodes(&nodes, 3, i as u64).unwrap();
            assert_eq!(root_from_path(*leaf, i as u64, &path), root);
        }
        assert!(sibling_path_from_nodes(&nodes, 3, 8).is_err());
    }

    #[test]
    fn test_too_many_leaves() {
        let leaves = vec![Fr::from(1u64); 5];
        assert!(matches!(
            compute_tree(&leaves, 2, Fr::zero()),
            Err(CircuitError::TooManyLeaves { got: 5, max: 4 })
        ));
    }
}
