//! Reference Merkle tree for building witnesses.
//!
//! The circuits never own tree storage; callers (the rollup simulator,
//! tests) keep one of these per tree to produce snapshots and sibling paths
//! the circuits then check.
//!
//! ```text
//!                    Root
//!                   /    \
//!                 H01    H23
//!                /  \   /   \
//!               L0  L1 L2   L3
//! ```
//!
//! Sparse: only non-empty nodes are stored; missing nodes are the empty
//! root of their level.

use std::collections::HashMap;

use ark_bn254::Fr;
use ark_std::Zero;

use crate::abis::rollup::{AppendOnlyTreeSnapshot, MembershipWitness};
use crate::error::{CircuitError, Result};
use crate::hash::hash_pair;
use crate::merkle::empty_tree_root;

#[derive(Debug, Clone)]
pub struct MerkleTree {
    depth: usize,
    /// Non-empty nodes: (level, index) -> hash
    nodes: HashMap<(usize, u64), Fr>,
    next_index: u64,
    root: Fr,
}

impl MerkleTree {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            nodes: HashMap::new(),
            next_index: 0,
            root: empty_tree_root(depth),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn root(&self) -> Fr {
        self.root
    }

    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    fn capacity(&self) -> u64 {
        1u64 << self.depth
    }

    pub fn snapshot(&self) -> AppendOnlyTreeSnapshot {
        AppendOnlyTreeSnapshot {
            root: self.root,
            next_available_leaf_index: self.next_index,
        }
    }

    fn node(&self, level: usize, index: u64) -> Fr {
        self.nodes
            .get(&(level, index))
            .copied()
            .unwrap_or_else(|| empty_tree_root(level))
    }

    fn check_index(&self, index: u64) -> Result<()> {
        if index >= self.capacity() {
            return Err(CircuitError::InvalidLeafIndex {
                index,
                depth: self.depth,
            });
        }
        Ok(())
    }

    fn write_leaf(&mut self, index: u64, value: Fr) {
        self.nodes.insert((0, index), value);

        let mut current_index = index;
        let mut current = value;
        for level in 0..self.depth {
            let is_right = current_index & 1 == 1;
            let sibling = self.node(level, current_index ^ 1);
            current = if is_right {
                hash_pair(&sibling, &current)
            } else {
                hash_pair(&current, &sibling)
            };
            current_index >>= 1;
            self.nodes.insert((level + 1, current_index), current);
        }
        self.root = current;
    }

    /// Appends leaves at the next free positions.
    pub fn append_leaves(&mut self, leaves: &[Fr]) -> Result<()> {
        let end = self.next_index + leaves.len() as u64;
        if end > self.capacity() {
            return Err(CircuitError::TreeFull {
                depth: self.depth,
                index: self.next_index,
            });
        }
        for leaf in leaves {
            self.write_leaf(self.next_index, *leaf);
            self.next_index += 1;
        }
        Ok(())
    }

    /// Overwrites one leaf in place. Does not move the append cursor.
    pub fn update_leaf(&mut self, index: u64, value: Fr) -> Result<()> {
        self.check_index(index)?;
        self.write_leaf(index, value);
        Ok(())
    }

    pub fn get_leaf(&self, index: u64) -> Fr {
        self.nodes.get(&(0, index)).copied().unwrap_or_else(Fr::zero)
    }

    /// First appended position holding `value`.
    pub fn find_leaf_index(&self, value: &Fr) -> Option<u64> {
        (0..self.next_index).find(|i| self.get_leaf(*i) == *value)
    }

    /// Siblings from the leaf level up to (not including) the root.
    pub fn sibling_path(&self, index: u64) -> Result<Vec<Fr>> {
        self.check_index(index)?;
        Ok(self.path_from(0, index))
    }

    /// Path for a subtree of `subtree_height` rooted at the append cursor.
    pub fn subtree_sibling_path(&self, subtree_height: u32) -> Result<Vec<Fr>> {
        let height = subtree_height as usize;
        if height > self.depth {
            return Err(CircuitError::InvalidLeafIndex {
                index: self.next_index,
                depth: self.depth,
            });
        }
        self.check_index(self.next_index)?;
        Ok(self.path_from(height, self.next_index >> height))
    }

    pub fn membership_witness<const N: usize>(&self, index: u64) -> Result<MembershipWitness<N>> {
        let path = self.sibling_path(index)?;
        let sibling_path: [Fr; N] =
            path.try_into()
                .map_err(|path: Vec<Fr>| CircuitError::ArrayLength {
                    expected: N,
                    got: path.len(),
                })?;
        Ok(MembershipWitness {
            leaf_index: index,
            sibling_path,
        })
    }

    fn path_from(&self, start_level: usize, index: u64) -> Vec<Fr> {
        let mut siblings = Vec::with_capacity(self.depth - start_level);
        let mut current_index = index;
        for level in start_level..self.depth {
            siblings.push(self.node(level, current_index ^ 1));
            current_index >>= 1;
        }
        siblings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::{compute_tree_root, root_from_path};

    #[test]
    fn test_empty_tree() {
        let tree = MerkleTree::new(8);
        assert_eq!(tree.next_index(), 0);
        assert_eq!(tree.root(), empty_tree_root(8));
    }

    #[test]
    fn test_append_matches_dense_tree() {
        let leaves: Vec<Fr> = (1..=5u64).map(Fr::from).collect();
        let mut tree = MerkleTree::new(3);
        tree.append_leaves(&leaves).unwrap();
        assert_eq!(tree.root(), compute_tree_root(&leaves, 3, Fr::zero()).unwrap());
        assert_eq!(tree.next_index(), 5);
    }

    #[test]
    fn test_paths_verify() {
        let mut tree = MerkleTree::new(4);
        tree.append_leaves(&[Fr::from(10u64), Fr::from(20u64), Fr::from(30u64)])
            .unwrap();
        for index in 0..3u64 {
            let path = tree.sibling_path(index).unwrap();
            assert_eq!(root_from_path(tree.get_leaf(index), index, &path), tree.root());
        }
        let empty_path = tree.sibling_path(9).unwrap();
        assert_eq!(root_from_path(Fr::zero(), 9, &empty_path), tree.root());
    }

    #[test]
    fn test_update_leaf_keeps_cursor() {
        let mut tree = MerkleTree::new(4);
        tree.update_leaf(7, Fr::from(3u64)).unwrap();
        assert_eq!(tree.next_index(), 0);
        assert_eq!(tree.get_leaf(7), Fr::from(3u64));
        assert_ne!(tree.root(), empty_tree_root(4));
        assert!(tree.update_leaf(16, Fr::from(1u64)).is_err());
    }

    #[test]
    fn test_subtree_path() {
        let mut tree = MerkleTree::new(4);
        tree.append_leaves(&[Fr::from(1u64); 4]).unwrap();
        let path = tree.subtree_sibling_path(2).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(root_from_path(empty_tree_root(2), 1, &path), tree.root());
    }

    #[test]
    fn test_full_tree_rejects_append() {
        let mut tree = MerkleTree::new(1);
        tree.append_leaves(&[Fr::from(1u64), Fr::from(2u64)]).unwrap();
        assert!(matches!(
            tree.append_leaves(&[Fr::from(3u64)]),
            Err(CircuitError::TreeFull { depth: 1, index: 2 })
        ));
    }

    #[test]
    fn test_membership_witness_length() {
        let tree = MerkleTree::new(3);
        let witness: MembershipWitness<3> = tree.membership_witness(2).unwrap();
        assert_eq!(witness.leaf_index, 2);
        assert!(tree.membership_witness::<4>(2).is_err());
    }
}
