//! Append-only tree snapshot algebra.
//!
//! ```text
//!   start = (root_A, next)          end = (root_B, next + 2^h)
//!
//!              root_A                           root_B
//!             /   …                            /   …
//!     [ expected subtree ]   ──────►   [ new subtree ]
//!       at leaf `next`                   at leaf `next`
//! ```
//!
//! One sibling path proves both roots: folding the expected subtree root
//! must land on `root_A`, and folding the new subtree root yields `root_B`.

use ark_bn254::Fr;

use crate::abis::rollup::AppendOnlyTreeSnapshot;
use crate::composer::Composer;
use crate::error::{CircuitError, Result};
use crate::merkle::root_from_path;

/// Inserts a subtree of height `subtree_height` at `snapshot.next_available_leaf_index`.
///
/// A root mismatch is a soft failure recorded under `message`. Misalignment
/// and running past the end of the tree are fatal.
#[track_caller]
pub fn insert_subtree_to_snapshot_tree<C: Composer>(
    composer: &mut C,
    snapshot: &AppendOnlyTreeSnapshot,
    sibling_path: &[Fr],
    expected_current_subtree_root: Fr,
    new_subtree_root: Fr,
    subtree_height: u32,
    message: &str,
) -> Result<AppendOnlyTreeSnapshot> {
    let index = snapshot.next_available_leaf_index;
    let depth = subtree_height as usize + sibling_path.len();
    if depth >= 64 {
        return Err(CircuitError::TreeFull { depth, index });
    }

    let subtree_size = 1u64 << subtree_height;
    if index % subtree_size != 0 {
        return Err(CircuitError::MisalignedInsertion {
            index,
            subtree_height,
        });
    }

    let subtree_index = index >> subtree_height;
    if subtree_index >= 1u64 << sibling_path.len() {
        return Err(CircuitError::TreeFull { depth, index });
    }

    let current_root = root_from_path(expected_current_subtree_root, subtree_index, sibling_path);
    composer.assert_equal(current_root, snapshot.root, message);

    Ok(AppendOnlyTreeSnapshot {
        root: root_from_path(new_subtree_root, subtree_index, sibling_path),
        next_available_leaf_index: index + subtree_size,
    })
}
