//! # Lean Incremental Merkle Tree
//!
//! Append-only binary Poseidon tree in the zk-kit "lean" layout: the depth
//! grows with the number of leaves, and a left child with no right sibling is
//! carried up to its parent unchanged instead of being hashed with a zero.
//!
//! ## Snapshot format
//!
//! The JSON export is an array of levels, each an array of decimal strings.
//! Level 0 holds the leaves and the last level holds the root. Import
//! rebuilds every internal node from the leaves and rejects snapshots whose
//! exported nodes disagree.
//!
//! ## Proofs
//!
//! A proof carries only the siblings that exist along the path. `path`
//! packs the corresponding left/right bits: bit `i` set means the node at
//! step `i` is a right child. Verification replays the hash chain from leaf
//! to root.

use serde::{Deserialize, Serialize};
use zkid_core::FieldElement;

use crate::error::TreeError;
use crate::poseidon::hash_pair;

/// In-memory lean incremental Merkle tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeanImt {
    levels: Vec<Vec<FieldElement>>,
}

/// Inclusion proof for one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeanImtProof {
    pub root: FieldElement,
    pub leaf: FieldElement,
    /// Position of the leaf in the tree.
    pub leaf_index: usize,
    /// Siblings that exist along the path, leaf level first.
    pub siblings: Vec<FieldElement>,
    /// Bit `i` is set when the node at step `i` is a right child.
    pub path: u64,
}

impl LeanImt {
    /// Empty tree.
    pub fn new() -> Self {
        Self {
            levels: vec![Vec::new()],
        }
    }

    /// Build a tree from an ordered leaf list.
    pub fn from_leaves(leaves: &[FieldElement]) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        for leaf in leaves {
            tree.insert(*leaf)?;
        }
        Ok(tree)
    }

    /// Number of leaves.
    pub fn size(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Current depth: `ceil(log2(size))`, zero for empty and one-leaf trees.
    pub fn depth(&self) -> usize {
        depth_for(self.size())
    }

    /// Root, or `None` for an empty tree.
    pub fn root(&self) -> Option<FieldElement> {
        if self.size() == 0 {
            return None;
        }
        self.levels.get(self.depth()).and_then(|l| l.first().copied())
    }

    /// Leaves in insertion order.
    pub fn leaves(&self) -> &[FieldElement] {
        self.levels.first().map_or(&[][..], Vec::as_slice)
    }

    /// Index of the first leaf equal to `leaf`. Zero marks a removed slot
    /// and is never found.
    pub fn index_of(&self, leaf: &FieldElement) -> Option<usize> {
        if leaf.is_zero() {
            return None;
        }
        self.leaves().iter().position(|l| l == leaf)
    }

    /// Append a leaf.
    pub fn insert(&mut self, leaf: FieldElement) -> Result<(), TreeError> {
        if self.levels.is_empty() {
            self.levels.push(Vec::new());
        }
        self.levels[0].push(leaf);
        let index = self.size() - 1;
        self.refresh_path(index)
    }

    /// Replace the leaf at `index`.
    pub fn update(&mut self, index: usize, leaf: FieldElement) -> Result<(), TreeError> {
        let size = self.size();
        if index >= size {
            return Err(TreeError::IndexOutOfRange { index, size });
        }
        self.levels[0][index] = leaf;
        self.refresh_path(index)
    }

    /// Remove the leaf at `index` by setting it to zero. The tree keeps its
    /// size.
    pub fn remove(&mut self, index: usize) -> Result<(), TreeError> {
        self.update(index, FieldElement::zero())
    }

    fn refresh_path(&mut self, leaf_index: usize) -> Result<(), TreeError> {
        let depth = self.depth();
        if self.levels.len() < depth + 1 {
            self.levels.resize(depth + 1, Vec::new());
        }
        let mut index = leaf_index;
        for level in 0..depth {
            let left = index & !1;
            let nodes = &self.levels[level];
            let node = match nodes.get(left + 1) {
                Some(right) => hash_pair(nodes[left], *right)?,
                None => nodes[left],
            };
            let parent = index >> 1;
            let next = &mut self.levels[level + 1];
            if parent < next.len() {
                next[parent] = node;
            } else {
                next.push(node);
            }
            index = parent;
        }
        Ok(())
    }

    /// Inclusion proof for the leaf at `index`.
    pub fn generate_proof(&self, index: usize) -> Result<LeanImtProof, TreeError> {
        let size = self.size();
        if index >= size {
            return Err(TreeError::IndexOutOfRange { index, size });
        }
        let root = self.root().ok_or(TreeError::IndexOutOfRange { index, size })?;
        let mut siblings = Vec::new();
        let mut path = 0u64;
        let mut cursor = index;
        for level in 0..self.depth() {
            let is_right = cursor & 1 == 1;
            let sibling_index = if is_right { cursor - 1 } else { cursor + 1 };
            if let Some(sibling) = self.levels[level].get(sibling_index) {
                if is_right {
                    path |= 1 << siblings.len();
                }
                siblings.push(*sibling);
            }
            cursor >>= 1;
        }
        Ok(LeanImtProof {
            root,
            leaf: self.levels[0][index],
            leaf_index: index,
            siblings,
            path,
        })
    }

    /// Replay a proof's hash chain and compare against its root.
    pub fn verify_proof(proof: &LeanImtProof) -> bool {
        let mut node = proof.leaf;
        for (i, sibling) in proof.siblings.iter().enumerate() {
            let hashed = if (proof.path >> i) & 1 == 1 {
                hash_pair(*sibling, node)
            } else {
                hash_pair(node, *sibling)
            };
            node = match hashed {
                Ok(h) => h,
                Err(_) => return false,
            };
        }
        node == proof.root
    }

    /// Export as JSON levels of decimal strings.
    pub fn export(&self) -> String {
        let levels: Vec<Vec<String>> = self
            .levels
            .iter()
            .take(self.depth() + 1)
            .map(|level| level.iter().map(FieldElement::to_decimal).collect())
            .collect();
        serde_json::Value::from(levels).to_string()
    }

    /// Import a JSON export, verifying it against the rebuilt tree.
    pub fn import(snapshot: &str) -> Result<Self, TreeError> {
        let raw: Vec<Vec<String>> = serde_json::from_str(snapshot)
            .map_err(|e| TreeError::MalformedSnapshot(e.to_string()))?;
        let exported = raw
            .iter()
            .map(|level| {
                level
                    .iter()
                    .map(|v| v.parse::<FieldElement>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        let leaves = exported.first().cloned().unwrap_or_default();
        let tree = Self::from_leaves(&leaves)?;
        for (level, nodes) in exported.iter().enumerate() {
            let rebuilt = tree.levels.get(level).map_or(&[][..], Vec::as_slice);
            if nodes.len() != rebuilt.len() {
                return Err(TreeError::InconsistentSnapshot {
                    level,
                    index: nodes.len().min(rebuilt.len()),
                });
            }
            if let Some(index) = nodes.iter().zip(rebuilt).position(|(a, b)| a != b) {
                return Err(TreeError::InconsistentSnapshot { level, index });
            }
        }
        Ok(tree)
    }
}

fn depth_for(size: usize) -> usize {
    if size <= 1 {
        0
    } else {
        (usize::BITS - (size - 1).leading_zeros()) as usize
    }
}
