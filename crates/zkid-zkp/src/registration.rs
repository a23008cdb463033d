//! # Registration Tree Client
//!
//! Snapshot in, proof out: imports a serialized lean incremental Merkle
//! tree, finds a commitment and returns its membership proof rendered for a
//! fixed circuit depth. A commitment that is not in the tree is a normal
//! outcome ([`MembershipLookup::CommitmentNotInTree`]), not an error.

use serde::{Deserialize, Serialize};
use tracing::debug;
use zkid_core::FieldElement;
use zkid_crypto::{hash_pair, LeanImt, TreeError};

/// Membership proof padded to a circuit depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeProof {
    pub leaf: FieldElement,
    pub leaf_index: usize,
    pub root: FieldElement,
    /// Siblings leaf level first, zero padded to the circuit depth.
    pub siblings: Vec<FieldElement>,
    /// One entry per level: `1` when the path node is a right child.
    pub path: Vec<u8>,
    /// Number of real siblings.
    pub leaf_depth: usize,
}

/// Result of looking a commitment up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipLookup {
    Found(TreeProof),
    CommitmentNotInTree,
}

impl MembershipLookup {
    pub fn proof(&self) -> Option<&TreeProof> {
        match self {
            Self::Found(proof) => Some(proof),
            Self::CommitmentNotInTree => None,
        }
    }
}

impl TreeProof {
    /// Replay the hash chain over the real siblings.
    pub fn verify(&self) -> bool {
        if self.leaf_depth > self.siblings.len() || self.leaf_depth > self.path.len() {
            return false;
        }
        let mut node = self.leaf;
        for (sibling, bit) in self.siblings.iter().zip(&self.path).take(self.leaf_depth) {
            let hashed = if *bit == 1 {
                hash_pair(*sibling, node)
            } else {
                hash_pair(node, *sibling)
            };
            node = match hashed {
                Ok(h) => h,
                Err(_) => return false,
            };
        }
        node == self.root
    }
}

/// Look `commitment` up in a JSON tree snapshot.
pub fn membership_proof(
    snapshot: &str,
    commitment: &FieldElement,
    depth: usize,
) -> Result<MembershipLookup, TreeError> {
    let tree = LeanImt::import(snapshot)?;
    membership_proof_in(&tree, commitment, depth)
}

/// Look `commitment` up in an already imported tree.
pub fn membership_proof_in(
    tree: &LeanImt,
    commitment: &FieldElement,
    depth: usize,
) -> Result<MembershipLookup, TreeError> {
    if tree.depth() > depth {
        return Err(TreeError::DepthExceeded {
            depth: tree.depth(),
            max: depth,
        });
    }
    let Some(index) = tree.index_of(commitment) else {
        debug!(size = tree.size(), "commitment not in registration tree");
        return Ok(MembershipLookup::CommitmentNotInTree);
    };
    let proof = tree.generate_proof(index)?;
    let leaf_depth = proof.siblings.len();
    let mut siblings = proof.siblings;
    siblings.resize(depth, FieldElement::zero());
    let path = (0..depth)
        .map(|i| if i < 64 { ((proof.path >> i) & 1) as u8 } else { 0 })
        .collect();
    debug!(index, leaf_depth, "registration proof generated");
    Ok(MembershipLookup::Found(TreeProof {
        leaf: proof.leaf,
        leaf_index: index,
        root: proof.root,
        siblings,
        path,
        leaf_depth,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkid_core::constants::REGISTRATION_TREE_DEPTH;

    fn tree(n: u64) -> LeanImt {
        let leaves: Vec<_> = (100..100 + n).map(FieldElement::from_u64).collect();
        LeanImt::from_leaves(&leaves).unwrap()
    }

    #[test]
    fn zero_commitment_never_matches_removed_slot() {
        let mut t = tree(4);
        t.remove(2).unwrap();
        assert_eq!(
            membership_proof_in(&t, &FieldElement::zero(), REGISTRATION_TREE_DEPTH).unwrap(),
            MembershipLookup::CommitmentNotInTree
        );
        assert_eq!(
            membership_proof_in(&t, &FieldElement::from_u64(102), REGISTRATION_TREE_DEPTH).unwrap(),
            MembershipLookup::CommitmentNotInTree
        );
    }

    #[test]
    fn found_proof_is_padded_and_verifies() {
        let snapshot = tree(11).export();
        let lookup = membership_proof(&snapshot, &FieldElement::from_u64(105), REGISTRATION_TREE_DEPTH).unwrap();
        let proof = lookup.proof().unwrap();
        assert_eq!(proof.leaf_index, 5);
        assert_eq!(proof.siblings.len(), REGISTRATION_TREE_DEPTH);
        assert_eq!(proof.path.len(), REGISTRATION_TREE_DEPTH);
        assert_eq!(proof.leaf_depth, 4);
        assert!(proof.siblings[proof.leaf_depth..].iter().all(FieldElement::is_zero));
        assert!(proof.verify());
    }

    #[test]
    fn absent_commitment_is_not_an_error() {
        let lookup = membership_proof(&tree(4).export(), &FieldElement::from_u64(1), 33).unwrap();
        assert_eq!(lookup, MembershipLookup::CommitmentNotInTree);
    }

    #[test]
    fn every_leaf_verifies_after_mirror_updates() {
        let mut mirror = tree(9);
        mirror.insert(FieldElement::from_u64(7)).unwrap();
        mirror.update(3, FieldElement::from_u64(8)).unwrap();
        mirror.remove(0).unwrap();
        for leaf in [7u64, 8, 101, 108] {
            let lookup = membership_proof_in(&mirror, &FieldElement::from_u64(leaf), 33).unwrap();
            let proof = lookup.proof().unwrap();
            assert_eq!(proof.root, mirror.root().unwrap());
            assert!(proof.verify(), "leaf {leaf}");
        }
        let removed = membership_proof_in(&mirror, &FieldElement::from_u64(100), 33).unwrap();
        assert_eq!(removed, MembershipLookup::CommitmentNotInTree);
    }

    #[test]
    fn tampered_proof_fails() {
        let lookup = membership_proof_in(&tree(6), &FieldElement::from_u64(102), 33).unwrap();
        let mut proof = lookup.proof().unwrap().clone();
        proof.path[0] ^= 1;
        assert!(!proof.verify());
    }

    #[test]
    fn tree_deeper_than_circuit_rejected() {
        assert!(matches!(
            membership_proof_in(&tree(5), &FieldElement::from_u64(100), 2),
            Err(TreeError::DepthExceeded { depth: 3, max: 2 })
        ));
    }
}
