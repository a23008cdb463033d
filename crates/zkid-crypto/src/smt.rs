//! # Sparse Merkle Tree
//!
//! Key/value Poseidon SMT in the zk-kit layout used for sanctions lists.
//!
//! - Leaf: `Poseidon3(key, value, 1)`.
//! - Branch: `Poseidon2(left, right)`.
//! - Empty subtree: `0`.
//! - Path: bits of the key, least significant first. Leaves sit at the
//!   shallowest depth that separates them from every other key.
//!
//! ## Proofs
//!
//! A lookup walks from the root following the key's bits until it reaches an
//! empty slot or a leaf. The leaf reached is the *closest* entry: same key
//! means membership; a different key (or an empty slot) certifies that the
//! queried key is absent. Absence is a normal result, never an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use zkid_core::FieldElement;

use crate::error::TreeError;
use crate::poseidon::{hash_pair, poseidon_hash};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Branch(FieldElement, FieldElement),
    Leaf(FieldElement, FieldElement),
}

/// In-memory sparse Merkle tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseMerkleTree {
    root: FieldElement,
    nodes: HashMap<FieldElement, Node>,
}

/// Membership or non-membership proof for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtProof {
    /// Key that was queried.
    pub key: FieldElement,
    /// Stored value, on membership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldElement>,
    /// Leaf reached by the lookup, when it holds a different key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closest: Option<(FieldElement, FieldElement)>,
    /// Siblings from the root down to the reached slot.
    pub siblings: Vec<FieldElement>,
    pub root: FieldElement,
    pub membership: bool,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    root: String,
    nodes: Vec<(String, Vec<String>)>,
}

impl Default for SparseMerkleTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseMerkleTree {
    /// Empty tree (root `0`).
    pub fn new() -> Self {
        Self {
            root: FieldElement::zero(),
            nodes: HashMap::new(),
        }
    }

    /// Current root.
    pub fn root(&self) -> FieldElement {
        self.root
    }

    /// Leaf hash of an entry.
    pub fn leaf_hash(key: FieldElement, value: FieldElement) -> Result<FieldElement, TreeError> {
        Ok(poseidon_hash(&[key, value, FieldElement::from_u64(1)])?)
    }

    fn node(&self, hash: &FieldElement) -> Result<Node, TreeError> {
        self.nodes
            .get(hash)
            .copied()
            .ok_or_else(|| TreeError::MalformedSnapshot(format!("missing node {hash}")))
    }

    /// Walk towards `key`: returns the siblings passed and the terminal
    /// slot (`None` when empty, otherwise the leaf's key and value).
    fn descend(
        &self,
        key: &FieldElement,
    ) -> Result<(Vec<FieldElement>, Option<(FieldElement, FieldElement)>), TreeError> {
        let mut siblings = Vec::new();
        let mut cursor = self.root;
        let mut depth = 0;
        loop {
            if cursor.is_zero() {
                return Ok((siblings, None));
            }
            match self.node(&cursor)? {
                Node::Leaf(k, v) => return Ok((siblings, Some((k, v)))),
                Node::Branch(left, right) => {
                    if key.bit(depth) {
                        siblings.push(left);
                        cursor = right;
                    } else {
                        siblings.push(right);
                        cursor = left;
                    }
                    depth += 1;
                }
            }
        }
    }

    /// Look up `key`, returning its value when present.
    pub fn get(&self, key: &FieldElement) -> Result<Option<FieldElement>, TreeError> {
        let (_, slot) = self.descend(key)?;
        Ok(slot.and_then(|(k, v)| (k == *key).then_some(v)))
    }

    /// Insert a new entry. Existing keys are rejected.
    pub fn insert(&mut self, key: FieldElement, value: FieldElement) -> Result<(), TreeError> {
        let (siblings, slot) = self.descend(&key)?;
        let depth = siblings.len();
        if matches!(slot, Some((other_key, _)) if other_key == key) {
            return Err(TreeError::KeyExists(key.to_decimal()));
        }

        let new_leaf = Self::leaf_hash(key, value)?;
        self.nodes.insert(new_leaf, Node::Leaf(key, value));

        let mut node = new_leaf;
        if let Some((other_key, other_value)) = slot {
            let other_leaf = Self::leaf_hash(other_key, other_value)?;
            let mut split = depth;
            while key.bit(split) == other_key.bit(split) {
                split += 1;
            }
            node = if key.bit(split) {
                self.branch(other_leaf, new_leaf)?
            } else {
                self.branch(new_leaf, other_leaf)?
            };
            for level in (depth..split).rev() {
                node = if key.bit(level) {
                    self.branch(FieldElement::zero(), node)?
                } else {
                    self.branch(node, FieldElement::zero())?
                };
            }
        }

        for (level, sibling) in siblings.iter().enumerate().rev() {
            node = if key.bit(level) {
                self.branch(*sibling, node)?
            } else {
                self.branch(node, *sibling)?
            };
        }
        self.root = node;
        Ok(())
    }

    fn branch(&mut self, left: FieldElement, right: FieldElement) -> Result<FieldElement, TreeError> {
        let hash = hash_pair(left, right)?;
        self.nodes.insert(hash, Node::Branch(left, right));
        Ok(hash)
    }

    /// Membership or non-membership proof for `key`.
    pub fn create_proof(&self, key: &FieldElement) -> Result<SmtProof, TreeError> {
        let (siblings, slot) = self.descend(key)?;
        let (value, closest, membership) = match slot {
            Some((k, v)) if k == *key => (Some(v), None, true),
            Some(entry) => (None, Some(entry), false),
            None => (None, None, false),
        };
        Ok(SmtProof {
            key: *key,
            value,
            closest,
            siblings,
            root: self.root,
            membership,
        })
    }

    /// Recompute the root from a proof.
    pub fn verify_proof(proof: &SmtProof) -> bool {
        let (path_key, mut node) = match (&proof.value, &proof.closest) {
            (Some(value), None) if proof.membership => match Self::leaf_hash(proof.key, *value) {
                Ok(h) => (proof.key, h),
                Err(_) => return false,
            },
            (None, Some((k, v))) if !proof.membership && *k != proof.key => {
                match Self::leaf_hash(*k, *v) {
                    Ok(h) => (*k, h),
                    Err(_) => return false,
                }
            }
            (None, None) if !proof.membership => (proof.key, FieldElement::zero()),
            _ => return false,
        };
        if let Some((k, _)) = &proof.closest {
            // The closest leaf must share the queried key's path prefix.
            if (0..proof.siblings.len()).any(|i| k.bit(i) != proof.key.bit(i)) {
                return false;
            }
        }
        for (level, sibling) in proof.siblings.iter().enumerate().rev() {
            let hashed = if path_key.bit(level) {
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

    /// Export as `{root, nodes}` with decimal strings. Branch entries list two
    /// children, leaf entries list `[key, value, 1]`.
    pub fn export(&self) -> String {
        let mut nodes: Vec<(String, Vec<String>)> = self
            .reachable()
            .into_iter()
            .map(|(hash, node)| {
                let children = match node {
                    Node::Branch(l, r) => vec![l.to_decimal(), r.to_decimal()],
                    Node::Leaf(k, v) => vec![k.to_decimal(), v.to_decimal(), "1".to_string()],
                };
                (hash.to_decimal(), children)
            })
            .collect();
        nodes.sort();
        let snapshot = Snapshot {
            root: self.root.to_decimal(),
            nodes,
        };
        serde_json::to_string(&snapshot).unwrap_or_default()
    }

    fn reachable(&self) -> Vec<(FieldElement, Node)> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(hash) = stack.pop() {
            if hash.is_zero() {
                continue;
            }
            if let Some(node) = self.nodes.get(&hash) {
                out.push((hash, *node));
                if let Node::Branch(l, r) = node {
                    stack.push(*l);
                    stack.push(*r);
                }
            }
        }
        out
    }

    /// Import a `{root, nodes}` export. Every node's hash is recomputed.
    pub fn import(snapshot: &str) -> Result<Self, TreeError> {
        let raw: Snapshot = serde_json::from_str(snapshot)
            .map_err(|e| TreeError::MalformedSnapshot(e.to_string()))?;
        let mut nodes = HashMap::with_capacity(raw.nodes.len());
        for (hash, children) in &raw.nodes {
            let hash: FieldElement = hash.parse()?;
            let children = children
                .iter()
                .map(|c| c.parse::<FieldElement>())
                .collect::<Result<Vec<_>, _>>()?;
            let (node, recomputed) = match children.as_slice() {
                [l, r] => (Node::Branch(*l, *r), hash_pair(*l, *r)?),
                [k, v, one] if *one == FieldElement::from_u64(1) => {
                    (Node::Leaf(*k, *v), Self::leaf_hash(*k, *v)?)
                }
                _ => {
                    return Err(TreeError::MalformedSnapshot(format!(
                        "node {hash} has {} children",
                        children.len()
                    )))
                }
            };
            if recomputed != hash {
                return Err(TreeError::MalformedSnapshot(format!(
                    "node {hash} does not hash to its key"
                )));
            }
            nodes.insert(hash, node);
        }
        let root: FieldElement = raw.root.parse()?;
        let tree = Self { root, nodes };
        if !root.is_zero() {
            tree.node(&root)?;
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(n: u64) -> FieldElement {
        FieldElement::from_u64(n)
    }

    fn sample() -> SparseMerkleTree {
        let mut tree = SparseMerkleTree::new();
        for (k, v) in [(0b0001, 10), (0b0101, 20), (0b0010, 30), (0b1101, 40)] {
            tree.insert(fe(k), fe(v)).unwrap();
        }
        tree
    }

    #[test]
    fn single_entry_root_is_leaf_hash() {
        let mut tree = SparseMerkleTree::new();
        tree.insert(fe(7), fe(1)).unwrap();
        assert_eq!(tree.root(), SparseMerkleTree::leaf_hash(fe(7), fe(1)).unwrap());
    }

    #[test]
    fn two_entries_split_on_first_differing_bit() {
        let mut tree = SparseMerkleTree::new();
        tree.insert(fe(0b01), fe(1)).unwrap();
        tree.insert(fe(0b11), fe(2)).unwrap();
        let a = SparseMerkleTree::leaf_hash(fe(0b01), fe(1)).unwrap();
        let b = SparseMerkleTree::leaf_hash(fe(0b11), fe(2)).unwrap();
        let inner = hash_pair(a, b).unwrap();
        let expected = hash_pair(FieldElement::zero(), inner).unwrap();
        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn membership_proofs_verify() {
        let tree = sample();
        for (k, v) in [(0b0001, 10), (0b0101, 20), (0b0010, 30), (0b1101, 40)] {
            let proof = tree.create_proof(&fe(k)).unwrap();
            assert!(proof.membership);
            assert_eq!(proof.value, Some(fe(v)));
            assert!(SparseMerkleTree::verify_proof(&proof));
        }
    }

    #[test]
    fn non_membership_proofs_verify() {
        let tree = sample();
        for k in [0b1001u64, 0b0100, 0b0110, 99] {
            let proof = tree.create_proof(&fe(k)).unwrap();
            assert!(!proof.membership);
            assert!(proof.value.is_none());
            assert!(SparseMerkleTree::verify_proof(&proof), "key {k}");
        }
    }

    #[test]
    fn forged_membership_rejected() {
        let tree = sample();
        let mut proof = tree.create_proof(&fe(0b1001)).unwrap();
        proof.membership = true;
        proof.value = Some(fe(1));
        proof.closest = None;
        assert!(!SparseMerkleTree::verify_proof(&proof));
    }

    #[test]
    fn duplicate_key_rejected() {
        let mut tree = sample();
        assert!(matches!(tree.insert(fe(0b0101), fe(1)), Err(TreeError::KeyExists(_))));
    }

    #[test]
    fn export_import_roundtrip() {
        let tree = sample();
        let back = SparseMerkleTree::import(&tree.export()).unwrap();
        assert_eq!(back.root(), tree.root());
        assert_eq!(back.get(&fe(0b0010)).unwrap(), Some(fe(30)));
        assert_eq!(back.get(&fe(0b0011)).unwrap(), None);
    }

    #[test]
    fn tampered_export_rejected() {
        let tree = sample();
        let json = tree.export().replacen("\"10\"", "\"11\"", 1);
        assert!(matches!(
            SparseMerkleTree::import(&json),
            Err(TreeError::MalformedSnapshot(_))
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn random_trees_prove_every_key(keys in proptest::collection::btree_set(any::<u64>(), 1..12), absent in any::<u64>()) {
            let keys: BTreeSet<u64> = keys;
            let mut tree = SparseMerkleTree::new();
            for k in &keys {
                tree.insert(FieldElement::from_u64(*k), FieldElement::from_u64(k.wrapping_mul(3))).unwrap();
            }
            for k in &keys {
                let proof = tree.create_proof(&FieldElement::from_u64(*k)).unwrap();
                prop_assert!(proof.membership);
                prop_assert!(SparseMerkleTree::verify_proof(&proof));
            }
            if !keys.contains(&absent) {
                let proof = tree.create_proof(&FieldElement::from_u64(absent)).unwrap();
                prop_assert!(!proof.membership);
                prop_assert!(SparseMerkleTree::verify_proof(&proof));
            }
        }
    }
}
