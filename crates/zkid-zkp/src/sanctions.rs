//! # Sanctions Tree Client
//!
//! Derives sanctions-list keys from personal fields and produces sparse
//! Merkle proofs against caller-supplied list snapshots.
//!
//! Keys use the same folding hash as commitments:
//!
//! - `name_dob    = Poseidon2(fold(dob), fold(name))`
//! - `name_yob    = Poseidon2(fold(yob), fold(name))`
//! - `passport_no = Poseidon2(fold(passport number), fold(nationality))`
//!
//! A proof whose closest leaf carries the queried key is a sanctions hit.
//! Any other outcome is a valid non-membership proof; absence is never an
//! error.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zkid_core::constants::SANCTIONS_TREE_DEPTH;
use zkid_core::{AttestationCategory, DocumentProfile, FieldElement};
use zkid_crypto::{fold, hash_pair, HashError, SmtProof, SparseMerkleTree, TreeError};

use crate::layout::{layout, Attribute};

/// The three sanctions lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanctionsList {
    PassportNoAndNationality,
    NameAndDob,
    NameAndYob,
}

impl SanctionsList {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PassportNoAndNationality => "passport_no_and_nationality",
            Self::NameAndDob => "name_and_dob",
            Self::NameAndYob => "name_and_yob",
        }
    }

    /// Lists screened for `category`. Document-number screening applies to
    /// passports only.
    pub fn for_category(category: AttestationCategory) -> &'static [SanctionsList] {
        match category {
            AttestationCategory::Passport => &[Self::PassportNoAndNationality, Self::NameAndDob, Self::NameAndYob],
            _ => &[Self::NameAndDob, Self::NameAndYob],
        }
    }
}

impl std::fmt::Display for SanctionsList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SanctionsList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passport_no_and_nationality" => Ok(Self::PassportNoAndNationality),
            "name_and_dob" => Ok(Self::NameAndDob),
            "name_and_yob" => Ok(Self::NameAndYob),
            other => Err(format!("unknown sanctions list: {other}")),
        }
    }
}

/// Personal fields that feed the sanctions keys, in document encoding
/// (raw MRZ fields for passport-like documents).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionsSubject {
    pub name: String,
    /// `YYMMDD` (MRZ) or `YYYYMMDD` (QR).
    pub date_of_birth: String,
    #[serde(default)]
    pub document_number: String,
    #[serde(default)]
    pub nationality: String,
}

impl SanctionsSubject {
    /// Fields of a document: MRZ ranges for passport-like documents, the
    /// decoded personal fields for QR credentials.
    pub fn from_document(doc: &DocumentProfile) -> Self {
        match doc {
            DocumentProfile::PassportLike(doc) => {
                let l = layout(doc.category);
                let mrz = doc.mrz.as_bytes();
                let read = |attribute| {
                    l.field(attribute)
                        .and_then(|f| mrz.get(f.range()))
                        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                        .unwrap_or_default()
                };
                Self {
                    name: read(Attribute::Name),
                    date_of_birth: read(Attribute::DateOfBirth),
                    document_number: read(Attribute::DocumentNumber),
                    nationality: read(Attribute::Nationality),
                }
            }
            DocumentProfile::NationalQrCredential(cred) => Self {
                name: cred.personal.name.clone(),
                date_of_birth: cred.personal.date_of_birth.clone(),
                document_number: String::new(),
                nationality: String::new(),
            },
        }
    }

    /// Year of birth: `YY` from an MRZ date, `YYYY` from a full date.
    pub fn year_of_birth(&self) -> &str {
        let len = if self.date_of_birth.len() >= 8 { 4 } else { 2 };
        self.date_of_birth.get(..len).unwrap_or(&self.date_of_birth)
    }

    /// Key of this subject in `list`.
    pub fn key(&self, list: SanctionsList) -> Result<FieldElement, HashError> {
        match list {
            SanctionsList::NameAndDob => name_dob_key(&self.name, &self.date_of_birth),
            SanctionsList::NameAndYob => name_yob_key(&self.name, self.year_of_birth()),
            SanctionsList::PassportNoAndNationality => {
                passport_no_key(&self.document_number, &self.nationality)
            }
        }
    }
}

pub fn name_dob_key(name: &str, dob: &str) -> Result<FieldElement, HashError> {
    hash_pair(fold(dob.as_bytes())?, fold(name.as_bytes())?)
}

pub fn name_yob_key(name: &str, yob: &str) -> Result<FieldElement, HashError> {
    hash_pair(fold(yob.as_bytes())?, fold(name.as_bytes())?)
}

pub fn passport_no_key(passport_number: &str, nationality: &str) -> Result<FieldElement, HashError> {
    hash_pair(fold(passport_number.as_bytes())?, fold(nationality.as_bytes())?)
}

/// Sparse-tree proof rendered for the circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionsProof {
    pub list: SanctionsList,
    pub key: FieldElement,
    pub root: FieldElement,
    /// Key of the leaf the lookup reached: the queried key on a hit, the
    /// neighbouring key on a miss, zero for an empty slot.
    pub closest_leaf: FieldElement,
    pub leaf_depth: usize,
    /// Siblings leaf level first, zero padded to the circuit depth.
    pub siblings: Vec<FieldElement>,
    /// `true` when the subject is on the list.
    pub membership: bool,
}

/// Proof for `key` against a JSON list snapshot.
pub fn sanctions_proof(
    snapshot: &str,
    list: SanctionsList,
    key: FieldElement,
) -> Result<SanctionsProof, TreeError> {
    let tree = SparseMerkleTree::import(snapshot)?;
    sanctions_proof_in(&tree, list, key)
}

/// Proof for `key` against an imported tree.
pub fn sanctions_proof_in(
    tree: &SparseMerkleTree,
    list: SanctionsList,
    key: FieldElement,
) -> Result<SanctionsProof, TreeError> {
    let proof = tree.create_proof(&key)?;
    let rendered = render(list, proof)?;
    if rendered.membership {
        info!(%list, "sanctions list match");
    } else {
        debug!(%list, leaf_depth = rendered.leaf_depth, "sanctions non-membership proof");
    }
    Ok(rendered)
}

fn render(list: SanctionsList, proof: SmtProof) -> Result<SanctionsProof, TreeError> {
    let leaf_depth = proof.siblings.len();
    if leaf_depth > SANCTIONS_TREE_DEPTH {
        return Err(TreeError::DepthExceeded {
            depth: leaf_depth,
            max: SANCTIONS_TREE_DEPTH,
        });
    }
    let closest_leaf = if proof.membership {
        proof.key
    } else {
        proof.closest.map_or(FieldElement::zero(), |(k, _)| k)
    };
    let mut siblings: Vec<_> = proof.siblings.into_iter().rev().collect();
    siblings.resize(SANCTIONS_TREE_DEPTH, FieldElement::zero());
    Ok(SanctionsProof {
        list,
        key: proof.key,
        root: proof.root,
        closest_leaf,
        leaf_depth,
        siblings,
        membership: proof.membership,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkid_core::PassportLikeDocument;

    fn subject() -> SanctionsSubject {
        SanctionsSubject {
            name: "DOE<<JOHN".into(),
            date_of_birth: "750101".into(),
            document_number: "X12345678".into(),
            nationality: "UTO".into(),
        }
    }

    fn list_with(keys: &[FieldElement]) -> SparseMerkleTree {
        let mut tree = SparseMerkleTree::new();
        for key in keys {
            tree.insert(*key, FieldElement::from_u64(1)).unwrap();
        }
        tree
    }

    #[test]
    fn keys_follow_fold_composition() {
        let s = subject();
        assert_eq!(
            s.key(SanctionsList::NameAndDob).unwrap(),
            hash_pair(fold(b"750101").unwrap(), fold(b"DOE<<JOHN").unwrap()).unwrap()
        );
        assert_eq!(s.year_of_birth(), "75");
        assert_eq!(
            s.key(SanctionsList::NameAndYob).unwrap(),
            name_yob_key("DOE<<JOHN", "75").unwrap()
        );
        assert_ne!(
            s.key(SanctionsList::NameAndDob).unwrap(),
            s.key(SanctionsList::NameAndYob).unwrap()
        );
    }

    #[test]
    fn full_dates_use_four_digit_year() {
        let qr = SanctionsSubject {
            date_of_birth: "19840612".into(),
            ..subject()
        };
        assert_eq!(qr.year_of_birth(), "1984");
    }

    #[test]
    fn listed_subject_is_a_hit() {
        let s = subject();
        let key = s.key(SanctionsList::NameAndDob).unwrap();
        let tree = list_with(&[FieldElement::from_u64(11), key, FieldElement::from_u64(12)]);
        let proof = sanctions_proof(&tree.export(), SanctionsList::NameAndDob, key).unwrap();
        assert!(proof.membership);
        assert_eq!(proof.closest_leaf, key);
        assert_eq!(proof.root, tree.root());
        assert_eq!(proof.siblings.len(), SANCTIONS_TREE_DEPTH);
    }

    #[test]
    fn unlisted_subject_gets_non_membership_proof() {
        let s = subject();
        let tree = list_with(&[FieldElement::from_u64(11), FieldElement::from_u64(12)]);
        let key = s.key(SanctionsList::PassportNoAndNationality).unwrap();
        let proof = sanctions_proof_in(&tree, SanctionsList::PassportNoAndNationality, key).unwrap();
        assert!(!proof.membership);
        assert_ne!(proof.closest_leaf, key);
        assert!(proof.siblings[proof.leaf_depth..].iter().all(FieldElement::is_zero));
    }

    #[test]
    fn empty_list_proves_absence() {
        let proof = sanctions_proof_in(
            &SparseMerkleTree::new(),
            SanctionsList::NameAndYob,
            FieldElement::from_u64(5),
        )
        .unwrap();
        assert!(!proof.membership);
        assert!(proof.closest_leaf.is_zero());
        assert_eq!(proof.leaf_depth, 0);
    }

    #[test]
    fn passport_subject_reads_mrz_fields() {
        let mrz = format!(
            "{}{}",
            "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<",
            "L898902C36UTO7408122F1204159ZE184226B<<<<<10"
        );
        let doc = DocumentProfile::PassportLike(PassportLikeDocument {
            category: AttestationCategory::Passport,
            mrz,
            econtent: vec![1],
            signed_attributes: vec![1],
            signature: vec![1],
            dsc: vec![1],
            csca: None,
            metadata: None,
        });
        let s = SanctionsSubject::from_document(&doc);
        assert_eq!(s.name, "ERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<");
        assert_eq!(s.date_of_birth, "740812");
        assert_eq!(s.document_number, "L898902C3");
        assert_eq!(s.nationality, "UTO");
    }

    #[test]
    fn lists_per_category() {
        assert_eq!(SanctionsList::for_category(AttestationCategory::Passport).len(), 3);
        assert!(!SanctionsList::for_category(AttestationCategory::IdCard)
            .contains(&SanctionsList::PassportNoAndNationality));
        assert_eq!("name_and_yob".parse::<SanctionsList>().unwrap(), SanctionsList::NameAndYob);
    }
}
