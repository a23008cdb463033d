//! # Witness Pipeline Tests
//!
//! Runs the real passport and identity-card fixtures shared with
//! `zkid-crypto` through every stage: metadata resolution, circuit identity,
//! support checks, commitments, registration and sanctions proofs, circuit
//! inputs and disclosure decoding.

use chrono::NaiveDate;
use zkid_core::{DocumentProfile, FieldElement, PassportLikeDocument, SecretScalar};
use zkid_crypto::{ensure_metadata, LeanImt, SparseMerkleTree};
use zkid_zkp::codec::pack_reveal;
use zkid_zkp::disclose::signal_indices;
use zkid_zkp::{
    candidate_commitments, check_document_support, derive, dsc_circuit_name, format_revealed_data,
    membership_proof_in, register_circuit_name, sanctions_proof_in, Attribute, DeployedCircuits,
    DiscloseInputs, DiscloseRequest, DocumentSupportStatus, DscInputs, MembershipLookup,
    RegisterInputs, SanctionsList, SanctionsSubject,
};

const PASSPORT: &str = include_str!("../../zkid-crypto/tests/fixtures/passport_rsapss.json");
const ID_CARD: &str = include_str!("../../zkid-crypto/tests/fixtures/id_card_ecdsa.json");

const PASSPORT_REGISTER: &str = "register_sha256_sha256_sha256_rsapss_65537_32_3072";
const PASSPORT_DSC: &str = "dsc_sha256_rsapss_65537_32_4096";
const ID_REGISTER: &str = "register_id_sha256_sha256_sha256_ecdsa_secp256r1";
const ID_DSC: &str = "dsc_sha256_ecdsa_secp384r1";

fn resolved(json: &str) -> PassportLikeDocument {
    let mut doc = match serde_json::from_str::<DocumentProfile>(json).unwrap() {
        DocumentProfile::PassportLike(doc) => doc,
        other => panic!("expected passport-like fixture, got {:?}", other.document_category()),
    };
    ensure_metadata(&mut doc).unwrap();
    doc
}

fn secret() -> SecretScalar {
    SecretScalar::parse("424242").unwrap()
}

fn deployed() -> DeployedCircuits {
    DeployedCircuits::from_json(&format!(
        r#"{{"register": ["{PASSPORT_REGISTER}", "{ID_REGISTER}"], "dsc": ["{PASSPORT_DSC}", "{ID_DSC}"]}}"#
    ))
    .unwrap()
}

// ---------------------------------------------------------------------------
// Circuit identity and support
// ---------------------------------------------------------------------------

#[test]
fn passport_maps_to_rsapss_circuits() {
    let doc = resolved(PASSPORT);
    assert_eq!(
        register_circuit_name(&DocumentProfile::PassportLike(doc.clone())).unwrap(),
        PASSPORT_REGISTER
    );
    assert_eq!(dsc_circuit_name(&doc).unwrap(), PASSPORT_DSC);
}

#[test]
fn id_card_maps_to_ecdsa_circuits() {
    let doc = resolved(ID_CARD);
    assert_eq!(
        register_circuit_name(&DocumentProfile::PassportLike(doc.clone())).unwrap(),
        ID_REGISTER
    );
    assert_eq!(dsc_circuit_name(&doc).unwrap(), ID_DSC);
}

#[test]
fn fixtures_are_supported_when_deployed() {
    for json in [PASSPORT, ID_CARD] {
        let doc = DocumentProfile::PassportLike(resolved(json));
        let report = check_document_support(&doc, &deployed());
        assert!(report.status.is_supported(), "{report:?}");
    }
}

#[test]
fn missing_issuer_circuit_reported() {
    let doc = DocumentProfile::PassportLike(resolved(ID_CARD));
    let only_register = DeployedCircuits::from_json(&format!(r#"{{"register": ["{ID_REGISTER}"]}}"#)).unwrap();
    let report = check_document_support(&doc, &only_register);
    assert_eq!(report.status, DocumentSupportStatus::IssuerCircuitUnsupported);
    assert_eq!(report.circuit.as_deref(), Some(ID_DSC));
}

// ---------------------------------------------------------------------------
// Commitments
// ---------------------------------------------------------------------------

#[test]
fn commitment_is_deterministic_and_secret_bound() {
    let doc = DocumentProfile::PassportLike(resolved(PASSPORT));
    let first = derive(&secret(), &doc).unwrap();
    let second = derive(&secret(), &doc).unwrap();
    assert_eq!(first, second);

    let other = derive(&SecretScalar::parse("7").unwrap(), &doc).unwrap();
    assert_ne!(first.commitment, other.commitment);
    assert_eq!(first.nullifier, other.nullifier);
}

#[test]
fn own_csca_candidate_reproduces_commitment() {
    let passport = resolved(PASSPORT);
    let id_card = resolved(ID_CARD);
    let doc = DocumentProfile::PassportLike(passport.clone());
    let own = derive(&secret(), &doc).unwrap();

    let candidates = vec![
        id_card.csca.clone().unwrap(),
        passport.csca.clone().unwrap(),
    ];
    let computed = candidate_commitments(&secret(), &doc, &candidates).unwrap();
    assert_eq!(computed.len(), 2);
    assert_eq!(computed[1].index, 1);
    assert_eq!(computed[1].commitment, own.commitment);
    assert_ne!(computed[0].commitment, own.commitment);
    assert_ne!(computed[0].candidate_id, computed[1].candidate_id);
}

#[test]
fn passport_and_id_card_nullifiers_differ() {
    let a = derive(&secret(), &DocumentProfile::PassportLike(resolved(PASSPORT))).unwrap();
    let b = derive(&secret(), &DocumentProfile::PassportLike(resolved(ID_CARD))).unwrap();
    assert_ne!(a.nullifier, b.nullifier);
}

// ---------------------------------------------------------------------------
// Registration and circuit inputs
// ---------------------------------------------------------------------------

#[test]
fn registered_commitment_yields_disclosure_inputs() {
    let passport = resolved(PASSPORT);
    let doc = DocumentProfile::PassportLike(passport.clone());
    let commitment = derive(&secret(), &doc).unwrap().commitment;

    let mut leaves: Vec<FieldElement> = (1..=6).map(FieldElement::from_u64).collect();
    leaves.push(commitment);
    let tree = LeanImt::from_leaves(&leaves).unwrap();
    let MembershipLookup::Found(proof) = membership_proof_in(&tree, &commitment, 33).unwrap() else {
        panic!("commitment should be registered");
    };
    assert!(proof.verify());
    assert_eq!(proof.leaf_index, 6);

    let subject = SanctionsSubject::from_document(&doc);
    assert!(subject.name.starts_with("ERIKSSON<<ANNA<MARIA"));
    let mut list = SparseMerkleTree::new();
    list.insert(FieldElement::from_u64(99), FieldElement::from_u64(1)).unwrap();
    let sanctions: Vec<_> = SanctionsList::for_category(passport.category)
        .iter()
        .map(|&l| sanctions_proof_in(&list, l, subject.key(l).unwrap()).unwrap())
        .collect();
    assert_eq!(sanctions.len(), 3);
    assert!(sanctions.iter().all(|p| !p.membership));

    let request = DiscloseRequest {
        attributes: vec![Attribute::Name, Attribute::Nationality],
        minimum_age: 18,
        forbidden_countries: vec!["PRK".into()],
        scope: FieldElement::from_u64(5),
        user_identifier: FieldElement::from_u64(6),
        current_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
    };
    let inputs = DiscloseInputs::build(&secret(), &doc, &proof, &sanctions, &request).unwrap();
    assert_eq!(inputs.attestation_id, "1");
    assert_eq!(inputs.merkle_root, tree.root().unwrap());
    assert_eq!(inputs.majority, vec!["49", "56"]);
    assert_eq!(inputs.current_date, vec!["2", "6", "1", "0", "1", "9"]);
    assert_eq!(inputs.forbidden_countries_list.len(), 120);
    assert_eq!(inputs.ofac.len(), 3);
    assert!(inputs.econtent_hash_folded.is_some());
    assert!(!format!("{inputs:?}").contains("424242"));
}

#[test]
fn registration_inputs_build_for_both_fixtures() {
    let passport = RegisterInputs::build(&secret(), &resolved(PASSPORT)).unwrap();
    assert_eq!(passport.attestation_id, "1");
    assert_eq!(passport.pubkey_dsc.len(), 26);
    assert_eq!(passport.signature_passport.len(), 26);
    assert_eq!(passport.raw_dsc.len(), 1792);
    assert_eq!(passport.econtent_padded_length % 64, 0);

    let id_card = RegisterInputs::build(&secret(), &resolved(ID_CARD)).unwrap();
    assert_eq!(id_card.attestation_id, "2");
    assert_eq!(id_card.pubkey_dsc.len(), 8);
    assert_eq!(id_card.signature_passport.len(), 8);
}

#[test]
fn issuer_chain_inputs_use_csca_key() {
    let doc = resolved(ID_CARD);
    let leaf = zkid_crypto::fold(&zkid_crypto::parse_certificate(doc.csca.as_ref().unwrap()).unwrap().tbs).unwrap();
    let tree = LeanImt::from_leaves(&[FieldElement::from_u64(1), leaf]).unwrap();
    let MembershipLookup::Found(proof) = membership_proof_in(&tree, &leaf, 12).unwrap() else {
        panic!("csca should be in the issuer tree");
    };
    let inputs = DscInputs::build(&doc, &proof).unwrap();
    assert_eq!(inputs.csca_tree_leaf, leaf);
    assert_eq!(inputs.csca_pubkey.len(), 12);
    assert_eq!(inputs.signature.len(), 12);
    assert_eq!(inputs.siblings.len(), 12);
}

// ---------------------------------------------------------------------------
// Disclosure decoding
// ---------------------------------------------------------------------------

#[test]
fn passport_reveal_buffer_decodes() {
    let doc = resolved(PASSPORT);
    let mut buffer = doc.mrz.as_bytes().to_vec();
    buffer.extend(b"21");
    buffer.extend([0, 0, 0]);

    let category = doc.category;
    let indices = signal_indices(category);
    let mut signals = vec!["0".to_string(); 21];
    for (i, e) in pack_reveal(category, &buffer).unwrap().iter().enumerate() {
        signals[indices.revealed_data + i] = e.to_decimal();
    }
    let out = format_revealed_data(category, &signals).unwrap();
    assert_eq!(out.name, "ERIKSSON ANNA MARIA");
    assert_eq!(out.id_number, "L898902C3");
    assert_eq!(out.minimum_age, "21");
    assert_eq!(out.ofac, vec![true, true, true]);
    assert!(out.forbidden_countries.is_empty());
}
