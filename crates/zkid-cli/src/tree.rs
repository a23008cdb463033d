//! # Tree Commands
//!
//! `tree-proof` proves a commitment's membership in a registration tree
//! snapshot. `sanctions-proof` proves a document holder's (non-)membership
//! in the sanctions lists, read from a snapshot file or fetched from the
//! sanctions service.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use zkid_client::{ClientConfig, ZkidClient};
use zkid_core::constants::REGISTRATION_TREE_DEPTH;
use zkid_core::{FieldElement, SecretScalar};
use zkid_crypto::SparseMerkleTree;
use zkid_zkp::{
    derive, membership_proof, sanctions_proof_in, MembershipLookup, SanctionsList, SanctionsProof,
    SanctionsSubject, TreeProof,
};

use crate::{emit, load_document, read_text};

// ---------------------------------------------------------------------------
// tree-proof
// ---------------------------------------------------------------------------

/// Arguments for `tree-proof`.
#[derive(Args, Debug)]
pub struct TreeProofArgs {
    /// Registration tree snapshot (JSON).
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Leaf to prove.
    #[arg(long, required_unless_present = "document", conflicts_with = "document")]
    pub leaf: Option<FieldElement>,

    /// Document whose commitment is the leaf; needs `--secret`.
    #[arg(long, requires = "secret")]
    pub document: Option<PathBuf>,

    /// User secret, decimal or `0x` hex.
    #[arg(long)]
    pub secret: Option<String>,

    /// Circuit depth the proof is padded to.
    #[arg(long, default_value_t = REGISTRATION_TREE_DEPTH)]
    pub depth: usize,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum TreeProofOutput {
    Found(TreeProof),
    CommitmentNotInTree { leaf: FieldElement },
}

pub fn run_tree_proof(args: &TreeProofArgs, json: bool) -> Result<u8> {
    let leaf = match (&args.leaf, &args.document, &args.secret) {
        (Some(leaf), _, _) => *leaf,
        (None, Some(document), Some(secret)) => {
            let secret = SecretScalar::parse(secret).context("secret is not a field element literal")?;
            derive(&secret, &load_document(document)?)?.commitment
        }
        _ => bail!("either --leaf or --document with --secret is required"),
    };
    let snapshot = read_text(&args.snapshot)?;
    let out = match membership_proof(&snapshot, &leaf, args.depth)? {
        MembershipLookup::Found(proof) => TreeProofOutput::Found(proof),
        MembershipLookup::CommitmentNotInTree => TreeProofOutput::CommitmentNotInTree { leaf },
    };
    emit(json, &out, |o| match o {
        TreeProofOutput::Found(p) => {
            println!("  leaf:       {}", p.leaf);
            println!("  index:      {}", p.leaf_index);
            println!("  root:       {}", p.root);
            println!("  leaf depth: {}", p.leaf_depth);
        }
        TreeProofOutput::CommitmentNotInTree { leaf } => {
            println!("  {leaf} is not in the tree");
        }
    })?;
    Ok(match out {
        TreeProofOutput::Found(_) => 0,
        TreeProofOutput::CommitmentNotInTree { .. } => 2,
    })
}

// ---------------------------------------------------------------------------
// sanctions-proof
// ---------------------------------------------------------------------------

/// Arguments for `sanctions-proof`.
#[derive(Args, Debug)]
pub struct SanctionsProofArgs {
    /// Document profile JSON.
    pub document: PathBuf,

    /// One list; defaults to every list published for the document's
    /// category.
    #[arg(long)]
    pub list: Option<SanctionsList>,

    /// List snapshot (JSON); requires `--list`.
    #[arg(long, requires = "list", required_unless_present = "fetch", conflicts_with = "fetch")]
    pub snapshot: Option<PathBuf>,

    /// Fetch the lists from the sanctions service (`ZKID_*` environment).
    #[arg(long)]
    pub fetch: bool,
}

pub fn run_sanctions_proof(args: &SanctionsProofArgs, json: bool) -> Result<u8> {
    let doc = load_document(&args.document)?;
    let category = doc.document_category();
    let subject = SanctionsSubject::from_document(&doc);
    let lists: Vec<SanctionsList> = match args.list {
        Some(list) => vec![list],
        None => SanctionsList::for_category(category).to_vec(),
    };

    let trees: Vec<(SanctionsList, SparseMerkleTree)> = match &args.snapshot {
        Some(path) => {
            let tree = SparseMerkleTree::import(&read_text(path)?)
                .with_context(|| format!("{} is not a sanctions list snapshot", path.display()))?;
            lists.iter().map(|&l| (l, tree.clone())).collect()
        }
        None => fetch_trees(category, &lists)?,
    };

    let proofs = trees
        .iter()
        .map(|(list, tree)| Ok(sanctions_proof_in(tree, *list, subject.key(*list)?)?))
        .collect::<Result<Vec<SanctionsProof>>>()?;

    emit(json, &proofs, |ps| {
        for p in ps {
            let verdict = if p.membership { "LISTED" } else { "not listed" };
            println!("  {:<28} {verdict} (root {})", p.list.as_str(), p.root);
        }
    })?;
    Ok(if proofs.iter().any(|p| p.membership) { 2 } else { 0 })
}

fn fetch_trees(
    category: zkid_core::AttestationCategory,
    lists: &[SanctionsList],
) -> Result<Vec<(SanctionsList, SparseMerkleTree)>> {
    let client = ZkidClient::new(ClientConfig::from_env()?)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(async {
        let mut out = Vec::with_capacity(lists.len());
        for &list in lists {
            out.push((list, client.sanctions().fetch_tree(category, list).await?));
        }
        Ok::<_, anyhow::Error>(out)
    })
}
