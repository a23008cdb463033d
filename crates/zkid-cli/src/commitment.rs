//! # Commitment Command
//!
//! Derives the commitment and nullifier of a document, optionally against
//! alternative issuers, and optionally asks the ledger whether the nullifier
//! is already registered (`ZKID_*` environment configuration).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use zkid_client::{ClientConfig, ZkidClient};
use zkid_core::{AttestationCategory, FieldElement, SecretScalar};
use zkid_zkp::{candidate_commitments, derive, CandidateCommitment};

use crate::{emit, load_document, read_input};

/// Arguments for `commitment`.
#[derive(Args, Debug)]
pub struct CommitmentArgs {
    /// Document profile JSON.
    pub document: PathBuf,

    /// User secret, decimal or `0x` hex.
    #[arg(long)]
    pub secret: String,

    /// Alternative issuers: CSCA certificates for passport-like documents,
    /// raw issuer keys for QR credentials.
    #[arg(long = "candidate")]
    pub candidates: Vec<PathBuf>,

    /// Query the ledger for the nullifier.
    #[arg(long)]
    pub check_ledger: bool,
}

#[derive(Debug, Serialize)]
struct CommitmentOutput {
    category: AttestationCategory,
    commitment: FieldElement,
    nullifier: FieldElement,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    candidates: Vec<CandidateCommitment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nullifier_registered: Option<bool>,
}

pub fn run_commitment(args: &CommitmentArgs, json: bool) -> Result<u8> {
    let secret = SecretScalar::parse(&args.secret).context("secret is not a field element literal")?;
    let doc = load_document(&args.document)?;
    let derived = derive(&secret, &doc)?;

    let candidate_bytes = args
        .candidates
        .iter()
        .map(|p| read_input(p))
        .collect::<Result<Vec<_>>>()?;
    let candidates = candidate_commitments(&secret, &doc, &candidate_bytes)?;

    let category = doc.document_category();
    let nullifier_registered = if args.check_ledger {
        Some(ledger_status(&derived.nullifier, category)?)
    } else {
        None
    };

    let out = CommitmentOutput {
        category,
        commitment: derived.commitment,
        nullifier: derived.nullifier,
        candidates,
        nullifier_registered,
    };
    emit(json, &out, |o| {
        println!("  category:   {}", o.category);
        println!("  commitment: {}", o.commitment);
        println!("  nullifier:  {}", o.nullifier);
        for c in &o.candidates {
            println!("  candidate [{}] {}: {}", c.index, c.candidate_id, c.commitment);
        }
        if let Some(registered) = o.nullifier_registered {
            println!("  registered: {registered}");
        }
    })?;
    Ok(0)
}

fn ledger_status(nullifier: &FieldElement, category: AttestationCategory) -> Result<bool> {
    let config = ClientConfig::from_env()?;
    let client = ZkidClient::new(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(client.ledger().is_nullifier_registered(nullifier, category))?)
}
