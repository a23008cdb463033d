//! # Document Commands
//!
//! `parse-cert`, `resolve`, `circuit` and `support`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use zkid_core::{AlgorithmProfile, AttestationCategory, CertificateRecord, DocumentProfile};
use zkid_crypto::{ensure_metadata, parse_certificate, resolve_certificate};
use zkid_zkp::{
    check_document_support, disclose_circuit_name, dsc_circuit_name, register_circuit_name,
    DeployedCircuits,
};

use crate::{emit, load_document, load_document_raw, read_input, read_text};

// ---------------------------------------------------------------------------
// parse-cert
// ---------------------------------------------------------------------------

/// Arguments for `parse-cert`.
#[derive(Args, Debug)]
pub struct ParseCertArgs {
    /// Certificate file, PEM or DER (`-` for stdin).
    pub path: PathBuf,
}

pub fn run_parse_cert(args: &ParseCertArgs, json: bool) -> Result<u8> {
    let record = parse_certificate(&read_input(&args.path)?)
        .with_context(|| format!("failed to parse {}", args.path.display()))?;
    emit(json, &record, print_certificate)?;
    Ok(0)
}

fn print_certificate(record: &CertificateRecord) {
    println!("  subject:         {}", record.subject);
    println!("  issuer:          {}", record.issuer);
    println!(
        "  key:             {} {} bits ({})",
        if record.public_key.is_rsa() { "rsa" } else { "ec" },
        record.bit_length(),
        record.curve_or_exponent()
    );
    println!("  signed with:     {}", record.signature_algorithm);
    if let Some(hash) = record.hash_algorithm {
        println!("  declared hash:   {hash}");
    }
    if let Some(salt) = record.salt_length {
        println!("  declared salt:   {salt}");
    }
    println!("  key identifier:  {}", record.key_identifier_hex());
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

/// Arguments for `resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Document profile JSON whose whole chain is resolved.
    #[arg(required_unless_present = "dsc", conflicts_with_all = ["dsc", "csca"])]
    pub document: Option<PathBuf>,

    /// Subject certificate, resolved against `--csca`.
    #[arg(long, requires = "csca")]
    pub dsc: Option<PathBuf>,

    /// Issuer certificate.
    #[arg(long)]
    pub csca: Option<PathBuf>,
}

pub fn run_resolve(args: &ResolveArgs, json: bool) -> Result<u8> {
    if let (Some(dsc), Some(csca)) = (&args.dsc, &args.csca) {
        let subject = parse_certificate(&read_input(dsc)?)
            .with_context(|| format!("failed to parse {}", dsc.display()))?;
        let issuer = parse_certificate(&read_input(csca)?)
            .with_context(|| format!("failed to parse {}", csca.display()))?;
        let profile = resolve_certificate(&subject, &issuer)?;
        emit(json, &profile, |p: &AlgorithmProfile| println!("  {p}"))?;
        return Ok(0);
    }

    let path = args.document.as_ref().context("a document or --dsc/--csca is required")?;
    let doc = load_document(path)?;
    let Some(metadata) = doc.metadata() else {
        anyhow::bail!("{} carries no certificate chain to resolve", path.display());
    };
    emit(json, metadata, |m| {
        println!("  dg hash:          {}", m.dg_hash_algorithm);
        println!("  eContent hash:    {}", m.econtent_hash_algorithm);
        println!("  signed attr hash: {}", m.signed_attr_hash_algorithm);
        println!("  dsc:              {}", m.dsc_profile);
        match &m.csca_profile {
            Some(p) => println!("  csca:             {p}"),
            None => println!("  csca:             not found"),
        }
    })?;
    Ok(if metadata.csca_found { 0 } else { 2 })
}

// ---------------------------------------------------------------------------
// circuit
// ---------------------------------------------------------------------------

/// Arguments for `circuit`.
#[derive(Args, Debug)]
pub struct CircuitArgs {
    /// Document profile JSON.
    pub document: PathBuf,
}

/// Circuits a document maps to.
#[derive(Debug, Serialize)]
pub struct CircuitNames {
    pub category: AttestationCategory,
    pub register: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dsc: Option<String>,
    pub disclose: &'static str,
}

/// Circuit names of a resolved document. The issuer circuit is omitted when
/// the chain did not resolve.
pub fn circuit_names(doc: &DocumentProfile) -> Result<CircuitNames> {
    let dsc = match doc {
        DocumentProfile::PassportLike(passport) => dsc_circuit_name(passport).ok(),
        DocumentProfile::NationalQrCredential(_) => None,
    };
    Ok(CircuitNames {
        category: doc.document_category(),
        register: register_circuit_name(doc)?,
        dsc,
        disclose: disclose_circuit_name(doc.document_category()),
    })
}

pub fn run_circuit(args: &CircuitArgs, json: bool) -> Result<u8> {
    let names = circuit_names(&load_document(&args.document)?)?;
    emit(json, &names, |n| {
        println!("  category: {}", n.category);
        println!("  register: {}", n.register);
        println!("  dsc:      {}", n.dsc.as_deref().unwrap_or("-"));
        println!("  disclose: {}", n.disclose);
    })?;
    Ok(0)
}

// ---------------------------------------------------------------------------
// support
// ---------------------------------------------------------------------------

/// Arguments for `support`.
#[derive(Args, Debug)]
pub struct SupportArgs {
    /// Document profile JSON.
    pub document: PathBuf,

    /// Deployed circuit set: `{"register": [...], "dsc": [...], "disclose": [...]}`.
    #[arg(long)]
    pub deployed: PathBuf,
}

pub fn run_support(args: &SupportArgs, json: bool) -> Result<u8> {
    let deployed = DeployedCircuits::from_json(&read_text(&args.deployed)?)
        .with_context(|| format!("{} is not a deployed circuit set", args.deployed.display()))?;
    let mut doc = load_document_raw(&args.document)?;
    if let DocumentProfile::PassportLike(passport) = &mut doc {
        // An unresolvable chain is reported as a status below.
        if let Err(e) = ensure_metadata(passport) {
            tracing::warn!(error = %e, "chain metadata not resolved");
        }
    }
    let report = check_document_support(&doc, &deployed);
    emit(json, &report, |r| {
        println!("  status:  {}", r.status);
        if let Some(circuit) = &r.circuit {
            println!("  circuit: {circuit}");
        }
        println!("  detail:  {}", r.detail);
    })?;
    Ok(if report.status.is_supported() { 0 } else { 2 })
}
