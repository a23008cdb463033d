//! # Codec Commands
//!
//! `pack-countries` packs a forbidden-country list into the four field
//! elements a disclosure proof commits to; `unpack` decodes the public
//! signals of a disclosure proof and, given a verification config, checks
//! them against it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use zkid_core::FieldElement;
use zkid_zkp::{
    format_revealed_data, pack_countries, validate_disclosure, ConfigIssue, DisclosureOutput,
    VerificationConfig,
};

use crate::{emit, read_text, CategoryArg};

/// Arguments for `pack-countries`.
#[derive(Args, Debug)]
pub struct PackCountriesArgs {
    /// ISO 3166-1 alpha-3 codes, at most 40.
    pub codes: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PackedOutput {
    elements: Vec<String>,
}

pub fn run_pack_countries(args: &PackCountriesArgs, json: bool) -> Result<u8> {
    let packed = pack_countries(args.codes.as_slice())?;
    let out = PackedOutput {
        elements: packed.elements.iter().map(FieldElement::to_decimal).collect(),
    };
    emit(json, &out, |o| {
        for (i, e) in o.elements.iter().enumerate() {
            println!("  [{i}] {e}");
        }
    })?;
    Ok(0)
}

/// Arguments for `unpack`.
#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// JSON array of public signals as decimal strings.
    pub signals: PathBuf,

    /// Category of the disclosure circuit that produced the signals.
    #[arg(long, value_enum)]
    pub category: CategoryArg,

    /// Verification config (JSON) to check the disclosure against.
    #[arg(long)]
    pub verify: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct UnpackOutput {
    #[serde(flatten)]
    disclosure: DisclosureOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<Vec<ConfigIssue>>,
}

pub fn run_unpack(args: &UnpackArgs, json: bool) -> Result<u8> {
    let signals: Vec<String> = serde_json::from_str(&read_text(&args.signals)?)
        .with_context(|| format!("{} is not a JSON array of strings", args.signals.display()))?;
    let disclosure = format_revealed_data(args.category.into(), &signals)?;
    let issues = match &args.verify {
        Some(path) => {
            let config: VerificationConfig = serde_json::from_str(&read_text(path)?)
                .with_context(|| format!("{} is not a verification config", path.display()))?;
            Some(validate_disclosure(&disclosure, &config, chrono::Utc::now()))
        }
        None => None,
    };
    let out = UnpackOutput { disclosure, issues };
    emit(json, &out, |out| {
        let o = &out.disclosure;
        println!("  nullifier:      {}", o.nullifier);
        println!("  issuing state:  {}", o.issuing_state);
        println!("  name:           {}", o.name);
        println!("  id number:      {}", o.id_number);
        println!("  nationality:    {}", o.nationality);
        println!("  date of birth:  {}", o.date_of_birth);
        println!("  gender:         {}", o.gender);
        println!("  expiry date:    {}", o.expiry_date);
        println!("  minimum age:    {}", o.minimum_age);
        println!("  ofac:           {:?}", o.ofac);
        println!("  forbidden:      {}", o.forbidden_countries.join(", "));
        println!("  current date:   {}", o.current_date);
        for issue in out.issues.iter().flatten() {
            println!("  ISSUE: {issue}");
        }
    })?;
    Ok(match &out.issues {
        Some(issues) if !issues.is_empty() => 2,
        _ => 0,
    })
}
