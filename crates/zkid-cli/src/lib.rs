//! # zkid-cli: CLI Tool for the Witness Pipeline
//!
//! Provides the `zkid` command-line interface over the pipeline crates.
//!
//! ## Subcommands
//!
//! - `zkid parse-cert`: Decode a DSC or CSCA certificate.
//! - `zkid resolve`: Recover signature algorithms of a document or a
//!   certificate pair.
//! - `zkid circuit`: Circuit names a document maps to.
//! - `zkid support`: Check a document against the deployed circuits.
//! - `zkid pack-countries` / `zkid unpack`: Attribute codec.
//! - `zkid commitment`: Commitment, nullifier and candidate commitments.
//! - `zkid tree-proof` / `zkid sanctions-proof`: Tree proofs from snapshots.
//!
//! Every subcommand prints a human summary, or one JSON document with the
//! global `--json` flag.
//!
//! ```bash
//! zkid circuit passport.json
//! zkid --json commitment passport.json --secret 0x2a
//! zkid sanctions-proof passport.json --list name_and_dob --snapshot ofac.json
//! ```

pub mod codec;
pub mod commitment;
pub mod document;
pub mod tree;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use zkid_core::{AttestationCategory, DocumentProfile};
use zkid_crypto::ensure_metadata;

/// Document category as a CLI value.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryArg {
    Passport,
    IdCard,
    NationalQr,
}

impl From<CategoryArg> for AttestationCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Passport => AttestationCategory::Passport,
            CategoryArg::IdCard => AttestationCategory::IdCard,
            CategoryArg::NationalQr => AttestationCategory::NationalQr,
        }
    }
}

/// Read a file, or standard input when `path` is `-`.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read standard input")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Read a file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String> {
    String::from_utf8(read_input(path)?).with_context(|| format!("{} is not UTF-8", path.display()))
}

/// Load a document and resolve its chain metadata when missing.
///
/// Resolution failures are returned so the caller decides whether they are
/// fatal; `support` reports them as a status instead.
pub fn load_document(path: &Path) -> Result<DocumentProfile> {
    let text = read_text(path)?;
    let mut doc: DocumentProfile = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a document profile", path.display()))?;
    if let DocumentProfile::PassportLike(passport) = &mut doc {
        ensure_metadata(passport)
            .with_context(|| format!("failed to resolve chain metadata of {}", path.display()))?;
    }
    Ok(doc)
}

/// Load a document without resolving metadata.
pub fn load_document_raw(path: &Path) -> Result<DocumentProfile> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a document profile", path.display()))
}

/// Print `value` as pretty JSON, or run `human` for the text rendering.
pub fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}
