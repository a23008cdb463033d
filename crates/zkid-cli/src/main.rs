//! # zkid CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Exit codes: `0` success, `1` error, `2` a negative but well-formed
//! outcome (unsupported document, commitment not in tree, subject listed).

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zkid_cli::codec::{run_pack_countries, run_unpack, PackCountriesArgs, UnpackArgs};
use zkid_cli::commitment::{run_commitment, CommitmentArgs};
use zkid_cli::document::{
    run_circuit, run_parse_cert, run_resolve, run_support, CircuitArgs, ParseCertArgs, ResolveArgs,
    SupportArgs,
};
use zkid_cli::tree::{run_sanctions_proof, run_tree_proof, SanctionsProofArgs, TreeProofArgs};

/// Identity commitment and disclosure witness pipeline.
///
/// Inspects identity documents and their certificate chains, selects proof
/// circuits, and derives commitments, nullifiers and tree proofs.
#[derive(Parser, Debug)]
#[command(name = "zkid", version, about, long_about = None)]
struct Cli {
    /// Print results and logs as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a DSC or CSCA certificate.
    ParseCert(ParseCertArgs),

    /// Recover the signature algorithms of a document chain or certificate pair.
    Resolve(ResolveArgs),

    /// Print the circuits a document maps to.
    Circuit(CircuitArgs),

    /// Check a document against the deployed circuits.
    Support(SupportArgs),

    /// Pack a forbidden-country list into field elements.
    PackCountries(PackCountriesArgs),

    /// Decode the public signals of a disclosure proof.
    Unpack(UnpackArgs),

    /// Derive a document's commitment and nullifier.
    Commitment(CommitmentArgs),

    /// Prove a commitment's membership in a registration tree snapshot.
    TreeProof(TreeProofArgs),

    /// Prove a document holder against the sanctions lists.
    SanctionsProof(SanctionsProofArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }

    let json = cli.json;
    let result = match &cli.command {
        Commands::ParseCert(args) => run_parse_cert(args, json),
        Commands::Resolve(args) => run_resolve(args, json),
        Commands::Circuit(args) => run_circuit(args, json),
        Commands::Support(args) => run_support(args, json),
        Commands::PackCountries(args) => run_pack_countries(args, json),
        Commands::Unpack(args) => run_unpack(args, json),
        Commands::Commitment(args) => run_commitment(args, json),
        Commands::TreeProof(args) => run_tree_proof(args, json),
        Commands::SanctionsProof(args) => run_sanctions_proof(args, json),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
