use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "iscn",
    about = "ISCN: content-addressed records for creative works",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file; a missing file means defaults
    #[arg(long, global = true, default_value = "iscn.toml")]
    pub config: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Encode a JSON document, store the block and print its CID
    Encode(EncodeArgs),
    /// Print the JSON form of a stored document
    Decode(DecodeArgs),
    /// Resolve a path from a document, following links across documents
    Resolve(ResolveArgs),
    /// List the links held by a document
    Links(LinksArgs),
    /// List every document reachable from a root
    Refs(RefsArgs),
    /// List the registered document kinds
    Schemas,
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
pub struct EncodeArgs {
    /// Document kind, e.g. `iscn`, `rights`, `entity`
    #[arg(short, long)]
    pub kind: String,
    #[arg(long, default_value = "1")]
    pub version: u64,
    pub file: PathBuf,
}

#[derive(Args)]
pub struct DecodeArgs {
    pub cid: String,
}

#[derive(Args)]
pub struct ResolveArgs {
    pub cid: String,
    /// Slash-separated path, e.g. `rights/rights/0/holder`
    #[arg(default_value = "")]
    pub path: String,
}

#[derive(Args)]
pub struct LinksArgs {
    pub cid: String,
}

#[derive(Args)]
pub struct RefsArgs {
    pub cid: String,
}
