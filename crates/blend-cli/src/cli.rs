use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "blend",
    about = "Reference-preserving merge of JSON states",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Blend NEW onto OLD and print the merged document
    Merge(PairArgs),
    /// Show what changed between OLD and NEW
    Diff(PairArgs),
    /// Commit each line of a JSON Lines file into a state store
    Replay(ReplayArgs),
}

#[derive(Args)]
pub struct PairArgs {
    /// Previous state (JSON file)
    pub old: PathBuf,
    /// Next state (JSON file)
    pub new: PathBuf,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON Lines file, one state per line
    pub file: PathBuf,
    /// Store configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
