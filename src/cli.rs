use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ecdsa-finder")]
#[command(
    about = "Scan a directory tree or archive for Java classes that use ECDSA signatures (CVE-2022-21449)"
)]
pub struct Cli {
    /// Directory to walk, or a single archive to scan.
    #[arg(value_name = "PATH")]
    pub root: PathBuf,

    /// Do not print per-archive error lines.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Directories to leave out of the walk.
    #[arg(long, value_name = "DIR", num_args = 1..)]
    pub exclude: Vec<PathBuf>,

    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    #[arg(long, value_name = "BYTES")]
    pub max_entry_size: Option<u64>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase diagnostic verbosity (-v, -vv, -vvv).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
