pub mod advise;
pub mod build;
pub mod config;
pub mod digest;
pub mod erase;
pub mod paths;
pub mod show;
pub mod verify;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coreguard")]
#[command(
    author,
    version,
    about = "File-integrity manifests and an override-gated erase (advisory only)"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Installation root (default: $COREGUARD_ROOT, then the current directory)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Path to config file (default: <root>/coreguard.toml)
    #[arg(short, long, global = true, env = "COREGUARD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Hash protected paths and write the manifest
    Build(build::BuildArgs),

    /// Re-check every manifest entry against the filesystem
    Verify(verify::VerifyArgs),

    /// List manifest paths
    Show,

    /// Remove a path after the override key and confirmation
    Erase(erase::EraseArgs),

    /// Report writable protected paths and suggest lock commands
    Advise(advise::AdviseArgs),

    /// Print the SHA-256 of a file or of a secret read from stdin
    Digest(digest::DigestArgs),

    /// Show resolved installation paths
    Paths,

    /// Configuration management
    Config(config::ConfigArgs),
}
