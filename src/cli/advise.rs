//! CLI subcommand: `coreguard advise`
//!
//! Prints lock commands for writable protected paths. Runs nothing.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Config;
use crate::integrity;
use crate::security::{self, Protection};

#[derive(Args)]
pub struct AdviseArgs {
    /// Paths to check (default: every manifest entry, else the [protect] paths)
    pub paths: Vec<PathBuf>,
}

pub fn run(args: AdviseArgs, config: &Config) -> Result<ExitCode> {
    let paths = if !args.paths.is_empty() {
        args.paths
    } else {
        let manifest = integrity::load_manifest(&config.paths.manifest())?;
        if manifest.is_empty() {
            config.protect_roots()
        } else {
            manifest.paths().map(PathBuf::from).collect()
        }
    };

    let advisories = security::assess_all(&paths);
    let attention = advisories.iter().filter(|a| a.needs_attention()).count();

    for advisory in &advisories {
        let label = match advisory.protection {
            Protection::ReadOnly => "read-only".to_string(),
            Protection::Writable => "WRITABLE".to_string(),
            Protection::Missing => "MISSING".to_string(),
            Protection::Unknown(ref e) => format!("UNKNOWN ({})", e),
        };
        println!("{}: {}", advisory.path.display(), label);
        for cmd in &advisory.commands {
            println!("    {}", cmd);
        }
    }

    println!();
    if attention == 0 {
        println!("All {} path(s) appear write-protected.", advisories.len());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} of {} path(s) need attention. Commands above are suggestions only; nothing was changed.",
            attention,
            advisories.len()
        );
        Ok(ExitCode::from(1))
    }
}
