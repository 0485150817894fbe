//! CLI subcommand: `coreguard verify`
//!
//! Exit codes: 0 ok, 1 fail, 2 no manifest.

use anyhow::Result;
use clap::Args;
use std::process::ExitCode;

use crate::config::Config;
use crate::integrity::{self, VerifyStatus};
use crate::security::AuditLog;

#[derive(Args)]
pub struct VerifyArgs {
    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: VerifyArgs, config: &Config, audit: &AuditLog) -> Result<ExitCode> {
    let result = integrity::verify_manifest(&config.paths.manifest(), audit)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Manifest entries: {}", result.checked);
        println!("Missing: {}", result.missing.len());
        for p in &result.missing {
            println!("  {}", p);
        }
        println!("Mismatched: {}", result.mismatched.len());
        for p in &result.mismatched {
            println!("  {}", p);
        }
        match result.status {
            VerifyStatus::Ok => println!("Status: OK"),
            VerifyStatus::Fail => println!("Status: FAILED"),
            VerifyStatus::NoManifest => println!(
                "Status: NO MANIFEST (run `coreguard build` to create {})",
                config.paths.manifest().display()
            ),
        }
    }

    if let Some(ref w) = result.audit_warning {
        eprintln!("warning: {}", w);
    }

    Ok(exit_code(result.status))
}

fn exit_code(status: VerifyStatus) -> ExitCode {
    match status {
        VerifyStatus::Ok => ExitCode::SUCCESS,
        VerifyStatus::Fail => ExitCode::from(1),
        VerifyStatus::NoManifest => ExitCode::from(2),
    }
}
