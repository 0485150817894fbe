//! CLI subcommand: `coreguard digest`
//!
//! Helps an operator provision the secret store by hand. This command
//! never writes `keys.json` itself.

use anyhow::Result;
use clap::Args;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::integrity;
use crate::security::SECRET_KEY_NAME;

#[derive(Args)]
pub struct DigestArgs {
    /// File to hash
    #[arg(required_unless_present = "secret", conflicts_with = "secret")]
    pub file: Option<PathBuf>,

    /// Read a secret from stdin and print the secret store entry for it
    #[arg(long)]
    pub secret: bool,
}

pub fn run(args: DigestArgs) -> Result<ExitCode> {
    if args.secret {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        let secret = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(&line);

        let digest = integrity::bytes_sha256(secret.as_bytes());
        let entry = serde_json::json!({ SECRET_KEY_NAME: digest });
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(file) = args.file {
        let digest = integrity::file_sha256(&file)?;
        println!("{}  {}", digest, file.display());
    }
    Ok(ExitCode::SUCCESS)
}
