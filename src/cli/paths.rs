//! CLI subcommand: `coreguard paths`
//!
//! Prints all resolved paths for debugging and scripting.

use anyhow::Result;
use std::process::ExitCode;

use crate::paths::Paths;

pub fn run(paths: &Paths) -> Result<ExitCode> {
    let mark = |p: &std::path::Path| if p.exists() { "" } else { "  (absent)" };

    println!("coreguard Paths");
    println!("===============");
    println!();
    println!("Root:           {}", paths.root.display());
    println!();
    let manifest = paths.manifest();
    let secret_store = paths.secret_store();
    let audit_log = paths.audit_log();
    let config_file = paths.config_file();
    println!("  manifest:     {}{}", manifest.display(), mark(&manifest));
    println!("  secret store: {}{}", secret_store.display(), mark(&secret_store));
    println!("  audit log:    {}{}", audit_log.display(), mark(&audit_log));
    println!("  config:       {}{}", config_file.display(), mark(&config_file));

    Ok(ExitCode::SUCCESS)
}
