//! CLI subcommand: `coreguard show`

use anyhow::Result;
use std::process::ExitCode;

use crate::config::Config;
use crate::integrity;

pub fn run(config: &Config) -> Result<ExitCode> {
    let source = config.paths.manifest();
    let manifest = integrity::load_manifest(&source)?;

    if manifest.is_empty() {
        eprintln!("No manifest entries at {}", source.display());
    }
    for path in manifest.paths() {
        println!("{}", path);
    }

    Ok(ExitCode::SUCCESS)
}
