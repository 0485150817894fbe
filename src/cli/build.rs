//! CLI subcommand: `coreguard build`

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Config;
use crate::integrity;
use crate::security::AuditLog;

#[derive(Args)]
pub struct BuildArgs {
    /// Files or directories to hash (default: [protect] paths from the config)
    pub paths: Vec<PathBuf>,

    /// Manifest destination (default: <root>/agent/core_manifest.json)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn run(
    args: BuildArgs,
    config: &Config,
    audit: &AuditLog,
    verbose: bool,
) -> Result<ExitCode> {
    let roots = if args.paths.is_empty() {
        config.protect_roots()
    } else {
        args.paths
    };
    let out = args.out.unwrap_or_else(|| config.paths.manifest());

    // The destination usually sits inside a protected root
    let report = integrity::build_manifest_excluding(&roots, &[&out]);
    integrity::save_manifest(&report.manifest, &out)
        .with_context(|| format!("Failed to write manifest to {}", out.display()))?;

    let skipped = report.skipped_count();
    if let Some(w) = audit.record(&format!(
        "build: entries={} skipped={} out={}",
        report.manifest.len(),
        skipped,
        out.display()
    )) {
        eprintln!("warning: {}", w);
    }

    println!(
        "Wrote manifest with {} entries to {}",
        report.manifest.len(),
        out.display()
    );
    if skipped > 0 {
        if verbose {
            println!("Skipped {}:", skipped);
            for (path, reason) in report.skipped() {
                println!("  {} ({})", path.display(), reason);
            }
        } else {
            println!("Skipped {} (use --verbose to list)", skipped);
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::VerifyStatus;
    use crate::paths::Paths;
    use std::fs;

    fn default_args() -> BuildArgs {
        BuildArgs {
            paths: Vec::new(),
            out: None,
        }
    }

    #[test]
    fn rebuild_with_default_config_still_verifies() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::at(tmp.path());
        fs::create_dir_all(tmp.path().join("agent")).unwrap();
        fs::write(tmp.path().join("agent").join("knowledge.json"), "{}").unwrap();

        let config = Config::load(paths.clone(), None).unwrap();
        let audit = AuditLog::new(paths.audit_log());

        // The second build sees the first manifest on disk
        run(default_args(), &config, &audit, false).unwrap();
        run(default_args(), &config, &audit, false).unwrap();

        let manifest = integrity::load_manifest(&paths.manifest()).unwrap();
        assert_eq!(manifest.len(), 1);

        let result = integrity::verify_manifest(&paths.manifest(), &audit).unwrap();
        assert_eq!(result.status, VerifyStatus::Ok);
        assert!(result.mismatched.is_empty());
    }

    #[test]
    fn build_writes_one_audit_event() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::at(tmp.path());
        let file = tmp.path().join("a.txt");
        fs::write(&file, "hello").unwrap();

        let config = Config::load(paths.clone(), None).unwrap();
        let audit = AuditLog::new(paths.audit_log());
        let args = BuildArgs {
            paths: vec![file, tmp.path().join("absent")],
            out: None,
        };
        run(args, &config, &audit, true).unwrap();

        let log = fs::read_to_string(audit.path()).unwrap();
        let lines: Vec<_> = log.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("build: entries=1 skipped=1"));
    }
}
