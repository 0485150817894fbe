use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use coreguard::cli::{self, Cli, Commands};
use coreguard::config::Config;
use coreguard::paths::Paths;
use coreguard::security::AuditLog;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let paths = Paths::resolve(cli.root.as_deref())?;
    let config = Config::load(paths.clone(), cli.config.as_deref());

    // Initialize logging
    let configured = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    let log_level = if cli.verbose { "debug" } else { &configured };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let verbose = cli.verbose;
    match cli.command {
        // These must work even when the config file is broken
        Commands::Config(args) => cli::config::run(args, paths, cli.config.as_deref()),
        Commands::Paths => cli::paths::run(&paths),
        Commands::Digest(args) => cli::digest::run(args),
        Commands::Build(args) => with_audit(config, |c, a| cli::build::run(args, c, a, verbose)),
        Commands::Verify(args) => with_audit(config, |c, a| cli::verify::run(args, c, a)),
        Commands::Show => with_audit(config, |c, _| cli::show::run(c)),
        Commands::Erase(args) => with_audit(config, |c, a| cli::erase::run(args, c, a)),
        Commands::Advise(args) => with_audit(config, |c, _| cli::advise::run(args, c)),
    }
}

/// Open the audit log for commands that need a valid config.
fn with_audit<F>(config: Result<Config>, f: F) -> Result<ExitCode>
where
    F: FnOnce(&Config, &AuditLog) -> Result<ExitCode>,
{
    let config = config?;
    let audit = AuditLog::new(config.paths.audit_log());
    f(&config, &audit)
}
