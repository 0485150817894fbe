use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;
use std::process::ExitCode;

use crate::config::Config;
use crate::paths::Paths;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Output format: toml (default) or json
        #[arg(short, long, default_value = "toml")]
        format: String,
    },

    /// Get a configuration value
    Get {
        /// Config key (e.g., protect.paths)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Config key (e.g., logging.level)
        key: String,

        /// Value to set (comma-separated for protect.paths)
        value: String,
    },

    /// Show config file path
    Path,

    /// Initialize default config file
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs, paths: Paths, override_path: Option<&Path>) -> Result<ExitCode> {
    match args.command {
        ConfigCommands::Show { format } => show_config(paths, override_path, &format)?,
        ConfigCommands::Get { key } => {
            let config = Config::load(paths, override_path)?;
            println!("{}", config.get_value(&key)?);
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load(paths, override_path)?;
            config.set_value(&key, &value)?;
            config.save()?;
            println!("Set {} = {}", key, value);
        }
        ConfigCommands::Path => {
            let path = override_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| paths.config_file());
            println!("{}", path.display());
        }
        ConfigCommands::Init { force } => {
            let path = override_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| paths.config_file());
            Config::init_template(&path, force)?;
            println!("Created config file at {}", path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn show_config(paths: Paths, override_path: Option<&Path>, format: &str) -> Result<()> {
    let config = Config::load(paths, override_path)?;

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        _ => {
            let toml = toml::to_string_pretty(&config)?;
            println!("{}", toml);
        }
    }

    Ok(())
}
