use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::Paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Resolved installation paths (not serialized)
    #[serde(skip)]
    pub paths: Paths,

    /// File this config was loaded from (not serialized)
    #[serde(skip)]
    pub source: Option<PathBuf>,

    #[serde(default)]
    pub protect: ProtectConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectConfig {
    /// Roots hashed by `build` when no paths are given.
    /// Relative entries are resolved against the installation root.
    #[serde(default = "default_protect_paths")]
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_protect_paths() -> Vec<String> {
    vec!["agent".to_string()]
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ProtectConfig {
    fn default() -> Self {
        Self {
            paths: default_protect_paths(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the config for an installation.
    ///
    /// `override_path` replaces the default `root/coreguard.toml`. A missing
    /// file yields defaults; a malformed one is an error.
    pub fn load(paths: Paths, override_path: Option<&Path>) -> Result<Self> {
        let path = override_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| paths.config_file());

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Config::default()
        };

        config.paths = paths;
        config.source = Some(path);
        Ok(config)
    }

    /// Where `save` writes.
    pub fn config_path(&self) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| self.paths.config_file())
    }

    pub fn save(&self) -> Result<()> {
        let path = self.config_path();

        // Create parent directories
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;

        Ok(())
    }

    /// Write the commented template, refusing to overwrite unless `force`.
    pub fn init_template(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            anyhow::bail!(
                "Config file already exists at {}. Use --force to overwrite.",
                path.display()
            );
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
        Ok(())
    }

    /// Configured protect roots, resolved against the installation root.
    pub fn protect_roots(&self) -> Vec<PathBuf> {
        self.protect
            .paths
            .iter()
            .map(|p| self.paths.resolve_under_root(p))
            .collect()
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["protect", "paths"] => Ok(self.protect.paths.join(",")),
            ["logging", "level"] => Ok(self.logging.level.clone()),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["protect", "paths"] => {
                self.protect.paths = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            ["logging", "level"] => self.logging.level = value.to_string(),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }

        Ok(())
    }
}

/// Default config template with helpful comments (used by `config init`)
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# coreguard configuration
# Lives at the installation root. Every path below is relative to it
# unless absolute.
#
# Fixed files (not configurable):
#   agent/core_manifest.json   integrity manifest
#   agent/keys.json            override secret digest (provisioned by hand)
#   offline_logs/agent.log     audit log

[protect]
# Roots hashed by `coreguard build` when no paths are given.
# Directories are walked recursively; symlinks inside them are not followed.
paths = ["agent"]

[logging]
# Diagnostic verbosity on stderr: error | warn | info | debug | trace
# RUST_LOG takes precedence when set.
level = "info"
"#;
