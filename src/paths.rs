//! Installation-root path resolution.
//!
//! Every file this tool touches lives at a fixed location under one
//! installation root. The root is resolved through a three-level fallback:
//! 1. `--root` on the command line
//! 2. `COREGUARD_ROOT` env var (absolute, `~` expanded)
//! 3. The current working directory
//!
//! Relative values from the env var are ignored.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Env var naming the installation root.
pub const ROOT_ENV: &str = "COREGUARD_ROOT";

/// Resolved paths for the entire application.
///
/// Created once at startup and threaded through `Config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Installation root; everything below is relative to it.
    pub root: PathBuf,
}

impl Paths {
    /// Resolve using the real environment.
    pub fn resolve(cli_root: Option<&Path>) -> Result<Self> {
        Self::resolve_with_env(cli_root, |key| std::env::var(key))
    }

    /// Resolve with a custom env var lookup (for testing).
    pub fn resolve_with_env<F>(cli_root: Option<&Path>, env_fn: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
    {
        let root = match cli_root {
            Some(root) => std::path::absolute(expand(root))
                .with_context(|| format!("Failed to resolve root {}", root.display()))?,
            None => match env_root(&env_fn) {
                Some(root) => root,
                None => std::env::current_dir().context("Failed to read current directory")?,
            },
        };

        Ok(Self { root })
    }

    /// Paths anchored at an explicit root, with no lookup.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // ── Fixed files ──

    /// Integrity manifest: root/agent/core_manifest.json
    pub fn manifest(&self) -> PathBuf {
        self.root.join("agent").join("core_manifest.json")
    }

    /// Secret store: root/agent/keys.json
    pub fn secret_store(&self) -> PathBuf {
        self.root.join("agent").join("keys.json")
    }

    /// Audit log: root/offline_logs/agent.log
    pub fn audit_log(&self) -> PathBuf {
        self.root.join("offline_logs").join("agent.log")
    }

    /// Config file: root/coreguard.toml
    pub fn config_file(&self) -> PathBuf {
        self.root.join("coreguard.toml")
    }

    /// Resolve a configured path against the root. Absolute paths and
    /// `~` paths pass through.
    pub fn resolve_under_root(&self, path: &str) -> PathBuf {
        let expanded = expand(Path::new(path));
        if expanded.is_absolute() {
            expanded
        } else {
            self.root.join(expanded)
        }
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::resolve(None).unwrap_or_else(|_| Self::at("."))
    }
}

fn env_root<F>(env_fn: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
{
    env_fn(ROOT_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| PathBuf::from(shellexpand::tilde(&v).to_string()))
        .filter(|p| p.is_absolute())
}

fn expand(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).to_string()),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Helper: build an env_fn from a HashMap
    fn make_env(
        map: HashMap<&str, &str>,
    ) -> impl Fn(&str) -> std::result::Result<String, std::env::VarError> {
        move |key: &str| {
            map.get(key)
                .map(|v| v.to_string())
                .ok_or(std::env::VarError::NotPresent)
        }
    }

    #[test]
    fn cli_root_wins_over_env() {
        let mut env = HashMap::new();
        env.insert(ROOT_ENV, "/from/env");

        let paths = Paths::resolve_with_env(Some(Path::new("/from/cli")), make_env(env)).unwrap();
        assert_eq!(paths.root, PathBuf::from("/from/cli"));
    }

    #[test]
    fn env_root_used_when_absolute() {
        let mut env = HashMap::new();
        env.insert(ROOT_ENV, "/opt/coreguard");

        let paths = Paths::resolve_with_env(None, make_env(env)).unwrap();
        assert_eq!(paths.root, PathBuf::from("/opt/coreguard"));
    }

    #[test]
    fn relative_and_empty_env_fall_back_to_cwd() {
        let cwd = std::env::current_dir().unwrap();

        for value in ["relative/root", "", "   "] {
            let mut env = HashMap::new();
            env.insert(ROOT_ENV, value);
            let paths = Paths::resolve_with_env(None, make_env(env)).unwrap();
            assert_eq!(paths.root, cwd, "value {:?}", value);
        }
    }

    #[test]
    fn fixed_files_are_under_root() {
        let paths = Paths::at("/srv/app");
        assert_eq!(
            paths.manifest(),
            PathBuf::from("/srv/app/agent/core_manifest.json")
        );
        assert_eq!(paths.secret_store(), PathBuf::from("/srv/app/agent/keys.json"));
        assert_eq!(
            paths.audit_log(),
            PathBuf::from("/srv/app/offline_logs/agent.log")
        );
        assert_eq!(paths.config_file(), PathBuf::from("/srv/app/coreguard.toml"));
    }

    #[test]
    fn configured_paths_resolve_against_root() {
        let paths = Paths::at("/srv/app");
        assert_eq!(paths.resolve_under_root("agent"), PathBuf::from("/srv/app/agent"));
        assert_eq!(paths.resolve_under_root("/etc/x"), PathBuf::from("/etc/x"));
    }
}
