//! Manifest persistence.
//!
//! The on-disk form is a flat JSON object mapping path to digest, keys
//! sorted, two-space indented so that humans can diff successive builds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::error::{GuardError, Result};

/// Mapping from file path to the hex SHA-256 of its content at build time.
///
/// Backed by a `BTreeMap`, so iteration and serialization are path-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the digest for `path`.
    pub fn insert(&mut self, path: impl Into<String>, digest: impl Into<String>) {
        self.entries.insert(path.into(), digest.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, d)| (p.as_str(), d.as_str()))
    }

    /// Paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, String)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Write the manifest, creating missing parent directories.
pub fn save_manifest(manifest: &Manifest, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GuardError::io(parent, e))?;
    }

    let mut json =
        serde_json::to_string_pretty(manifest).map_err(|e| GuardError::parse(destination, e))?;
    json.push('\n');
    fs::write(destination, json).map_err(|e| GuardError::io(destination, e))?;

    debug!(
        "Saved manifest with {} entries to {}",
        manifest.len(),
        destination.display()
    );
    Ok(())
}

/// Read a manifest.
///
/// An absent file is not an error: it yields an empty manifest, which the
/// verifier reports as "no manifest". A file that exists but is not a
/// JSON object of strings fails with [`GuardError::Parse`].
pub fn load_manifest(source: &Path) -> Result<Manifest> {
    let content = match fs::read_to_string(source) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No manifest at {}", source.display());
            return Ok(Manifest::new());
        }
        Err(e) => return Err(GuardError::io(source, e)),
    };

    serde_json::from_str(&content).map_err(|e| GuardError::parse(source, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        let mut m = Manifest::new();
        m.insert("z/last.txt", "b".repeat(64));
        m.insert("a/first.txt", "a".repeat(64));
        m
    }

    #[test]
    fn save_then_load_preserves_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("agent").join("core_manifest.json");
        let m = sample();

        save_manifest(&m, &path).unwrap();
        assert_eq!(load_manifest(&path).unwrap(), m);
    }

    #[test]
    fn saved_form_is_sorted_and_indented() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("m.json");
        save_manifest(&sample(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let first = text.find("a/first.txt").unwrap();
        let last = text.find("z/last.txt").unwrap();
        assert!(first < last);
        assert!(text.contains("\n  \"a/first.txt\": "));
    }

    #[test]
    fn absent_source_loads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let m = load_manifest(&tmp.path().join("missing.json")).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn malformed_source_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.json");

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_manifest(&path).unwrap_err(),
            GuardError::Parse { .. }
        ));

        // Well-formed JSON of the wrong shape is also rejected
        fs::write(&path, r#"{"a.txt": 42}"#).unwrap();
        assert!(matches!(
            load_manifest(&path).unwrap_err(),
            GuardError::Parse { .. }
        ));
    }
}
