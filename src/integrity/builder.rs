//! Manifest construction from a set of root paths.
//!
//! Building is best-effort: a path that does not exist yet, or a file that
//! cannot be read during the scan, is skipped and recorded in the
//! [`BuildReport`] rather than aborting the whole build.
//!
//! Paths are stored in absolute form (relative inputs are joined onto the
//! working directory). Symlinks are not resolved, and directory traversal
//! never follows them, so a link cycle cannot cause an endless walk.
//!
//! Excluded paths (usually the manifest destination, which often lives
//! inside a protected directory) are never hashed.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::hasher::file_sha256;
use super::store::Manifest;

/// Why a path did not produce a manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The root path does not exist.
    NotFound,
    /// Symlink found inside a directory scan; traversal does not follow links.
    Symlink,
    /// Explicitly excluded from the build.
    Excluded,
    /// Not a regular file or directory (socket, FIFO, device).
    NotRegular,
    /// Path cannot be represented as UTF-8 and so cannot be a manifest key.
    NonUtf8Path,
    /// Opening, reading or listing failed.
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "not found"),
            SkipReason::Symlink => write!(f, "symlink (not followed)"),
            SkipReason::Excluded => write!(f, "excluded"),
            SkipReason::NotRegular => write!(f, "not a regular file"),
            SkipReason::NonUtf8Path => write!(f, "path is not valid UTF-8"),
            SkipReason::Unreadable(e) => write!(f, "unreadable: {}", e),
        }
    }
}

/// Per-path result of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Hashed(String),
    Skipped(SkipReason),
}

/// Manifest plus the outcome for every path the builder touched.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub manifest: Manifest,
    pub outcomes: Vec<(PathBuf, ScanOutcome)>,
}

impl BuildReport {
    /// Paths that were skipped, with the reason.
    pub fn skipped(&self) -> impl Iterator<Item = (&Path, &SkipReason)> {
        self.outcomes.iter().filter_map(|(p, o)| match o {
            ScanOutcome::Skipped(reason) => Some((p.as_path(), reason)),
            ScanOutcome::Hashed(_) => None,
        })
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }

    fn record(&mut self, path: PathBuf, outcome: ScanOutcome) {
        match &outcome {
            ScanOutcome::Hashed(_) => {}
            ScanOutcome::Skipped(reason @ (SkipReason::NotFound | SkipReason::Excluded)) => {
                debug!("Skipping {}: {}", path.display(), reason)
            }
            ScanOutcome::Skipped(reason) => warn!("Skipping {}: {}", path.display(), reason),
        }
        self.outcomes.push((path, outcome));
    }

    fn hash_into(&mut self, path: PathBuf, exclude: &[PathBuf]) {
        if exclude.contains(&path) {
            self.record(path, ScanOutcome::Skipped(SkipReason::Excluded));
            return;
        }

        let Some(key) = path.to_str().map(str::to_owned) else {
            self.record(path, ScanOutcome::Skipped(SkipReason::NonUtf8Path));
            return;
        };

        match file_sha256(&path) {
            Ok(digest) => {
                self.manifest.insert(key, digest.clone());
                self.record(path, ScanOutcome::Hashed(digest));
            }
            Err(e) => {
                let reason = SkipReason::Unreadable(e.to_string());
                self.record(path, ScanOutcome::Skipped(reason));
            }
        }
    }

    fn scan_dir(&mut self, root: &Path, exclude: &[PathBuf]) {
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    self.record(
                        path,
                        ScanOutcome::Skipped(SkipReason::Unreadable(e.to_string())),
                    );
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            let path = entry.into_path();
            if file_type.is_symlink() {
                self.record(path, ScanOutcome::Skipped(SkipReason::Symlink));
            } else if file_type.is_file() {
                self.hash_into(path, exclude);
            } else {
                self.record(path, ScanOutcome::Skipped(SkipReason::NotRegular));
            }
        }
    }
}

/// Hash every regular file reachable from `roots`.
///
/// Overlapping roots still yield one entry per file, since the manifest
/// is keyed by path.
pub fn build_manifest<P: AsRef<Path>>(roots: &[P]) -> BuildReport {
    build_manifest_excluding(roots, &[] as &[&Path])
}

/// Like [`build_manifest`], skipping every path in `exclude`.
///
/// Exclusions match exact files after the same absolute-path conversion
/// applied to roots.
pub fn build_manifest_excluding<P, Q>(roots: &[P], exclude: &[Q]) -> BuildReport
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut report = BuildReport::default();
    let exclude: Vec<PathBuf> = exclude
        .iter()
        .map(|p| {
            let p = p.as_ref();
            std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf())
        })
        .collect();

    for root in roots {
        let given: &Path = root.as_ref();
        let root = match std::path::absolute(given) {
            Ok(abs) => abs,
            Err(e) => {
                report.record(
                    given.to_path_buf(),
                    ScanOutcome::Skipped(SkipReason::Unreadable(e.to_string())),
                );
                continue;
            }
        };

        let meta = match fs::metadata(&root) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                report.record(root, ScanOutcome::Skipped(SkipReason::NotFound));
                continue;
            }
            Err(e) => {
                report.record(
                    root,
                    ScanOutcome::Skipped(SkipReason::Unreadable(e.to_string())),
                );
                continue;
            }
        };

        if meta.is_file() {
            // Keyed on the path itself so non-UTF-8 roots are handled once too
            let seen = report.outcomes.iter().any(|(p, _)| *p == root);
            if !seen {
                report.hash_into(root, &exclude);
            }
        } else if meta.is_dir() {
            report.scan_dir(&root, &exclude);
        } else {
            report.record(root, ScanOutcome::Skipped(SkipReason::NotRegular));
        }
    }

    debug!(
        "Built manifest: {} entries, {} skipped",
        report.manifest.len(),
        report.skipped_count()
    );
    report
}
