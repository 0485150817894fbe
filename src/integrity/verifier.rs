//! Manifest verification against the live filesystem.
//!
//! Verification is strict where building is tolerant: an entry whose file
//! cannot be read is reported as mismatched, never skipped, because trust
//! decisions depend on every protected file being checked.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use super::hasher::file_sha256;
use super::store::{Manifest, load_manifest};
use crate::error::Result;
use crate::security::AuditLog;

/// Overall verdict of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyStatus {
    /// Every entry present and unchanged.
    Ok,
    /// At least one entry missing or mismatched.
    Fail,
    /// The manifest store had nothing to check.
    NoManifest,
}

impl fmt::Display for VerifyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerifyStatus::Ok => "ok",
            VerifyStatus::Fail => "fail",
            VerifyStatus::NoManifest => "no-manifest",
        })
    }
}

/// Outcome of checking every manifest entry. Recomputed on each call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub status: VerifyStatus,
    pub checked: usize,
    /// Paths absent from the filesystem, in path order.
    pub missing: Vec<String>,
    /// Paths whose digest differs or could not be recomputed, in path order.
    pub mismatched: Vec<String>,
    /// Set when the audit event for this run could not be written.
    #[serde(skip)]
    pub audit_warning: Option<String>,
}

impl VerificationResult {
    fn no_manifest() -> Self {
        Self {
            status: VerifyStatus::NoManifest,
            checked: 0,
            missing: Vec::new(),
            mismatched: Vec::new(),
            audit_warning: None,
        }
    }

    /// One-line summary, also used as the audit message.
    pub fn summary(&self) -> String {
        format!(
            "verify {}: checked={} missing={} mismatched={}",
            self.status,
            self.checked,
            self.missing.len(),
            self.mismatched.len()
        )
    }
}

/// Check every entry of an in-memory manifest. No side effects.
pub fn check_manifest(manifest: &Manifest) -> VerificationResult {
    if manifest.is_empty() {
        return VerificationResult::no_manifest();
    }

    let mut checked = 0;
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for (path, expected) in manifest.iter() {
        checked += 1;
        let fs_path = Path::new(path);

        match fs_path.try_exists() {
            Ok(false) => {
                debug!("Missing: {}", path);
                missing.push(path.to_string());
                continue;
            }
            Ok(true) => {}
            Err(e) => {
                warn!("Cannot stat {}: {}. Marking mismatched.", path, e);
                mismatched.push(path.to_string());
                continue;
            }
        }

        match file_sha256(fs_path) {
            Ok(actual) if actual == expected => {}
            Ok(_) => {
                debug!("Digest mismatch: {}", path);
                mismatched.push(path.to_string());
            }
            Err(e) => {
                warn!("{}. Marking mismatched.", e);
                mismatched.push(path.to_string());
            }
        }
    }

    let status = if missing.is_empty() && mismatched.is_empty() {
        VerifyStatus::Ok
    } else {
        VerifyStatus::Fail
    };

    VerificationResult {
        status,
        checked,
        missing,
        mismatched,
        audit_warning: None,
    }
}

/// Load the manifest at `source`, check it, and record one audit event.
///
/// A malformed manifest is surfaced as an error after its own audit event,
/// so every call leaves exactly one line in the log.
pub fn verify_manifest(source: &Path, audit: &AuditLog) -> Result<VerificationResult> {
    let manifest = match load_manifest(source) {
        Ok(m) => m,
        Err(e) => {
            audit.record(&format!("verify error: {}", e));
            return Err(e);
        }
    };

    let mut result = check_manifest(&manifest);
    result.audit_warning = audit.record(&result.summary());
    Ok(result)
}
