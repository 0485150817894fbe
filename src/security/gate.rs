//! Secret-key challenge guarding destructive actions.
//!
//! The operator provisions `<root>/agent/keys.json` out of band:
//!
//! ```json
//! { "override_key_hash": "<sha256 hex of the override key>" }
//! ```
//!
//! This crate only ever reads that file. A missing file, a missing key, or
//! an empty digest all deny: the gate fails closed. The authorization
//! result is binary; [`DenyReason`] exists so the caller can tell the user
//! *why*, not to grant partial access.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::error::{GuardError, Result};
use crate::integrity::bytes_sha256;

/// Key under which the secret digest is stored.
pub const SECRET_KEY_NAME: &str = "override_key_hash";

/// Literal the caller must type after authorization. Case-sensitive.
pub const CONFIRMATION_TOKEN: &str = "YES";

/// Position in the two-factor erase flow.
///
/// ```text
/// Idle ─► KeyPrompted ─┬─► Denied
///                      └─► Authorized ─► ConfirmPrompted ─┬─► Executed
///                                                         └─► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    KeyPrompted,
    Authorized,
    Denied,
    ConfirmPrompted,
    Executed,
    Cancelled,
}

impl GateState {
    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GateState::Denied | GateState::Executed | GateState::Cancelled
        )
    }
}

/// Why a challenge was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The secret store file does not exist.
    NoStore,
    /// The store exists but has no `override_key_hash`.
    NoSecret,
    /// The candidate's digest does not match.
    WrongSecret,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NoStore => write!(f, "no keys configured"),
            DenyReason::NoSecret => write!(f, "no override key set in the secret store"),
            DenyReason::WrongSecret => write!(f, "override key invalid"),
        }
    }
}

/// Result of a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Authorized,
    Denied(DenyReason),
}

impl Decision {
    pub fn is_authorized(self) -> bool {
        matches!(self, Decision::Authorized)
    }
}

/// The stored secret digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    digest: String,
}

impl SecretRecord {
    /// Whether `candidate` hashes to the stored digest.
    ///
    /// Both sides are compared as opaque strings in constant time. Digests
    /// of different length never match.
    pub fn matches(&self, candidate: &str) -> bool {
        let hashed = bytes_sha256(candidate.as_bytes());
        bool::from(hashed.as_bytes().ct_eq(self.digest.as_bytes()))
    }
}

#[derive(Deserialize)]
struct SecretStoreFile {
    #[serde(default)]
    override_key_hash: Option<String>,
}

/// Read-only view of the secret store.
#[derive(Debug, Clone)]
pub struct OverrideGate {
    store: PathBuf,
}

impl OverrideGate {
    pub fn new(store: impl Into<PathBuf>) -> Self {
        Self {
            store: store.into(),
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store
    }

    /// Load the configured secret digest.
    ///
    /// `Ok(Err(reason))` when the store is absent or has no secret set;
    /// [`GuardError::Parse`] when the store exists but is malformed.
    pub fn load_record(&self) -> Result<std::result::Result<SecretRecord, DenyReason>> {
        let content = match fs::read_to_string(&self.store) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No secret store at {}", self.store.display());
                return Ok(Err(DenyReason::NoStore));
            }
            Err(e) => return Err(GuardError::io(&self.store, e)),
        };

        let parsed: SecretStoreFile =
            serde_json::from_str(&content).map_err(|e| GuardError::parse(&self.store, e))?;

        Ok(match parsed.override_key_hash {
            Some(digest) if !digest.is_empty() => Ok(SecretRecord { digest }),
            _ => Err(DenyReason::NoSecret),
        })
    }

    /// Challenge with a candidate secret.
    pub fn decide(&self, candidate: &str) -> Result<Decision> {
        Ok(match self.load_record()? {
            Err(reason) => Decision::Denied(reason),
            Ok(record) if record.matches(candidate) => Decision::Authorized,
            Ok(_) => Decision::Denied(DenyReason::WrongSecret),
        })
    }

    /// Binary form of [`decide`](Self::decide). Any error denies.
    pub fn challenge(&self, candidate: &str) -> bool {
        self.decide(candidate)
            .map(Decision::is_authorized)
            .unwrap_or(false)
    }
}
