//! Manifest-based integrity checking.
//!
//! ```text
//! build:   roots ──► builder ──► Manifest ──► store::save
//! verify:  store::load ──► verifier ──► VerificationResult ──► AuditLog
//! ```
//!
//! Every manifest digest is the SHA-256 of the file's full content at build
//! time. The manifest itself is not signed: an attacker who can rewrite it
//! can also rewrite the baseline.

mod builder;
mod hasher;
mod store;
mod verifier;

pub use builder::{BuildReport, ScanOutcome, SkipReason, build_manifest, build_manifest_excluding};
pub use hasher::{CHUNK_SIZE, bytes_sha256, file_sha256};
pub use store::{Manifest, load_manifest, save_manifest};
pub use verifier::{VerificationResult, VerifyStatus, check_manifest, verify_manifest};
