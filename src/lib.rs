//! coreguard - local file-integrity verification with an override-gated erase
//!
//! This crate provides:
//! - Streaming SHA-256 manifests of a protected set of files
//! - Verification that classifies entries as ok, missing, or mismatched
//! - An append-only, timestamped audit log
//! - A two-factor (secret + literal confirmation) gate before erase
//! - Advisory lock commands; OS permissions are never changed

pub mod cli;
pub mod config;
pub mod error;
pub mod integrity;
pub mod paths;
pub mod security;

pub use config::Config;
pub use error::GuardError;
