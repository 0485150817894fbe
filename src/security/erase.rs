//! Override-gated erase.
//!
//! Two independent factors must pass before anything is removed:
//!
//! 1. possession of the override secret ([`OverrideGate`]), and
//! 2. a deliberate literal confirmation ([`CONFIRMATION_TOKEN`]).
//!
//! Every terminal outcome writes exactly one audit event, and a denial is
//! recorded before the caller is told to abort.
//!
//! | Outcome | Audit message |
//! |---------|---------------|
//! | Denied | `unauthorized erase attempt: <target> (<reason>)` |
//! | Cancelled | `erase cancelled: <target>` |
//! | Removed | `erase OK: <target>` |
//! | Removal failed | `erase FAIL: <target> <error>` |

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::audit::AuditLog;
use super::gate::{CONFIRMATION_TOKEN, Decision, GateState, OverrideGate};
use crate::error::{GuardError, Result};

/// Source of interactive answers.
pub trait Prompter {
    /// Ask for the override secret.
    fn secret(&mut self, prompt: &str) -> io::Result<String>;

    /// Ask for the literal confirmation.
    fn confirm(&mut self, prompt: &str) -> io::Result<String>;
}

/// Result of a completed erase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraseReport {
    pub target: PathBuf,
    /// Audit events that could not be written.
    pub audit_warnings: Vec<String>,
}

/// One erase attempt walking the [`GateState`] machine.
pub struct EraseSession<'a> {
    gate: &'a OverrideGate,
    audit: &'a AuditLog,
    target: PathBuf,
    state: GateState,
    audit_warnings: Vec<String>,
}

impl<'a> EraseSession<'a> {
    pub fn new(gate: &'a OverrideGate, audit: &'a AuditLog, target: impl Into<PathBuf>) -> Self {
        Self {
            gate,
            audit,
            target: target.into(),
            state: GateState::Idle,
            audit_warnings: Vec::new(),
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Audit events that could not be written so far.
    pub fn audit_warnings(&self) -> &[String] {
        &self.audit_warnings
    }

    /// Drive the whole flow, prompting for the secret then the confirmation.
    pub fn run(&mut self, prompter: &mut dyn Prompter) -> Result<EraseReport> {
        self.require_state(&[GateState::Idle], "prompt for the override key")?;
        self.state = GateState::KeyPrompted;
        let secret = match prompter.secret("Enter override key: ") {
            Ok(s) => s,
            Err(e) => {
                // No answer is no secret; fail closed through the normal path.
                warn!("Could not read override key: {}", e);
                String::new()
            }
        };
        self.submit_secret(strip_line_ending(&secret))?;

        self.state = GateState::ConfirmPrompted;
        let prompt = format!(
            "CONFIRM erase {}? Type {} to proceed: ",
            self.target.display(),
            CONFIRMATION_TOKEN
        );
        let token = prompter.confirm(&prompt).unwrap_or_else(|e| {
            warn!("Could not read confirmation: {}", e);
            String::new()
        });
        self.submit_confirmation(strip_line_ending(&token))
    }

    /// First factor. Moves to `Authorized` or `Denied`.
    ///
    /// A denial is audited before the error is returned. A malformed secret
    /// store also denies, and is surfaced as [`GuardError::Parse`].
    pub fn submit_secret(&mut self, candidate: &str) -> Result<()> {
        self.require_state(
            &[GateState::Idle, GateState::KeyPrompted],
            "submit the override key",
        )?;

        match self.gate.decide(candidate) {
            Ok(Decision::Authorized) => {
                info!("Override authorized for {}", self.target.display());
                self.state = GateState::Authorized;
                Ok(())
            }
            Ok(Decision::Denied(reason)) => {
                self.deny(&reason.to_string());
                Err(GuardError::AuthorizationDenied(reason))
            }
            Err(e) => {
                self.deny("secret store unreadable");
                Err(e)
            }
        }
    }

    /// Second factor. Only the exact [`CONFIRMATION_TOKEN`] proceeds.
    pub fn submit_confirmation(&mut self, token: &str) -> Result<EraseReport> {
        self.require_state(
            &[GateState::Authorized, GateState::ConfirmPrompted],
            "confirm the erase",
        )?;

        if token != CONFIRMATION_TOKEN {
            self.state = GateState::Cancelled;
            self.log(&format!("erase cancelled: {}", self.target.display()));
            return Err(GuardError::ConfirmationDeclined);
        }

        self.state = GateState::Executed;
        match remove_path(&self.target) {
            Ok(()) => {
                info!("Erased {}", self.target.display());
                self.log(&format!("erase OK: {}", self.target.display()));
                Ok(EraseReport {
                    target: self.target.clone(),
                    audit_warnings: self.audit_warnings.clone(),
                })
            }
            Err(e) => {
                self.log(&format!("erase FAIL: {} {}", self.target.display(), e));
                Err(GuardError::io(&self.target, e))
            }
        }
    }

    fn deny(&mut self, reason: &str) {
        self.state = GateState::Denied;
        self.log(&format!(
            "unauthorized erase attempt: {} ({})",
            self.target.display(),
            reason
        ));
    }

    fn log(&mut self, message: &str) {
        if let Some(w) = self.audit.record(message) {
            self.audit_warnings.push(w);
        }
    }

    fn require_state(&self, allowed: &[GateState], action: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(GuardError::InvalidState {
                state: self.state,
                action,
            })
        }
    }
}

/// Remove a directory tree or a single file. A symlink is removed itself,
/// never its target.
fn remove_path(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Drop the terminator of an interactive line read, nothing else.
fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}
