//! Error taxonomy shared by the integrity and security modules.
//!
//! | Variant | Recovery |
//! |---------|----------|
//! | [`Io`](GuardError::Io) | skipped during build, marked mismatched during verify, surfaced during erase |
//! | [`Parse`](GuardError::Parse) | always surfaced |
//! | [`AuthorizationDenied`](GuardError::AuthorizationDenied) | surfaced, with an audit entry |
//! | [`ConfirmationDeclined`](GuardError::ConfirmationDeclined) | a cancellation, not a failure |
//!
//! Audit-log write failures are deliberately not part of this enum; see
//! [`AuditError`](crate::security::AuditError).

use std::io;
use std::path::{Path, PathBuf};

use crate::security::DenyReason;

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(DenyReason),

    #[error("Confirmation declined")]
    ConfirmationDeclined,

    #[error("Gate is in state {state:?}; cannot {action}")]
    InvalidState {
        state: crate::security::GateState,
        action: &'static str,
    },
}

impl GuardError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;
