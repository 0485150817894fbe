//! Audit trail, override gate, and advisory hardening.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  erase.rs: EraseSession, secret ─► confirmation ─► remove     │
//! ├──────────────────────┬────────────────────┬───────────────────┤
//! │  gate.rs             │  audit.rs          │  advisory.rs      │
//! │  Secret store,       │  Append-only,      │  Writable checks, │
//! │  constant-time       │  timestamped,      │  lock commands    │
//! │  digest challenge    │  serialized lines  │  (never applied)  │
//! └──────────────────────┴────────────────────┴───────────────────┘
//! ```
//!
//! ## Security model
//!
//! 1. **Fail closed**: no secret store, no configured secret, or a
//!    malformed store all deny.
//! 2. **Two factors**: the secret authorizes, the literal confirmation
//!    executes. Neither alone removes anything.
//! 3. **Audit before abort**: denials are written to the audit log before
//!    the caller learns of them.
//! 4. **Advisory only**: no OS permission is ever changed.
//!
//! ## Threat model
//!
//! | Threat | Defense |
//! |--------|---------|
//! | Mistaken or scripted `erase` | Secret + typed `YES` |
//! | Timing the digest comparison | `subtle` constant-time equality |
//! | Silent tampering of protected files | Manifest verification |
//! | Attacker rewrites manifest and files | Out of scope (manifests are unsigned) |

mod advisory;
mod audit;
mod erase;
mod gate;

// ── Audit Log ───────────────────────────────────────────────────────

pub use audit::{AuditError, AuditLog};

// ── Override Gate ───────────────────────────────────────────────────

pub use gate::{
    CONFIRMATION_TOKEN, Decision, DenyReason, GateState, OverrideGate, SECRET_KEY_NAME,
    SecretRecord,
};

// ── Erase ───────────────────────────────────────────────────────────

pub use erase::{EraseReport, EraseSession, Prompter};

// ── Advisory ────────────────────────────────────────────────────────

pub use advisory::{Advisory, Protection, assess, assess_all};
