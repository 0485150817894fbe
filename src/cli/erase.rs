//! CLI subcommand: `coreguard erase <path>`
//!
//! Prompts on stdin for the override key, then for the literal `YES`.

use anyhow::Result;
use clap::Args;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Config;
use crate::error::GuardError;
use crate::security::{
    AuditLog, EraseReport, EraseSession, GateState, OverrideGate, Prompter,
};

#[derive(Args)]
pub struct EraseArgs {
    /// File or directory to remove
    pub path: PathBuf,
}

/// Reads answers from stdin, one line each.
struct StdinPrompter;

impl StdinPrompter {
    fn ask(prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input)
    }
}

impl Prompter for StdinPrompter {
    fn secret(&mut self, prompt: &str) -> io::Result<String> {
        Self::ask(prompt)
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<String> {
        Self::ask(prompt)
    }
}

/// Terminal result of an erase command, as the user sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Erased,
    Denied,
    Cancelled,
    Failed,
}

impl Outcome {
    /// Sort a session result. `None` means an unexpected error to propagate.
    fn classify(result: &crate::error::Result<EraseReport>, state: GateState) -> Option<Self> {
        match result {
            Ok(_) => Some(Outcome::Erased),
            Err(GuardError::AuthorizationDenied(_)) => Some(Outcome::Denied),
            Err(GuardError::ConfirmationDeclined) => Some(Outcome::Cancelled),
            // Secret store unreadable or malformed: nothing was attempted
            Err(GuardError::Io { .. } | GuardError::Parse { .. })
                if state == GateState::Denied =>
            {
                Some(Outcome::Denied)
            }
            Err(GuardError::Io { .. }) => Some(Outcome::Failed),
            Err(_) => None,
        }
    }

    fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Erased | Outcome::Cancelled => ExitCode::SUCCESS,
            Outcome::Denied | Outcome::Failed => ExitCode::from(1),
        }
    }
}

pub fn run(args: EraseArgs, config: &Config, audit: &AuditLog) -> Result<ExitCode> {
    let gate = OverrideGate::new(config.paths.secret_store());
    let mut session = EraseSession::new(&gate, audit, &args.path);

    let result = session.run(&mut StdinPrompter);

    for w in session.audit_warnings() {
        eprintln!("warning: {}", w);
    }

    let Some(outcome) = Outcome::classify(&result, session.state()) else {
        return result.map(|_| ExitCode::FAILURE).map_err(Into::into);
    };

    match (outcome, &result) {
        (Outcome::Erased, _) => println!("Erased"),
        (Outcome::Cancelled, _) => println!("Cancelled"),
        (Outcome::Denied, Err(GuardError::AuthorizationDenied(reason))) => {
            println!("Override denied: {}.", reason);
            println!("Action denied.");
        }
        (Outcome::Denied, result) => {
            if let Err(e) = result {
                eprintln!("{}", e);
            }
            println!("Action denied.");
        }
        (Outcome::Failed, result) => {
            if let Err(e) = result {
                println!("Failed to erase: {}", e);
            }
        }
    }

    Ok(outcome.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::DenyReason;
    use std::path::Path;

    fn io_error() -> GuardError {
        GuardError::Io {
            path: PathBuf::from("/x"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        }
    }

    #[test]
    fn classifies_session_results() {
        let report = EraseReport {
            target: PathBuf::from("/x"),
            audit_warnings: Vec::new(),
        };
        assert_eq!(
            Outcome::classify(&Ok(report), GateState::Executed),
            Some(Outcome::Erased)
        );
        assert_eq!(
            Outcome::classify(
                &Err(GuardError::AuthorizationDenied(DenyReason::WrongSecret)),
                GateState::Denied
            ),
            Some(Outcome::Denied)
        );
        assert_eq!(
            Outcome::classify(&Err(GuardError::ConfirmationDeclined), GateState::Cancelled),
            Some(Outcome::Cancelled)
        );
        assert_eq!(
            Outcome::classify(&Err(io_error()), GateState::Executed),
            Some(Outcome::Failed)
        );
        assert_eq!(
            Outcome::classify(
                &Err(GuardError::InvalidState {
                    state: GateState::Executed,
                    action: "confirm the erase",
                }),
                GateState::Executed
            ),
            None
        );
    }

    #[test]
    fn unreadable_secret_store_is_a_denial_not_a_failure() {
        assert_eq!(
            Outcome::classify(&Err(io_error()), GateState::Denied),
            Some(Outcome::Denied)
        );

        let tmp = tempfile::tempdir().unwrap();
        let store = tmp.path().join("keys.json");
        std::fs::write(&store, "{ not json").unwrap();
        let gate = OverrideGate::new(store);
        let audit = AuditLog::new(tmp.path().join("agent.log"));
        let mut session = EraseSession::new(&gate, &audit, Path::new("/nonexistent"));

        let result = session.submit_secret("anything").map(|_| EraseReport {
            target: PathBuf::from("/nonexistent"),
            audit_warnings: Vec::new(),
        });
        assert_eq!(
            Outcome::classify(&result, session.state()),
            Some(Outcome::Denied)
        );
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Outcome::Erased.exit_code(), ExitCode::SUCCESS);
        assert_eq!(Outcome::Cancelled.exit_code(), ExitCode::SUCCESS);
        assert_eq!(Outcome::Denied.exit_code(), ExitCode::from(1));
        assert_eq!(Outcome::Failed.exit_code(), ExitCode::from(1));
    }
}
