//! Advisory hardening hints.
//!
//! Reports whether protected paths are writable and prints the commands an
//! administrator could run to lock them. Nothing here changes permissions,
//! ACLs, or immutability flags.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Write-protection state of one path for the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protection {
    Missing,
    ReadOnly,
    Writable,
    /// Metadata could not be read.
    Unknown(String),
}

#[derive(Debug, Clone)]
pub struct Advisory {
    pub path: PathBuf,
    pub protection: Protection,
    /// Suggested commands; empty unless the path is writable.
    pub commands: Vec<String>,
}

impl Advisory {
    /// Whether the path needs attention (writable, missing or unknown).
    pub fn needs_attention(&self) -> bool {
        !matches!(self.protection, Protection::ReadOnly)
    }
}

/// Assess one path.
pub fn assess(path: &Path) -> Advisory {
    let protection = match fs::metadata(path) {
        Ok(meta) if can_write(path, &meta) => Protection::Writable,
        Ok(_) => Protection::ReadOnly,
        Err(e) if e.kind() == ErrorKind::NotFound => Protection::Missing,
        Err(e) => Protection::Unknown(e.to_string()),
    };

    let commands = if protection == Protection::Writable {
        lock_commands(path)
    } else {
        Vec::new()
    };

    Advisory {
        path: path.to_path_buf(),
        protection,
        commands,
    }
}

/// Assess every path, preserving input order.
pub fn assess_all<P: AsRef<Path>>(paths: &[P]) -> Vec<Advisory> {
    paths.iter().map(|p| assess(p.as_ref())).collect()
}

/// Ask the kernel rather than reading mode bits, so ownership and root
/// privileges are taken into account.
#[cfg(unix)]
fn can_write(path: &Path, _meta: &fs::Metadata) -> bool {
    use nix::unistd::{AccessFlags, access};
    access(path, AccessFlags::W_OK).is_ok()
}

#[cfg(not(unix))]
fn can_write(_path: &Path, meta: &fs::Metadata) -> bool {
    !meta.permissions().readonly()
}

#[cfg(target_os = "linux")]
fn lock_commands(path: &Path) -> Vec<String> {
    let p = shell_quote(path);
    vec![format!("chmod a-w {}", p), format!("sudo chattr +i {}", p)]
}

#[cfg(target_os = "macos")]
fn lock_commands(path: &Path) -> Vec<String> {
    let p = shell_quote(path);
    vec![format!("chmod a-w {}", p), format!("sudo chflags uchg {}", p)]
}

#[cfg(all(unix, not(any(target_os = "linux", target_os = "macos"))))]
fn lock_commands(path: &Path) -> Vec<String> {
    vec![format!("chmod a-w {}", shell_quote(path))]
}

#[cfg(windows)]
fn lock_commands(path: &Path) -> Vec<String> {
    let p = path.display();
    vec![
        format!("attrib +R \"{}\"", p),
        format!("icacls \"{}\" /deny Everyone:(W)", p),
    ]
}

#[cfg(not(any(unix, windows)))]
fn lock_commands(_path: &Path) -> Vec<String> {
    Vec::new()
}

/// Single-quote a path for POSIX shells.
#[cfg(unix)]
fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_needs_attention_without_commands() {
        let tmp = tempfile::tempdir().unwrap();
        let advisory = assess(&tmp.path().join("absent"));
        assert_eq!(advisory.protection, Protection::Missing);
        assert!(advisory.needs_attention());
        assert!(advisory.commands.is_empty());
    }

    #[test]
    fn writable_file_gets_lock_commands() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("knowledge.json");
        fs::write(&path, "{}").unwrap();

        let advisory = assess(&path);
        assert_eq!(advisory.protection, Protection::Writable);
        assert!(advisory.needs_attention());
        assert!(!advisory.commands.is_empty());
        assert!(advisory.commands.iter().all(|c| c.contains("knowledge.json")));
    }

    #[test]
    fn readonly_bits_follow_actual_write_access() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("locked.txt");
        fs::write(&path, "x").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        // Root can still write a read-only file; the report must agree
        let can_open = fs::OpenOptions::new().append(true).open(&path).is_ok();
        let advisory = assess(&path);
        let expected = if can_open {
            Protection::Writable
        } else {
            Protection::ReadOnly
        };
        assert_eq!(advisory.protection, expected);
        assert_eq!(advisory.needs_attention(), can_open);
        assert_eq!(advisory.commands.is_empty(), !can_open);
        // Assessment never alters permissions
        assert!(fs::metadata(&path).unwrap().permissions().readonly());

        // Let the tempdir clean up
        let mut perms = fs::metadata(&path).unwrap().permissions();
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(&path, perms).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn quotes_awkward_paths() {
        assert_eq!(shell_quote(Path::new("/a b/it's")), r"'/a b/it'\''s'");
    }
}
