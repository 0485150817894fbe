//! Streaming SHA-256 of file contents.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::error::{GuardError, Result};

/// Read buffer size. Memory use stays bounded regardless of file size.
pub const CHUNK_SIZE: usize = 8192;

/// Compute the hex-encoded SHA-256 of a file's full byte content.
///
/// Fails with [`GuardError::Io`] if the file cannot be opened or a read
/// fails partway through (permission change, deletion, device error).
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| GuardError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(GuardError::io(path, e)),
        };
        hasher.update(&buf[..n]);
    }

    Ok(hex_encode(&hasher.finalize()))
}

/// Compute the hex-encoded SHA-256 of an in-memory byte string.
pub fn bytes_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
