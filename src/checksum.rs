//! Checksum utilities for published schema payloads

use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256 checksum of an encoded schema payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Parse the contents of a `.sha256` sidecar file
    ///
    /// Accepts both a bare digest and the `sha256sum` layout
    /// (`<digest>  <filename>`).
    pub fn parse(line: &str) -> Self {
        let digest = line.split_whitespace().next().unwrap_or("");
        Self(digest.to_ascii_lowercase())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that a payload matches this checksum
    pub fn verify(&self, data: &[u8]) -> bool {
        *self == Self::from_bytes(data)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
