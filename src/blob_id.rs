//! Git-compatible blob content fingerprint.
//!
//! `BlobId` is a 20-byte SHA-1 digest computed exactly the way `git
//! hash-object` computes a blob object id: `sha1("blob " + ASCII(len) + "\0"
//! + content)`. This lets callers pass through a blob id already computed by
//! git tooling (a source enumerator walking a git history, for instance)
//! without the core recomputing it, and lets the core's own computation be
//! checked against `git hash-object` directly.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// A 20-byte content fingerprint, git blob-object compatible.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobId([u8; 20]);

impl BlobId {
    /// Compute the git blob object id for `content`.
    pub fn compute(content: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(b"blob ");
        hasher.update(content.len().to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(content);
        let digest = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest);
        BlobId(bytes)
    }

    /// Wrap a caller-supplied 20-byte digest verbatim, skipping recomputation.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        BlobId(bytes)
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase 40-character hex representation.
    pub fn hex(&self) -> String {
        let mut s = String::with_capacity(40);
        for b in self.0 {
            s.push_str(&format!("{:02x}", b));
        }
        s
    }
}

impl fmt::Debug for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobId({})", self.hex())
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}
