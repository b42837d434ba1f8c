//! Hash Utilities for Commit-Reveal
//!
//! Label hashes and commitment digests are SHA-256. A commitment is
//! `SHA-256(label_hash || secret)`, so it can be computed off-system
//! before anything naming the label is submitted.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 of a name's UTF-8 bytes; the key the name ledger is indexed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelHash(pub [u8; 32]);

/// Opaque commitment digest submitted during the commit phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommitmentHash(pub [u8; 32]);

/// 32-byte blinding secret chosen by the registrant
pub type Secret = [u8; 32];

impl LabelHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl CommitmentHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for LabelHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Display for CommitmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Hash a name into its ledger key
pub fn label_hash(name: &str) -> LabelHash {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    LabelHash(hasher.finalize().into())
}

/// Compute the commitment digest for `(name, secret)`
///
/// Layout: label_hash (32 bytes) + secret (32 bytes) = 64 bytes hashed.
pub fn make_commitment(name: &str, secret: &Secret) -> CommitmentHash {
    let label = label_hash(name);
    let mut hasher = Sha256::new();
    hasher.update(label.as_bytes());
    hasher.update(secret);
    CommitmentHash(hasher.finalize().into())
}

/// Short hex prefix for log lines
pub fn short_hex(bytes: &[u8; 32]) -> String {
    hex::encode(&bytes[..8])
}

/// Generate a random 32-byte secret
pub fn generate_secret() -> Secret {
    let mut secret = [0u8; 32];
    rand::thread_rng().fill(&mut secret);
    secret
}
