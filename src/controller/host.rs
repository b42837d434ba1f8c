//! Host-supplied call primitives
//!
//! The execution environment authenticates the caller, attaches an exact
//! payment and reads its clock once per call. Those values arrive here as
//! plain parameters instead of ambient globals.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte account identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// Random identity for simulated participants
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill(&mut bytes);
        Self(bytes)
    }

    /// Deterministic identity derived from a small tag, for tests and fixtures
    pub fn from_tag(tag: u8) -> Self {
        let mut bytes = [0u8; 32];
        bytes[31] = tag;
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

/// One call's worth of host context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Authenticated caller
    pub caller: AccountId,
    /// Exact payment attached to the call
    pub value: u64,
    /// Host clock reading in seconds
    pub now: u64,
}

impl CallContext {
    pub fn new(caller: AccountId, value: u64, now: u64) -> Self {
        Self { caller, value, now }
    }

    /// Context for calls that attach no payment
    pub fn unpaid(caller: AccountId, now: u64) -> Self {
        Self::new(caller, 0, now)
    }
}

/// Why a reveal was turned into a full refund
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// The reveal arrived after the commitment's maximum age
    CommitmentExpired,
    /// The name was taken between commit and reveal
    NameUnavailable,
}

/// Result of a `register` call that did not hard-reject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterOutcome {
    Registered {
        expires: u64,
        cost: u64,
        refund: u64,
    },
    /// Soft abort: nothing registered, the whole attached value goes back
    Refunded { reason: AbortReason, refund: u64 },
}

impl RegisterOutcome {
    /// Amount the host must return to the caller
    pub fn refund(&self) -> u64 {
        match self {
            RegisterOutcome::Registered { refund, .. } => *refund,
            RegisterOutcome::Refunded { refund, .. } => *refund,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, RegisterOutcome::Registered { .. })
    }
}

/// Result of a successful `renew` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalReceipt {
    pub expires: u64,
    pub cost: u64,
    pub refund: u64,
}
