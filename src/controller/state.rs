//! Controller state
//!
//! Everything the controller owns lives in [`ControllerState`], which is
//! cheap enough to clone for staging one call at a time.

use crate::controller::constants::{
    MAX_COMMITMENT_AGE, MIN_COMMITMENT_AGE, MIN_REGISTRATION_DURATION,
};
use crate::controller::errors::{ControllerError, Result};
use crate::controller::events::ControllerEvent;
use crate::controller::host::AccountId;
use crate::pricing::PriceOracle;
use crate::utils::hash::CommitmentHash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Time bounds of the commit-reveal handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentWindows {
    pub min_commitment_age: u64,
    pub max_commitment_age: u64,
    pub min_registration_duration: u64,
}

impl Default for CommitmentWindows {
    fn default() -> Self {
        Self {
            min_commitment_age: MIN_COMMITMENT_AGE,
            max_commitment_age: MAX_COMMITMENT_AGE,
            min_registration_duration: MIN_REGISTRATION_DURATION,
        }
    }
}

impl CommitmentWindows {
    /// Windows with no reveal delay; front-running is possible
    pub fn unprotected() -> Self {
        Self {
            min_commitment_age: 0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_commitment_age <= self.min_commitment_age {
            return Err(ControllerError::InvalidWindows);
        }
        Ok(())
    }
}

/// Lifecycle of a commitment digest as seen at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentStatus {
    /// Never committed, or consumed by a registration
    Absent,
    /// Stored and not yet past its maximum age
    ///
    /// Revealable from `ready_at` through `expires_at` inclusive. The digest
    /// may already be re-committed at exactly `expires_at`.
    Pending { ready_at: u64, expires_at: u64 },
    /// Stored but past its maximum age; no longer revealable
    Stale,
}

/// Staged unit of controller state
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub owner: AccountId,
    pub oracle: Arc<dyn PriceOracle>,
    /// Digest → commit timestamp
    pub commitments: HashMap<CommitmentHash, u64>,
    /// Funds collected, net of refunds
    pub balance: u64,
    /// Notifications raised during the current call
    pub pending_events: Vec<ControllerEvent>,
}

impl ControllerState {
    pub fn new(owner: AccountId, oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            owner,
            oracle,
            commitments: HashMap::new(),
            balance: 0,
            pending_events: Vec::new(),
        }
    }

    /// Stored timestamp, 0 if absent
    pub fn commitment_timestamp(&self, digest: &CommitmentHash) -> u64 {
        self.commitments.get(digest).copied().unwrap_or(0)
    }

    pub fn emit(&mut self, event: ControllerEvent) {
        self.pending_events.push(event);
    }

    pub fn require_owner(&self, caller: &AccountId) -> Result<()> {
        if caller != &self.owner {
            return Err(ControllerError::Unauthorized);
        }
        Ok(())
    }
}
