//! Registrant Bot
//!
//! Simulates a user registering a name through the commit-reveal flow.
//! The commit leaks nothing; the reveal exposes the name and secret in
//! the mempool for one block.

use crate::controller::host::AccountId;
use crate::controller::state::CommitmentStatus;
use crate::simulation::chain::{CallReceipt, CallResult, PendingCall, SimulatedChain};
use crate::utils::hash::{generate_secret, make_commitment, short_hex, CommitmentHash, Secret};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Where the registrant is in the handshake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegistrationState {
    /// No active commitment
    Idle,
    /// Commitment submitted, waiting for reveal
    Committed {
        name: String,
        secret: Secret,
        digest: CommitmentHash,
    },
    /// Reveal broadcast, waiting to be mined
    Revealed { name: String },
}

/// Honest registrant
pub struct Registrant {
    account: AccountId,
    state: RegistrationState,
    /// Names obtained
    registered: u32,
    /// Value returned by soft aborts and overpayment
    total_refunded: u64,
    /// Value kept by the controller
    total_spent: u64,
}

impl Registrant {
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            state: RegistrationState::Idle,
            registered: 0,
            total_refunded: 0,
            total_spent: 0,
        }
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn stats(&self) -> (u32, u64, u64) {
        (self.registered, self.total_spent, self.total_refunded)
    }

    pub fn has_commitment(&self) -> bool {
        !matches!(self.state, RegistrationState::Idle)
    }

    /// Phase 1: build the commit call for `name`
    pub fn commit(&mut self, name: &str) -> Option<PendingCall> {
        if self.has_commitment() {
            debug!("Already has active commitment");
            return None;
        }

        let secret = generate_secret();
        let digest = make_commitment(name, &secret);
        self.state = RegistrationState::Committed {
            name: name.to_string(),
            secret,
            digest,
        };

        info!("Commitment prepared: digest={}", short_hex(digest.as_bytes()));
        Some(PendingCall::Commit {
            caller: self.account,
            digest,
        })
    }

    /// Phase 2: build the reveal once the commitment is old enough
    ///
    /// Attaches the quoted cost plus `overpay_bps` so refunds get exercised.
    pub fn reveal(
        &mut self,
        chain: &SimulatedChain,
        duration: u64,
        overpay_bps: u16,
    ) -> Option<PendingCall> {
        let (name, secret, digest) = match &self.state {
            RegistrationState::Committed {
                name,
                secret,
                digest,
            } => (name.clone(), *secret, *digest),
            _ => {
                debug!("No active commitment to reveal");
                return None;
            }
        };

        match chain.controller().commitment_status(&digest, chain.now()) {
            CommitmentStatus::Pending { ready_at, .. } if ready_at <= chain.now() => {}
            status => {
                debug!("Commitment not revealable yet: {:?}", status);
                return None;
            }
        }

        let cost = chain.controller().rent_price(&name, duration).ok()?;
        let buffer = u64::try_from(cost as u128 * overpay_bps as u128 / 10_000).ok()?;
        let value = cost.checked_add(buffer)?;

        self.state = RegistrationState::Revealed { name: name.clone() };
        Some(PendingCall::Register {
            caller: self.account,
            name,
            owner: self.account,
            duration,
            secret,
            value,
        })
    }

    /// Record the mined outcome and return to idle
    pub fn settle(&mut self, receipt: &CallReceipt) {
        match &receipt.result {
            CallResult::Registered { refund, .. } => {
                self.registered += 1;
                self.total_refunded += refund;
            }
            CallResult::Refunded { refund, .. } => {
                self.total_refunded += refund;
            }
            CallResult::Committed | CallResult::Rejected(_) => {}
        }
        self.total_spent += receipt.spent;
        self.state = RegistrationState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::state::CommitmentWindows;
    use crate::pricing::FixedRateOracle;
    use std::sync::Arc;

    fn chain() -> SimulatedChain {
        let oracle = Arc::new(FixedRateOracle::flat(AccountId::from_tag(9), 1));
        SimulatedChain::new(
            AccountId::from_tag(1),
            oracle,
            CommitmentWindows::default(),
            1_000_000,
            12,
        )
        .unwrap()
    }

    #[test]
    fn test_reveal_skipped_when_overpay_overflows() {
        let duration = CommitmentWindows::default().min_registration_duration;
        let oracle = Arc::new(FixedRateOracle::flat(
            AccountId::from_tag(9),
            u64::MAX / 2 / duration,
        ));
        let mut chain = SimulatedChain::new(
            AccountId::from_tag(1),
            oracle,
            CommitmentWindows::default(),
            1_000_000,
            12,
        )
        .unwrap();
        let mut registrant = Registrant::new(AccountId::from_tag(2));

        chain.submit(registrant.commit("expensive-name").unwrap());
        chain.mine();
        chain.advance(chain.controller().windows().min_commitment_age);

        // 655.35% on top of half of u64::MAX does not fit
        assert!(registrant.reveal(&chain, duration, u16::MAX).is_none());
        // Affordable overpay still works
        assert!(registrant.reveal(&chain, duration, 100).is_some());
    }

    #[test]
    fn test_commit_reveal_flow() {
        let mut chain = chain();
        let mut registrant = Registrant::new(AccountId::from_tag(2));
        chain.fund(registrant.account(), 10_000_000_000);
        let duration = chain.controller().windows().min_registration_duration;

        let commit = registrant.commit("registrant-name").unwrap();
        assert!(registrant.has_commitment());
        assert!(registrant.commit("another-name").is_none());
        chain.submit(commit);
        chain.mine();

        // Too early
        assert!(registrant.reveal(&chain, duration, 100).is_none());

        chain.advance(chain.controller().windows().min_commitment_age);
        let reveal = registrant.reveal(&chain, duration, 100).unwrap();
        chain.submit(reveal);
        let receipts = chain.mine();
        registrant.settle(&receipts[0]);

        let (registered, spent, refunded) = registrant.stats();
        assert_eq!(registered, 1);
        assert_eq!(spent, duration);
        assert_eq!(refunded, duration / 100);
        assert!(!registrant.has_commitment());
    }
}
