//! Front-Running Bot
//!
//! Watches the mempool for reveals. A reveal carries the plaintext name
//! (and secret), so the bot knows exactly what the victim wants and tries
//! to land its own registration first in the same block.

use crate::config::AttackStrategy;
use crate::controller::host::AccountId;
use crate::simulation::chain::{CallReceipt, CallResult, PendingCall, SimulatedChain};
use crate::utils::hash::{generate_secret, make_commitment, Secret};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of a front-running attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontRunResult {
    pub strategy: AttackStrategy,
    /// Name the bot went after
    pub name: String,
    /// Whether the bot ended up owning the name
    pub success: bool,
    /// Value the controller kept from the bot
    pub spent: u64,
    /// Why the bot's registration failed, if it did
    pub failure: Option<String>,
}

/// Reveal spotted in the mempool
#[derive(Debug, Clone)]
pub struct ObservedReveal {
    pub victim: AccountId,
    pub name: String,
    pub secret: Secret,
    pub duration: u64,
    pub value: u64,
}

pub struct FrontRunner {
    account: AccountId,
    strategy: AttackStrategy,
    total_spent: u64,
    successful_attacks: u32,
    failed_attacks: u32,
}

impl FrontRunner {
    pub fn new(account: AccountId, strategy: AttackStrategy) -> Self {
        info!("Front-runner initialized: {} ({:?})", account, strategy);
        Self {
            account,
            strategy,
            total_spent: 0,
            successful_attacks: 0,
            failed_attacks: 0,
        }
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    /// (spent, successes, failures)
    pub fn stats(&self) -> (u64, u32, u32) {
        (self.total_spent, self.successful_attacks, self.failed_attacks)
    }

    /// First reveal in the mempool that is not the bot's own
    pub fn scan(&self, mempool: &[PendingCall]) -> Option<ObservedReveal> {
        mempool.iter().find_map(|call| match call {
            PendingCall::Register {
                caller,
                name,
                duration,
                secret,
                value,
                ..
            } if *caller != self.account => Some(ObservedReveal {
                victim: *caller,
                name: name.clone(),
                secret: *secret,
                duration: *duration,
                value: *value,
            }),
            _ => None,
        })
    }

    /// Calls to insert ahead of the victim's reveal
    pub fn build_attack(&self, observed: &ObservedReveal, chain: &SimulatedChain) -> Vec<PendingCall> {
        // Outbid on the same payment the victim attached
        let value = chain
            .controller()
            .rent_price(&observed.name, observed.duration)
            .unwrap_or(observed.value)
            .max(observed.value);

        debug!(
            "Front-running {} for name {} with {:?}",
            observed.victim, observed.name, self.strategy
        );

        match self.strategy {
            AttackStrategy::FreshCommitment => {
                let secret = generate_secret();
                vec![
                    PendingCall::Commit {
                        caller: self.account,
                        digest: make_commitment(&observed.name, &secret),
                    },
                    PendingCall::Register {
                        caller: self.account,
                        name: observed.name.clone(),
                        owner: self.account,
                        duration: observed.duration,
                        secret,
                        value,
                    },
                ]
            }
            AttackStrategy::ReplayReveal => vec![PendingCall::Register {
                caller: self.account,
                name: observed.name.clone(),
                owner: self.account,
                duration: observed.duration,
                secret: observed.secret,
                value,
            }],
        }
    }

    /// Score the attack from the bot's own receipts and final ownership
    pub fn record(
        &mut self,
        name: &str,
        receipts: &[CallReceipt],
        owns_name: bool,
    ) -> FrontRunResult {
        let mine: Vec<&CallReceipt> = receipts
            .iter()
            .filter(|r| r.caller == self.account)
            .collect();
        let spent: u64 = mine.iter().map(|r| r.spent).sum();
        let failure = mine.iter().find_map(|r| match &r.result {
            CallResult::Rejected(reason) => Some(reason.clone()),
            CallResult::Refunded { reason, .. } => Some(format!("{:?}", reason)),
            _ => None,
        });

        self.total_spent += spent;
        if owns_name {
            self.successful_attacks += 1;
            info!("Front-run successful! Took {}", name);
        } else {
            self.failed_attacks += 1;
            debug!("Front-run failed for {}: {:?}", name, failure);
        }

        FrontRunResult {
            strategy: self.strategy,
            name: name.to_string(),
            success: owns_name,
            spent,
            failure,
        }
    }
}
