//! Simulated Chain
//!
//! Hosts a controller the way an execution environment would: one clock
//! reading per block, account balances, a public mempool, and settlement
//! of attached value and refunds.

use crate::controller::errors::Result as ControllerResult;
use crate::controller::host::{AbortReason, AccountId, CallContext, RegisterOutcome};
use crate::controller::state::CommitmentWindows;
use crate::controller::RegistrarController;
use crate::ledger::InMemoryLedger;
use crate::pricing::PriceOracle;
use crate::utils::hash::{CommitmentHash, Secret};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A call waiting in the public mempool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingCall {
    Commit {
        caller: AccountId,
        digest: CommitmentHash,
    },
    Register {
        caller: AccountId,
        name: String,
        owner: AccountId,
        duration: u64,
        secret: Secret,
        value: u64,
    },
}

impl PendingCall {
    pub fn caller(&self) -> AccountId {
        match self {
            PendingCall::Commit { caller, .. } => *caller,
            PendingCall::Register { caller, .. } => *caller,
        }
    }
}

/// What happened to a mined call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallResult {
    Committed,
    Registered { cost: u64, refund: u64, expires: u64 },
    Refunded { reason: AbortReason, refund: u64 },
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReceipt {
    pub caller: AccountId,
    /// Value actually taken from the caller (attached minus refund)
    pub spent: u64,
    pub result: CallResult,
}

/// Snapshot of chain state after a block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub block: u64,
    pub timestamp: u64,
    pub controller_balance: u64,
    pub pending_commitments: usize,
    pub registered_names: usize,
    pub event: String,
}

pub struct SimulatedChain {
    controller: RegistrarController<InMemoryLedger>,
    now: u64,
    block: u64,
    block_time: u64,
    balances: HashMap<AccountId, u64>,
    mempool: Vec<PendingCall>,
    /// History of snapshots (for analysis)
    pub history: Vec<ChainSnapshot>,
}

impl SimulatedChain {
    pub fn new(
        owner: AccountId,
        oracle: Arc<dyn PriceOracle>,
        windows: CommitmentWindows,
        genesis_time: u64,
        block_time: u64,
    ) -> ControllerResult<Self> {
        let controller =
            RegistrarController::with_windows(owner, InMemoryLedger::new(), oracle, windows)?;
        let mut chain = Self {
            controller,
            now: genesis_time,
            block: 0,
            block_time,
            balances: HashMap::new(),
            mempool: Vec::new(),
            history: Vec::new(),
        };
        chain.snapshot("genesis");
        Ok(chain)
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn block(&self) -> u64 {
        self.block
    }

    pub fn controller(&self) -> &RegistrarController<InMemoryLedger> {
        &self.controller
    }

    pub fn fund(&mut self, account: AccountId, amount: u64) {
        *self.balances.entry(account).or_insert(0) += amount;
    }

    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Let `seconds` pass, rounded up to whole blocks
    pub fn advance(&mut self, seconds: u64) {
        let blocks = seconds.div_ceil(self.block_time).max(1);
        self.block += blocks;
        self.now += blocks * self.block_time;
    }

    /// Broadcast a call; it becomes visible to every observer
    pub fn submit(&mut self, call: PendingCall) {
        self.mempool.push(call);
    }

    /// Insert a call ahead of everything already pending
    pub fn submit_priority(&mut self, calls: Vec<PendingCall>) {
        let rest = std::mem::take(&mut self.mempool);
        self.mempool = calls;
        self.mempool.extend(rest);
    }

    pub fn pending(&self) -> &[PendingCall] {
        &self.mempool
    }

    /// Execute every pending call in order at the current clock, then
    /// move to the next block
    pub fn mine(&mut self) -> Vec<CallReceipt> {
        let calls = std::mem::take(&mut self.mempool);
        let receipts: Vec<CallReceipt> = calls.into_iter().map(|c| self.execute(c)).collect();
        self.snapshot(&format!("block with {} calls", receipts.len()));
        self.block += 1;
        self.now += self.block_time;
        receipts
    }

    fn execute(&mut self, call: PendingCall) -> CallReceipt {
        let now = self.now;
        match call {
            PendingCall::Commit { caller, digest } => {
                let result = match self.controller.commit(&CallContext::unpaid(caller, now), digest) {
                    Ok(()) => CallResult::Committed,
                    Err(e) => CallResult::Rejected(e.to_string()),
                };
                CallReceipt {
                    caller,
                    spent: 0,
                    result,
                }
            }
            PendingCall::Register {
                caller,
                name,
                owner,
                duration,
                secret,
                value,
            } => {
                if self.balance_of(&caller) < value {
                    return CallReceipt {
                        caller,
                        spent: 0,
                        result: CallResult::Rejected("insufficient funds".to_string()),
                    };
                }

                let ctx = CallContext::new(caller, value, now);
                match self.controller.register(&ctx, &name, owner, duration, &secret) {
                    Ok(outcome) => {
                        let spent = value - outcome.refund();
                        self.debit(caller, spent);
                        let result = match outcome {
                            RegisterOutcome::Registered {
                                expires,
                                cost,
                                refund,
                            } => CallResult::Registered {
                                cost,
                                refund,
                                expires,
                            },
                            RegisterOutcome::Refunded { reason, refund } => {
                                CallResult::Refunded { reason, refund }
                            }
                        };
                        CallReceipt {
                            caller,
                            spent,
                            result,
                        }
                    }
                    // Rolled back: attached value never left the caller
                    Err(e) => {
                        debug!("Register by {} rejected: {}", caller, e);
                        CallReceipt {
                            caller,
                            spent: 0,
                            result: CallResult::Rejected(e.to_string()),
                        }
                    }
                }
            }
        }
    }

    /// Purge stale commitments at the current clock
    pub fn purge(&mut self, caller: AccountId) -> ControllerResult<usize> {
        self.controller
            .purge_stale_commitments(&CallContext::unpaid(caller, self.now))
    }

    /// Owner sweeps collected funds into its account
    pub fn withdraw(&mut self, caller: AccountId) -> ControllerResult<u64> {
        let amount = self
            .controller
            .withdraw(&CallContext::unpaid(caller, self.now))?;
        self.fund(caller, amount);
        Ok(amount)
    }

    fn debit(&mut self, account: AccountId, amount: u64) {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance.saturating_sub(amount);
    }

    /// Record a snapshot
    pub fn snapshot(&mut self, event: &str) {
        self.history.push(ChainSnapshot {
            block: self.block,
            timestamp: self.now,
            controller_balance: self.controller.balance(),
            pending_commitments: self.controller.pending_commitments(),
            registered_names: self.controller.ledger().len(),
            event: event.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::FixedRateOracle;
    use crate::utils::hash::make_commitment;

    fn chain(windows: CommitmentWindows) -> SimulatedChain {
        let oracle = Arc::new(FixedRateOracle::flat(AccountId::from_tag(9), 1));
        SimulatedChain::new(AccountId::from_tag(1), oracle, windows, 1_000_000, 12).unwrap()
    }

    #[test]
    fn test_funds_conserved_across_registration() {
        let mut chain = chain(CommitmentWindows::default());
        let owner = AccountId::from_tag(1);
        let user = AccountId::from_tag(2);
        chain.fund(user, 100_000_000);

        let name = "conservation".to_string();
        let secret = [3u8; 32];
        chain.submit(PendingCall::Commit {
            caller: user,
            digest: make_commitment(&name, &secret),
        });
        chain.mine();
        chain.advance(chain.controller().windows().min_commitment_age);

        let duration = chain.controller().windows().min_registration_duration;
        chain.submit(PendingCall::Register {
            caller: user,
            name,
            owner: user,
            duration,
            secret,
            value: duration + 500,
        });
        let receipts = chain.mine();
        assert_eq!(receipts[0].spent, duration);
        assert!(matches!(receipts[0].result, CallResult::Registered { refund: 500, .. }));

        // genesis + two mined blocks
        assert_eq!(chain.history.len(), 3);
        assert!(chain.block() > 300);

        assert_eq!(chain.withdraw(owner).unwrap(), duration);
        assert_eq!(chain.balance_of(&user) + chain.balance_of(&owner), 100_000_000);
    }

    #[test]
    fn test_rejected_call_costs_nothing() {
        let mut chain = chain(CommitmentWindows::default());
        let user = AccountId::from_tag(2);
        chain.fund(user, 1_000);

        chain.submit(PendingCall::Register {
            caller: user,
            name: "nocommitment".to_string(),
            owner: user,
            duration: 1,
            secret: [0u8; 32],
            value: 1_000,
        });
        let receipts = chain.mine();
        assert!(matches!(receipts[0].result, CallResult::Rejected(_)));
        assert_eq!(chain.balance_of(&user), 1_000);
    }

    #[test]
    fn test_priority_calls_run_first() {
        let mut chain = chain(CommitmentWindows::default());
        let a = PendingCall::Commit {
            caller: AccountId::from_tag(2),
            digest: make_commitment("firstname", &[1u8; 32]),
        };
        let b = PendingCall::Commit {
            caller: AccountId::from_tag(3),
            digest: make_commitment("secondname", &[1u8; 32]),
        };
        chain.submit(a.clone());
        chain.submit_priority(vec![b.clone()]);
        assert_eq!(chain.pending(), &[b, a]);
    }
}
