//! Commitment Controller
//!
//! Fixed-price name registration behind a two-phase commit-reveal
//! handshake:
//!
//! 1. `commit` stores an opaque digest of `(label_hash, secret)` with the
//!    current time. Observers learn nothing about the name.
//! 2. After `min_commitment_age` and before `max_commitment_age`,
//!    `register` reveals the name and secret, pays, and the name ledger
//!    records the new owner.
//!
//! Every mutating call runs against a staged copy of the controller state
//! and ledger; the copy replaces live state only if the call returns `Ok`.
//! A hard rejection therefore leaves no trace and moves no funds.

pub mod constants;
pub mod errors;
pub mod events;
pub mod host;
pub mod interface;
pub mod state;

use crate::ledger::NameLedger;
use crate::pricing::PriceOracle;
use crate::utils::hash::{self, label_hash, short_hex, CommitmentHash, Secret};
use constants::MIN_NAME_LENGTH;
use errors::{ControllerError, Result};
use events::ControllerEvent;
use host::{AbortReason, AccountId, CallContext, RegisterOutcome, RenewalReceipt};
use interface::InterfaceId;
use state::{CommitmentStatus, CommitmentWindows, ControllerState};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registrar controller over a name ledger `L`
#[derive(Debug)]
pub struct RegistrarController<L: NameLedger> {
    windows: CommitmentWindows,
    state: ControllerState,
    ledger: L,
    /// Published notifications, in call order
    events: Vec<ControllerEvent>,
}

impl<L: NameLedger> RegistrarController<L> {
    /// Controller with the standard commitment windows
    pub fn new(owner: AccountId, ledger: L, oracle: Arc<dyn PriceOracle>) -> Self {
        Self {
            windows: CommitmentWindows::default(),
            state: ControllerState::new(owner, oracle),
            ledger,
            events: Vec::new(),
        }
    }

    pub fn with_windows(
        owner: AccountId,
        ledger: L,
        oracle: Arc<dyn PriceOracle>,
        windows: CommitmentWindows,
    ) -> Result<Self> {
        windows.validate()?;
        Ok(Self {
            windows,
            ..Self::new(owner, ledger, oracle)
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// True iff the name is longer than six characters
    pub fn valid(name: &str) -> bool {
        name.chars().count() > MIN_NAME_LENGTH
    }

    /// Valid and free on the ledger at `now`
    pub fn available(&self, name: &str, now: u64) -> bool {
        is_available(&self.ledger, name, now)
    }

    /// Cost of `duration` seconds for `name` at its current expiry
    pub fn rent_price(&self, name: &str, duration: u64) -> Result<u64> {
        quote(&self.state, &self.ledger, name, duration)
    }

    pub fn make_commitment(name: &str, secret: &Secret) -> CommitmentHash {
        hash::make_commitment(name, secret)
    }

    pub fn supports_interface(id: InterfaceId) -> bool {
        interface::supports_interface(id)
    }

    /// Raw commit timestamp, 0 if absent
    pub fn commitment_timestamp(&self, digest: &CommitmentHash) -> u64 {
        self.state.commitment_timestamp(digest)
    }

    pub fn commitment_status(&self, digest: &CommitmentHash, now: u64) -> CommitmentStatus {
        match self.state.commitments.get(digest) {
            None => CommitmentStatus::Absent,
            Some(&ts) => {
                let expires_at = ts.saturating_add(self.windows.max_commitment_age);
                if now > expires_at {
                    CommitmentStatus::Stale
                } else {
                    CommitmentStatus::Pending {
                        ready_at: ts.saturating_add(self.windows.min_commitment_age),
                        expires_at,
                    }
                }
            }
        }
    }

    pub fn name_expires(&self, name: &str) -> u64 {
        self.ledger.name_expires(&label_hash(name))
    }

    pub fn owner(&self) -> AccountId {
        self.state.owner
    }

    pub fn price_oracle(&self) -> &Arc<dyn PriceOracle> {
        &self.state.oracle
    }

    pub fn balance(&self) -> u64 {
        self.state.balance
    }

    pub fn windows(&self) -> &CommitmentWindows {
        &self.windows
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn pending_commitments(&self) -> usize {
        self.state.commitments.len()
    }

    pub fn events(&self) -> &[ControllerEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Commit-reveal
    // ------------------------------------------------------------------

    /// Record `digest` at `ctx.now`
    ///
    /// Rejected while a previous commitment to the same digest is still
    /// inside its maximum age, so a pending commitment cannot be refreshed
    /// to restart its reveal delay.
    pub fn commit(&mut self, ctx: &CallContext, digest: CommitmentHash) -> Result<()> {
        let windows = self.windows;
        self.atomic(ctx, |state, _ledger| {
            reject_payment(ctx)?;

            if let Some(&ts) = state.commitments.get(&digest) {
                if ctx.now < ts.saturating_add(windows.max_commitment_age) {
                    debug!("Commit rejected: {} still pending", short_hex(digest.as_bytes()));
                    return Err(ControllerError::CommitmentAlreadyPending);
                }
            }

            state.commitments.insert(digest, ctx.now);
            info!(
                "Commitment created: digest={}, caller={}, at={}",
                short_hex(digest.as_bytes()),
                ctx.caller,
                ctx.now
            );
            Ok(())
        })
    }

    /// Reveal a commitment and register `name` to `owner`
    ///
    /// Hard-rejects when the commitment is missing or too new, the duration
    /// is too short, or the payment does not cover the cost. Returns
    /// [`RegisterOutcome::Refunded`] with the full attached value when the
    /// commitment has aged out or the name is no longer available.
    pub fn register(
        &mut self,
        ctx: &CallContext,
        name: &str,
        owner: AccountId,
        duration: u64,
        secret: &Secret,
    ) -> Result<RegisterOutcome> {
        let windows = self.windows;
        self.atomic(ctx, |state, ledger| {
            let digest = hash::make_commitment(name, secret);
            let ts = *state
                .commitments
                .get(&digest)
                .ok_or(ControllerError::CommitmentNotFound)?;

            // Step 1: Minimum reveal delay
            let ready_at = ts
                .checked_add(windows.min_commitment_age)
                .ok_or(ControllerError::MathOverflow)?;
            if ctx.now < ready_at {
                debug!("Reveal too early for {}: ready at {}", name, ready_at);
                return Err(ControllerError::CommitmentTooNew {
                    ready_at,
                    now: ctx.now,
                });
            }

            // Step 2: Soft aborts return everything attached
            let expires_at = ts
                .checked_add(windows.max_commitment_age)
                .ok_or(ControllerError::MathOverflow)?;
            if ctx.now > expires_at {
                debug!("Reveal for {} after commitment expiry, refunding {}", name, ctx.value);
                return Ok(RegisterOutcome::Refunded {
                    reason: AbortReason::CommitmentExpired,
                    refund: ctx.value,
                });
            }
            if !is_available(ledger, name, ctx.now) {
                debug!("{} unavailable at reveal, refunding {}", name, ctx.value);
                return Ok(RegisterOutcome::Refunded {
                    reason: AbortReason::NameUnavailable,
                    refund: ctx.value,
                });
            }

            // Step 3: Duration and payment, checked before the commitment is spent
            if duration < windows.min_registration_duration {
                return Err(ControllerError::DurationTooShort {
                    duration,
                    minimum: windows.min_registration_duration,
                });
            }
            let cost = quote(state, ledger, name, duration)?;
            if ctx.value < cost {
                return Err(ControllerError::InsufficientPayment {
                    cost,
                    attached: ctx.value,
                });
            }

            // Step 4: Consume and register
            state.commitments.remove(&digest);
            let label = label_hash(name);
            let expires = ledger.register(label, owner, duration, ctx.now)?;
            state.balance = state
                .balance
                .checked_add(cost)
                .ok_or(ControllerError::MathOverflow)?;

            state.emit(ControllerEvent::NameRegistered {
                name: name.to_string(),
                label,
                owner,
                cost,
                expires,
            });

            let refund = ctx.value - cost;
            info!(
                "Name registered: name={}, owner={}, cost={}, expires={}, refund={}",
                name, owner, cost, expires, refund
            );

            Ok(RegisterOutcome::Registered {
                expires,
                cost,
                refund,
            })
        })
    }

    /// Extend a registration; no commitment needed
    pub fn renew(&mut self, ctx: &CallContext, name: &str, duration: u64) -> Result<RenewalReceipt> {
        self.atomic(ctx, |state, ledger| {
            let cost = quote(state, ledger, name, duration)?;
            if ctx.value < cost {
                return Err(ControllerError::InsufficientPayment {
                    cost,
                    attached: ctx.value,
                });
            }

            let label = label_hash(name);
            let expires = ledger.renew(label, duration, ctx.now)?;
            state.balance = state
                .balance
                .checked_add(cost)
                .ok_or(ControllerError::MathOverflow)?;

            state.emit(ControllerEvent::NameRenewed {
                name: name.to_string(),
                label,
                cost,
                expires,
            });

            let refund = ctx.value - cost;
            info!("Name renewed: name={}, cost={}, expires={}", name, cost, expires);
            Ok(RenewalReceipt {
                expires,
                cost,
                refund,
            })
        })
    }

    /// Drop every commitment past its maximum age; returns how many went
    pub fn purge_stale_commitments(&mut self, ctx: &CallContext) -> Result<usize> {
        let max_age = self.windows.max_commitment_age;
        self.atomic(ctx, |state, _ledger| {
            reject_payment(ctx)?;
            let before = state.commitments.len();
            state
                .commitments
                .retain(|_, ts| ctx.now <= ts.saturating_add(max_age));
            let purged = before - state.commitments.len();
            if purged > 0 {
                info!("Purged {} stale commitments", purged);
            }
            Ok(purged)
        })
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    pub fn set_price_oracle(&mut self, ctx: &CallContext, oracle: Arc<dyn PriceOracle>) -> Result<()> {
        self.atomic(ctx, |state, _ledger| {
            reject_payment(ctx)?;
            state.require_owner(&ctx.caller).inspect_err(|_| {
                warn!("Unauthorized set_price_oracle from {}", ctx.caller);
            })?;

            let id = oracle.id();
            state.oracle = oracle;
            state.emit(ControllerEvent::NewPriceOracle { oracle: id });
            info!("Price oracle updated: {}", id);
            Ok(())
        })
    }

    /// Sweep the collected balance to the owner; returns the amount moved
    pub fn withdraw(&mut self, ctx: &CallContext) -> Result<u64> {
        self.atomic(ctx, |state, _ledger| {
            reject_payment(ctx)?;
            state.require_owner(&ctx.caller).inspect_err(|_| {
                warn!("Unauthorized withdraw from {}", ctx.caller);
            })?;

            let amount = std::mem::take(&mut state.balance);
            info!("Withdrawn {} to owner {}", amount, state.owner);
            Ok(amount)
        })
    }

    pub fn transfer_ownership(&mut self, ctx: &CallContext, new_owner: AccountId) -> Result<()> {
        self.atomic(ctx, |state, _ledger| {
            reject_payment(ctx)?;
            state.require_owner(&ctx.caller).inspect_err(|_| {
                warn!("Unauthorized transfer_ownership from {}", ctx.caller);
            })?;

            let previous = state.owner;
            state.owner = new_owner;
            state.emit(ControllerEvent::OwnershipTransferred {
                previous,
                new_owner,
            });
            info!("Ownership transferred: {} -> {}", previous, new_owner);
            Ok(())
        })
    }

    /// Run `op` against a staged copy, publishing it only on success
    fn atomic<T>(
        &mut self,
        ctx: &CallContext,
        op: impl FnOnce(&mut ControllerState, &mut L) -> Result<T>,
    ) -> Result<T> {
        let mut staged_state = self.state.clone();
        let mut staged_ledger = self.ledger.clone();
        staged_state.pending_events.clear();

        match op(&mut staged_state, &mut staged_ledger) {
            Ok(output) => {
                self.events.append(&mut staged_state.pending_events);
                self.state = staged_state;
                self.ledger = staged_ledger;
                Ok(output)
            }
            Err(err) => {
                debug!("Call from {} rolled back: {}", ctx.caller, err);
                Err(err)
            }
        }
    }
}

fn is_available<L: NameLedger>(ledger: &L, name: &str, now: u64) -> bool {
    RegistrarController::<L>::valid(name) && ledger.available(&label_hash(name), now)
}

fn quote<L: NameLedger>(state: &ControllerState, ledger: &L, name: &str, duration: u64) -> Result<u64> {
    let expires = ledger.name_expires(&label_hash(name));
    state
        .oracle
        .price(name, expires, duration)
        .ok_or(ControllerError::PriceUnavailable)
}

fn reject_payment(ctx: &CallContext) -> Result<()> {
    if ctx.value != 0 {
        return Err(ControllerError::UnexpectedPayment);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::constants::{MAX_COMMITMENT_AGE, MIN_COMMITMENT_AGE, MIN_REGISTRATION_DURATION};
    use crate::ledger::InMemoryLedger;
    use crate::pricing::FixedRateOracle;

    const START: u64 = 1_700_000_000;
    const NAME: &str = "commitreveal";
    const SECRET: Secret = [7u8; 32];

    fn setup() -> RegistrarController<InMemoryLedger> {
        let oracle = Arc::new(FixedRateOracle::flat(AccountId::from_tag(99), 1));
        RegistrarController::new(AccountId::from_tag(1), InMemoryLedger::new(), oracle)
    }

    #[test]
    fn test_valid_counts_characters() {
        assert!(!RegistrarController::<InMemoryLedger>::valid("sixchr"));
        assert!(RegistrarController::<InMemoryLedger>::valid("sevench"));
        // 7 characters, 21 bytes
        assert!(RegistrarController::<InMemoryLedger>::valid("日本語のドメイ"));
        // 6 characters, 18 bytes
        assert!(!RegistrarController::<InMemoryLedger>::valid("日本語ドメイ"));
    }

    #[test]
    fn test_commitment_status_lifecycle() {
        let mut controller = setup();
        let user = AccountId::from_tag(2);
        let digest = RegistrarController::<InMemoryLedger>::make_commitment(NAME, &SECRET);

        assert_eq!(controller.commitment_status(&digest, START), CommitmentStatus::Absent);
        controller.commit(&CallContext::unpaid(user, START), digest).unwrap();

        assert_eq!(
            controller.commitment_status(&digest, START),
            CommitmentStatus::Pending {
                ready_at: START + MIN_COMMITMENT_AGE,
                expires_at: START + MAX_COMMITMENT_AGE,
            }
        );
        assert_eq!(
            controller.commitment_status(&digest, START + MAX_COMMITMENT_AGE + 1),
            CommitmentStatus::Stale
        );
        assert_eq!(controller.commitment_timestamp(&digest), START);
    }

    #[test]
    fn test_recommit_allowed_at_last_pending_instant() {
        let mut controller = setup();
        let user = AccountId::from_tag(2);
        let digest = RegistrarController::<InMemoryLedger>::make_commitment(NAME, &SECRET);
        controller.commit(&CallContext::unpaid(user, START), digest).unwrap();

        let boundary = START + MAX_COMMITMENT_AGE;
        assert!(matches!(
            controller.commitment_status(&digest, boundary),
            CommitmentStatus::Pending { expires_at, .. } if expires_at == boundary
        ));
        controller.commit(&CallContext::unpaid(user, boundary), digest).unwrap();
        assert_eq!(controller.commitment_timestamp(&digest), boundary);
    }

    #[test]
    fn test_failed_payment_keeps_commitment() {
        let mut controller = setup();
        let user = AccountId::from_tag(2);
        let digest = RegistrarController::<InMemoryLedger>::make_commitment(NAME, &SECRET);
        controller.commit(&CallContext::unpaid(user, START), digest).unwrap();

        let reveal_at = START + MIN_COMMITMENT_AGE;
        let err = controller
            .register(
                &CallContext::new(user, 1, reveal_at),
                NAME,
                user,
                MIN_REGISTRATION_DURATION,
                &SECRET,
            )
            .unwrap_err();
        assert!(matches!(err, ControllerError::InsufficientPayment { .. }));

        let err = controller
            .register(
                &CallContext::new(user, u64::MAX, reveal_at),
                NAME,
                user,
                MIN_REGISTRATION_DURATION - 1,
                &SECRET,
            )
            .unwrap_err();
        assert!(matches!(err, ControllerError::DurationTooShort { .. }));

        // Both rejections rolled back; the commitment is still usable
        assert_eq!(controller.commitment_timestamp(&digest), START);
        let outcome = controller
            .register(
                &CallContext::new(user, MIN_REGISTRATION_DURATION, reveal_at),
                NAME,
                user,
                MIN_REGISTRATION_DURATION,
                &SECRET,
            )
            .unwrap();
        assert!(outcome.is_registered());
    }

    #[test]
    fn test_paid_admin_call_rejected() {
        let mut controller = setup();
        let owner = controller.owner();
        assert_eq!(
            controller.withdraw(&CallContext::new(owner, 5, START)).unwrap_err(),
            ControllerError::UnexpectedPayment
        );
    }

    #[test]
    fn test_invalid_windows() {
        let oracle = Arc::new(FixedRateOracle::flat(AccountId::from_tag(99), 1));
        let windows = CommitmentWindows {
            min_commitment_age: 10,
            max_commitment_age: 10,
            min_registration_duration: 0,
        };
        let err = RegistrarController::with_windows(
            AccountId::from_tag(1),
            InMemoryLedger::new(),
            oracle,
            windows,
        )
        .unwrap_err();
        assert_eq!(err, ControllerError::InvalidWindows);
    }
}
