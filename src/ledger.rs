//! Name Ledger
//!
//! The authoritative label-hash → (owner, expiry) mapping. The controller
//! only reaches it through [`NameLedger`]; [`InMemoryLedger`] is the
//! reference implementation used by tests and the simulation.

use crate::controller::host::AccountId;
use crate::utils::hash::LabelHash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Time after expiry during which only the previous owner may renew
pub const GRACE_PERIOD: u64 = 90 * 24 * 60 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Name is not available for registration")]
    NameNotAvailable,

    #[error("Name is not registered or is past its grace period")]
    NameNotRenewable,

    #[error("Expiry overflow while extending registration")]
    ExpiryOverflow,
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Mutation and query surface the controller consumes
///
/// `Clone` lets the controller stage a copy for all-or-nothing calls.
pub trait NameLedger: Clone {
    /// True when the label can be registered at `now`
    fn available(&self, label: &LabelHash, now: u64) -> bool;

    /// Current expiry, 0 if never registered
    fn name_expires(&self, label: &LabelHash) -> u64;

    /// Assign the label to `owner` for `duration` seconds, returning the new expiry
    fn register(
        &mut self,
        label: LabelHash,
        owner: AccountId,
        duration: u64,
        now: u64,
    ) -> LedgerResult<u64>;

    /// Extend an existing registration, returning the new expiry
    fn renew(&mut self, label: LabelHash, duration: u64, now: u64) -> LedgerResult<u64>;
}

/// Ownership record for one label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    pub owner: AccountId,
    pub expires: u64,
}

/// HashMap-backed ledger
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    records: HashMap<LabelHash, NameRecord>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner of a label, if it has ever been registered
    pub fn owner_of(&self, label: &LabelHash) -> Option<AccountId> {
        self.records.get(label).map(|r| r.owner)
    }

    pub fn record(&self, label: &LabelHash) -> Option<&NameRecord> {
        self.records.get(label)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl NameLedger for InMemoryLedger {
    fn available(&self, label: &LabelHash, now: u64) -> bool {
        match self.records.get(label) {
            None => true,
            Some(record) => record.expires.saturating_add(GRACE_PERIOD) < now,
        }
    }

    fn name_expires(&self, label: &LabelHash) -> u64 {
        self.records.get(label).map(|r| r.expires).unwrap_or(0)
    }

    fn register(
        &mut self,
        label: LabelHash,
        owner: AccountId,
        duration: u64,
        now: u64,
    ) -> LedgerResult<u64> {
        if !self.available(&label, now) {
            return Err(LedgerError::NameNotAvailable);
        }

        let expires = now
            .checked_add(duration)
            .ok_or(LedgerError::ExpiryOverflow)?;
        // Expiry + grace must stay representable for the availability check
        expires
            .checked_add(GRACE_PERIOD)
            .ok_or(LedgerError::ExpiryOverflow)?;

        self.records.insert(label, NameRecord { owner, expires });
        debug!("Ledger: registered {} until {}", label, expires);
        Ok(expires)
    }

    fn renew(&mut self, label: LabelHash, duration: u64, now: u64) -> LedgerResult<u64> {
        let record = self
            .records
            .get_mut(&label)
            .ok_or(LedgerError::NameNotRenewable)?;

        if record.expires.saturating_add(GRACE_PERIOD) < now {
            return Err(LedgerError::NameNotRenewable);
        }

        let expires = record
            .expires
            .checked_add(duration)
            .ok_or(LedgerError::ExpiryOverflow)?;
        expires
            .checked_add(GRACE_PERIOD)
            .ok_or(LedgerError::ExpiryOverflow)?;

        record.expires = expires;
        debug!("Ledger: renewed {} until {}", label, expires);
        Ok(expires)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hash::label_hash;

    const DAY: u64 = 24 * 60 * 60;

    #[test]
    fn test_register_then_unavailable_until_grace_ends() {
        let mut ledger = InMemoryLedger::new();
        let label = label_hash("longname");
        let owner = AccountId::from_tag(1);

        assert!(ledger.available(&label, 1_000));
        let expires = ledger.register(label, owner, 365 * DAY, 1_000).unwrap();
        assert_eq!(expires, 1_000 + 365 * DAY);
        assert_eq!(ledger.owner_of(&label), Some(owner));

        assert!(!ledger.available(&label, expires));
        assert!(!ledger.available(&label, expires + GRACE_PERIOD));
        assert!(ledger.available(&label, expires + GRACE_PERIOD + 1));
    }

    #[test]
    fn test_double_register_rejected() {
        let mut ledger = InMemoryLedger::new();
        let label = label_hash("longname");
        ledger.register(label, AccountId::from_tag(1), 30 * DAY, 0).unwrap();

        let err = ledger
            .register(label, AccountId::from_tag(2), 30 * DAY, 10)
            .unwrap_err();
        assert_eq!(err, LedgerError::NameNotAvailable);
    }

    #[test]
    fn test_renew_extends_from_current_expiry() {
        let mut ledger = InMemoryLedger::new();
        let label = label_hash("longname");
        let expires = ledger.register(label, AccountId::from_tag(1), 30 * DAY, 0).unwrap();

        // Renewal inside the grace period still counts from the old expiry
        let renewed = ledger.renew(label, 30 * DAY, expires + DAY).unwrap();
        assert_eq!(renewed, expires + 30 * DAY);
        assert_eq!(ledger.name_expires(&label), renewed);
    }

    #[test]
    fn test_renew_unknown_or_lapsed_rejected() {
        let mut ledger = InMemoryLedger::new();
        let label = label_hash("longname");
        assert_eq!(
            ledger.renew(label, DAY, 0).unwrap_err(),
            LedgerError::NameNotRenewable
        );

        let expires = ledger.register(label, AccountId::from_tag(1), DAY, 0).unwrap();
        assert_eq!(
            ledger.renew(label, DAY, expires + GRACE_PERIOD + 1).unwrap_err(),
            LedgerError::NameNotRenewable
        );
    }

    #[test]
    fn test_expiry_overflow() {
        let mut ledger = InMemoryLedger::new();
        let label = label_hash("longname");
        assert_eq!(
            ledger
                .register(label, AccountId::from_tag(1), u64::MAX, 10)
                .unwrap_err(),
            LedgerError::ExpiryOverflow
        );
        assert!(ledger.is_empty());
    }
}
