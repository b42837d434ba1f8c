//! Price Function
//!
//! Pure cost calculator consumed by the controller. [`FixedRateOracle`]
//! charges a per-second rent that depends only on the name's length.

use crate::controller::host::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Cost of holding `name` for `duration` seconds given its current `expires`
pub trait PriceOracle: Debug + Send + Sync {
    /// Identity reported in oracle-change notifications
    fn id(&self) -> AccountId;

    /// Returns `None` if the cost is not representable
    fn price(&self, name: &str, expires: u64, duration: u64) -> Option<u64>;
}

/// Per-second rent by character length
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedRateOracle {
    id: AccountId,
    /// Rent per second for names of 7 to 9 characters
    pub short_rate: u64,
    /// Rent per second for names of 10 or more characters
    pub long_rate: u64,
}

impl FixedRateOracle {
    /// Length at which the cheaper tier starts
    pub const LONG_NAME_LENGTH: usize = 10;

    pub fn new(id: AccountId, short_rate: u64, long_rate: u64) -> Self {
        Self {
            id,
            short_rate,
            long_rate,
        }
    }

    /// Same rate for every length
    pub fn flat(id: AccountId, rate: u64) -> Self {
        Self::new(id, rate, rate)
    }

    fn rate_for(&self, name: &str) -> u64 {
        if name.chars().count() >= Self::LONG_NAME_LENGTH {
            self.long_rate
        } else {
            self.short_rate
        }
    }
}

impl PriceOracle for FixedRateOracle {
    fn id(&self) -> AccountId {
        self.id
    }

    fn price(&self, name: &str, _expires: u64, duration: u64) -> Option<u64> {
        self.rate_for(name).checked_mul(duration)
    }
}
