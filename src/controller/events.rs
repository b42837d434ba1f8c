//! Notifications emitted by successful controller calls

use crate::controller::host::AccountId;
use crate::utils::hash::LabelHash;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerEvent {
    NameRegistered {
        name: String,
        label: LabelHash,
        owner: AccountId,
        cost: u64,
        expires: u64,
    },
    NameRenewed {
        name: String,
        label: LabelHash,
        cost: u64,
        expires: u64,
    },
    NewPriceOracle {
        oracle: AccountId,
    },
    OwnershipTransferred {
        previous: AccountId,
        new_owner: AccountId,
    },
}
