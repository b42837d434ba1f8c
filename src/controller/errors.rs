use crate::ledger::LedgerError;
use thiserror::Error;

/// Hard rejections. A call returning one of these changed nothing and
/// moved no funds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Re-commit to a digest whose previous commitment is still live
    #[error("Commitment already pending. Wait until it is older than the maximum commitment age.")]
    CommitmentAlreadyPending,

    /// Reveal attempted for a digest that was never committed or was consumed
    #[error("Commitment not found or already used.")]
    CommitmentNotFound,

    /// Reveal before the minimum commitment age elapsed
    #[error("Commitment too new. Reveal allowed at {ready_at}, now is {now}.")]
    CommitmentTooNew { ready_at: u64, now: u64 },

    #[error("Registration duration {duration}s is below the minimum of {minimum}s.")]
    DurationTooShort { duration: u64, minimum: u64 },

    #[error("Insufficient payment: {cost} required, {attached} attached.")]
    InsufficientPayment { cost: u64, attached: u64 },

    #[error("Price oracle could not quote this name and duration.")]
    PriceUnavailable,

    #[error("This operation does not accept payment.")]
    UnexpectedPayment,

    #[error("Caller is not the controller owner.")]
    Unauthorized,

    #[error("Invalid commitment windows: maximum age must exceed minimum age.")]
    InvalidWindows,

    #[error("Math overflow occurred.")]
    MathOverflow,

    #[error("Name ledger rejected the call: {0}")]
    Ledger(#[from] LedgerError),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
