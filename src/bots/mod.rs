//! Bot implementations for the front-running simulation

pub mod front_runner;
pub mod registrant;

pub use front_runner::{FrontRunResult, FrontRunner, ObservedReveal};
pub use registrant::{Registrant, RegistrationState};
