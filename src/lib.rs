//! Commit-Reveal Name Registrar
//!
//! A fixed-price name registration controller that defends against
//! front-running with a two-phase commit-reveal handshake, plus a
//! simulation framework that races a front-runner against registrants
//! with and without the reveal delay.

pub mod analytics;
pub mod bots;
pub mod config;
pub mod controller;
pub mod ledger;
pub mod pricing;
pub mod simulation;
pub mod utils;

pub use analytics::report::generate_report;
pub use config::{AttackStrategy, SimulationConfig};
pub use controller::errors::ControllerError;
pub use controller::host::{AccountId, CallContext, RegisterOutcome};
pub use controller::RegistrarController;
pub use ledger::{InMemoryLedger, NameLedger};
pub use pricing::{FixedRateOracle, PriceOracle};
pub use simulation::orchestrator::Orchestrator;
