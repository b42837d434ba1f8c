//! Simulation modules

pub mod chain;
pub mod orchestrator;

pub use chain::{CallReceipt, CallResult, PendingCall, SimulatedChain};
pub use orchestrator::{Orchestrator, Scenario, SimulationResults};
