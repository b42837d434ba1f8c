//! Analytics modules for logging and report generation

pub mod logger;
pub mod metrics;
pub mod report;

pub use logger::{print_summary, SimulationLogger};
pub use metrics::MetricsCalculator;
pub use report::generate_report;
