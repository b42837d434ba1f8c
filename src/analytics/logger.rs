//! Structured logging for simulation results

use crate::simulation::SimulationResults;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Handles logging of simulation results to files
pub struct SimulationLogger {
    output_dir: PathBuf,
}

impl SimulationLogger {
    /// Create a new logger with the specified output directory
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.output_dir.join("logs")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir.join("reports")
    }

    /// Ensure output directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.logs_dir()).context("Failed to create logs directory")?;
        fs::create_dir_all(self.reports_dir()).context("Failed to create reports directory")?;
        Ok(())
    }

    /// Save simulation results to JSON file
    pub fn save_results(&self, results: &SimulationResults) -> Result<PathBuf> {
        self.ensure_dirs()?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let path = self.logs_dir().join(format!("simulation_{}.json", timestamp));

        let json = serde_json::to_string_pretty(results).context("Failed to serialize results")?;
        let mut file = File::create(&path).context("Failed to create log file")?;
        file.write_all(json.as_bytes()).context("Failed to write log file")?;

        info!("Results saved to: {}", path.display());
        Ok(path)
    }

    /// Load results from a JSON file
    pub fn load_results(path: &Path) -> Result<SimulationResults> {
        let contents = fs::read_to_string(path).context("Failed to read results file")?;
        serde_json::from_str(&contents).context("Failed to parse results file")
    }

    /// Save a summary text file
    pub fn save_summary(&self, results: &SimulationResults) -> Result<PathBuf> {
        self.ensure_dirs()?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let path = self.logs_dir().join(format!("summary_{}.txt", timestamp));

        let mut file = File::create(&path).context("Failed to create summary file")?;
        file.write_all(format_summary(results).as_bytes())
            .context("Failed to write summary file")?;

        info!("Summary saved to: {}", path.display());
        Ok(path)
    }
}

/// Format results as a text summary
pub fn format_summary(results: &SimulationResults) -> String {
    let s = &results.summary;
    let u = &s.unprotected;
    let p = &s.protected;

    format!(
        r#"
╔══════════════════════════════════════════════════════════════════╗
║            FRONT-RUNNING SIMULATION RESULTS                      ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  CONFIGURATION                                                   ║
║  ─────────────                                                   ║
║  Registrations:         {:>10}                                   ║
║  Attack Probability:    {:>10.1}%                                ║
║  Attack Strategy:       {:>10}                                   ║
║  Registration Period:   {:>10} days                              ║
║                                                                  ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  UNPROTECTED (no reveal delay)                                   ║
║  ─────────────────────────────                                   ║
║  Attack Attempts:       {:>10}                                   ║
║  Names Stolen:          {:>10}                                   ║
║  Theft Rate:            {:>10.1}%                                ║
║  Victim Refunds:        {:>10}                                   ║
║  Controller Revenue:    {:>10}                                   ║
║                                                                  ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  PROTECTED (commit-reveal, 1h minimum age)                       ║
║  ─────────────────────────────────────────                       ║
║  Attack Attempts:       {:>10}                                   ║
║  Names Stolen:          {:>10}                                   ║
║  Theft Rate:            {:>10.1}%                                ║
║  Names Obtained:        {:>10}                                   ║
║  Controller Revenue:    {:>10}                                   ║
║  Stale Purged:          {:>10}                                   ║
║                                                                  ║
║  ★ Protection Rate:     {:>10.1}%                                ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝

Generated: {}
"#,
        s.total_registrations,
        results.config.attack_probability * 100.0,
        format!("{:?}", results.config.attack_strategy),
        results.config.registration_duration / 86_400,
        u.attack_attempts,
        u.names_stolen,
        u.theft_rate,
        u.soft_abort_refunds,
        u.controller_revenue,
        p.attack_attempts,
        p.names_stolen,
        p.theft_rate,
        p.names_obtained,
        p.controller_revenue,
        p.stale_commitments_purged,
        s.protection_rate,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Print summary to terminal
pub fn print_summary(results: &SimulationResults) {
    println!("{}", format_summary(results));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::simulation::Orchestrator;

    fn small_results() -> SimulationResults {
        let config = SimulationConfig {
            total_registrations: 3,
            ..SimulationConfig::quick_test()
        };
        Orchestrator::new(config).unwrap().run().unwrap()
    }

    #[test]
    fn test_save_and_load_results() {
        let dir = tempfile::tempdir().unwrap();
        let logger = SimulationLogger::new(dir.path());
        let results = small_results();

        let path = logger.save_results(&results).unwrap();
        let loaded = SimulationLogger::load_results(&path).unwrap();

        assert_eq!(loaded.registrations.len(), results.registrations.len());
        assert_eq!(
            loaded.summary.protected.names_stolen,
            results.summary.protected.names_stolen
        );
    }

    #[test]
    fn test_summary_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let logger = SimulationLogger::new(dir.path());
        let path = logger.save_summary(&small_results()).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("FRONT-RUNNING SIMULATION RESULTS"));
    }
}
