//! Simulation configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the front-runner tries to take a name it sees in a pending reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AttackStrategy {
    /// Commit its own digest for the revealed name and register immediately
    FreshCommitment,
    /// Resubmit the victim's reveal with itself as owner
    ReplayReveal,
}

/// Main simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Total number of registrations to simulate
    pub total_registrations: u32,

    /// Probability that the front-runner goes after a visible reveal (0.0 - 1.0)
    pub attack_probability: f64,

    pub attack_strategy: AttackStrategy,

    /// Registration period requested by every registrant, in seconds
    pub registration_duration: u64,

    /// Rent per second for names of 7 to 9 characters
    pub short_name_rate: u64,

    /// Rent per second for names of 10+ characters
    pub long_name_rate: u64,

    /// Extra payment attached on top of the quoted cost, in basis points
    pub overpay_bps: u16,

    /// Number of registrant wallets
    pub num_registrants: u32,

    /// Starting funds per registrant
    pub registrant_funds: u64,

    /// Starting funds of the front-runner
    pub attacker_funds: u64,

    /// Seconds between blocks
    pub block_time: u64,

    /// Clock reading at genesis
    pub genesis_time: u64,

    /// Purge stale commitments every this many registrations (0 disables)
    pub purge_interval: u32,

    /// Output directory for logs and reports
    pub output_dir: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_registrations: 1000,
            attack_probability: 0.8,
            attack_strategy: AttackStrategy::FreshCommitment,
            registration_duration: 365 * 24 * 60 * 60, // 1 year
            short_name_rate: 5,
            long_name_rate: 1,
            overpay_bps: 500, // 5%
            num_registrants: 10,
            registrant_funds: 1_000_000_000_000,
            attacker_funds: 1_000_000_000_000,
            block_time: 12,
            genesis_time: 1_700_000_000,
            purge_interval: 100,
            output_dir: "output".to_string(),
        }
    }
}

impl SimulationConfig {
    /// Create config for a quick test run
    pub fn quick_test() -> Self {
        Self {
            total_registrations: 100,
            ..Default::default()
        }
    }

    /// Load a TOML file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.attack_probability),
            "attack_probability must be within 0.0 - 1.0"
        );
        anyhow::ensure!(self.num_registrants > 0, "num_registrants must be positive");
        anyhow::ensure!(self.block_time > 0, "block_time must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "total_registrations = 25\nattack_strategy = \"replay_reveal\"\noverpay_bps = 0"
        )
        .unwrap();

        let config = SimulationConfig::load(file.path()).unwrap();
        assert_eq!(config.total_registrations, 25);
        assert_eq!(config.attack_strategy, AttackStrategy::ReplayReveal);
        assert_eq!(config.overpay_bps, 0);
        assert_eq!(config.num_registrants, SimulationConfig::default().num_registrants);
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "attack_probability = 1.5").unwrap();
        assert!(SimulationConfig::load(file.path()).is_err());
    }
}
