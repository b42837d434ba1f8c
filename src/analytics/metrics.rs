//! Metrics calculation for simulation analysis

use crate::simulation::orchestrator::{NameOwner, Scenario};
use crate::simulation::{CallResult, SimulationResults};
use serde::{Deserialize, Serialize};

/// Calculator for simulation metrics
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Running count of names lost to the front-runner
    pub fn cumulative_thefts(results: &SimulationResults, scenario: Scenario) -> Vec<CumulativeDataPoint> {
        let mut stolen = 0u32;
        results
            .registrations
            .iter()
            .filter(|r| r.scenario == scenario)
            .map(|r| {
                if r.winner == NameOwner::Attacker {
                    stolen += 1;
                }
                CumulativeDataPoint {
                    registration: r.id,
                    value: stolen as f64,
                }
            })
            .collect()
    }

    /// Controller balance after each registration
    pub fn revenue_over_time(results: &SimulationResults, scenario: Scenario) -> Vec<CumulativeDataPoint> {
        results
            .chain_history
            .iter()
            .filter(|h| h.scenario == scenario)
            .map(|h| CumulativeDataPoint {
                registration: h.id,
                value: h.controller_balance as f64,
            })
            .collect()
    }

    /// How victim reveals ended, per scenario
    pub fn outcome_breakdown(results: &SimulationResults, scenario: Scenario) -> OutcomeBreakdown {
        let mut breakdown = OutcomeBreakdown::default();
        for record in results.registrations.iter().filter(|r| r.scenario == scenario) {
            match record.outcome {
                CallResult::Registered { .. } => breakdown.registered += 1,
                CallResult::Refunded { .. } => breakdown.refunded += 1,
                CallResult::Rejected(_) => breakdown.rejected += 1,
                CallResult::Committed => {}
            }
        }
        breakdown
    }

    /// Why the front-runner's attempts failed, most common first
    ///
    /// Reasons are grouped by their first sentence so per-call numbers
    /// do not split them.
    pub fn failure_reasons(results: &SimulationResults, scenario: Scenario) -> Vec<(String, u32)> {
        let mut counts: Vec<(String, u32)> = Vec::new();
        for attack in results.attacks.iter().filter(|a| a.scenario == scenario) {
            if let Some(reason) = &attack.result.failure {
                let key = reason.split('.').next().unwrap_or(reason);
                match counts.iter_mut().find(|(r, _)| r == key) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((key.to_string(), 1)),
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

/// Data point for cumulative charts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumulativeDataPoint {
    pub registration: u32,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeBreakdown {
    pub registered: u32,
    pub refunded: u32,
    pub rejected: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AttackStrategy, SimulationConfig};
    use crate::simulation::Orchestrator;

    #[test]
    fn test_metrics_match_summary() {
        let config = SimulationConfig {
            total_registrations: 8,
            attack_probability: 1.0,
            attack_strategy: AttackStrategy::FreshCommitment,
            ..SimulationConfig::quick_test()
        };
        let results = Orchestrator::new(config).unwrap().run().unwrap();

        let thefts = MetricsCalculator::cumulative_thefts(&results, Scenario::Unprotected);
        assert_eq!(thefts.len(), 8);
        assert_eq!(thefts.last().unwrap().value, 8.0);

        let protected = MetricsCalculator::outcome_breakdown(&results, Scenario::Protected);
        assert_eq!(protected, OutcomeBreakdown { registered: 8, refunded: 0, rejected: 0 });

        let unprotected = MetricsCalculator::outcome_breakdown(&results, Scenario::Unprotected);
        assert_eq!(unprotected.refunded, 8);

        let reasons = MetricsCalculator::failure_reasons(&results, Scenario::Protected);
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].1, 8);
        assert!(reasons[0].0.starts_with("Commitment too new"));
    }
}
