//! Simulation Orchestrator
//!
//! Runs every registration twice: once against a controller with no
//! reveal delay (unprotected) and once against the standard windows
//! (protected). Both scenarios see the same names, registrants and attack
//! decisions, so the difference is down to the commitment windows alone.

use crate::bots::{FrontRunResult, FrontRunner, Registrant};
use crate::config::SimulationConfig;
use crate::controller::host::AccountId;
use crate::controller::state::CommitmentWindows;
use crate::pricing::FixedRateOracle;
use crate::simulation::chain::{CallResult, SimulatedChain};
use crate::utils::hash::label_hash;
use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Unprotected,
    Protected,
}

/// Who holds the name once the reveal block is mined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameOwner {
    Victim,
    Attacker,
    Nobody,
}

/// One registration attempt in one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub id: u32,
    pub scenario: Scenario,
    pub name: String,
    pub attacked: bool,
    pub outcome: CallResult,
    pub winner: NameOwner,
    /// Value the controller kept from the victim
    pub victim_spent: u64,
    /// Seconds between the commit block and the reveal block
    pub reveal_delay: u64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackRecord {
    pub id: u32,
    pub scenario: Scenario,
    pub result: FrontRunResult,
}

/// Chain state after each registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStateRecord {
    pub id: u32,
    pub scenario: Scenario,
    pub controller_balance: u64,
    pub pending_commitments: usize,
    pub registered_names: usize,
}

/// Per-scenario totals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub registrations: u32,
    pub names_obtained: u32,
    pub attack_attempts: u32,
    pub names_stolen: u32,
    /// Stolen / attempted, in %
    pub theft_rate: f64,
    /// Victim value returned by soft aborts
    pub soft_abort_refunds: u64,
    pub victim_spent: u64,
    pub attacker_spent: u64,
    /// Amount the owner withdrew at the end
    pub controller_revenue: u64,
    pub stale_commitments_purged: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub total_registrations: u32,
    pub unprotected: ScenarioSummary,
    pub protected: ScenarioSummary,
    /// Share of unprotected thefts that the reveal delay prevented, in %
    pub protection_rate: f64,
}

/// Results of the complete simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResults {
    pub config: SimulationConfig,
    pub registrations: Vec<RegistrationRecord>,
    pub attacks: Vec<AttackRecord>,
    pub chain_history: Vec<ChainStateRecord>,
    pub summary: SimulationSummary,
}

/// One chain plus its actors
struct ScenarioRunner {
    scenario: Scenario,
    chain: SimulatedChain,
    registrants: Vec<Registrant>,
    attacker: FrontRunner,
    purged: usize,
}

impl ScenarioRunner {
    fn new(scenario: Scenario, config: &SimulationConfig, owner: AccountId) -> Result<Self> {
        let windows = match scenario {
            Scenario::Unprotected => CommitmentWindows::unprotected(),
            Scenario::Protected => CommitmentWindows::default(),
        };
        let oracle = Arc::new(FixedRateOracle::new(
            AccountId::random(),
            config.short_name_rate,
            config.long_name_rate,
        ));
        let mut chain = SimulatedChain::new(
            owner,
            oracle,
            windows,
            config.genesis_time,
            config.block_time,
        )
        .context("Failed to create simulated chain")?;

        let registrants: Vec<Registrant> = (0..config.num_registrants)
            .map(|_| Registrant::new(AccountId::random()))
            .collect();
        for registrant in &registrants {
            chain.fund(registrant.account(), config.registrant_funds);
        }

        let attacker = FrontRunner::new(AccountId::random(), config.attack_strategy);
        chain.fund(attacker.account(), config.attacker_funds);

        Ok(Self {
            scenario,
            chain,
            registrants,
            attacker,
            purged: 0,
        })
    }

    fn run_registration(
        &mut self,
        id: u32,
        name: &str,
        registrant_idx: usize,
        should_attack: bool,
        config: &SimulationConfig,
    ) -> Result<(RegistrationRecord, Option<AttackRecord>)> {
        let Self {
            scenario,
            chain,
            registrants,
            attacker,
            ..
        } = self;
        let registrant = &mut registrants[registrant_idx];

        // Phase 1: Commit
        let commit = registrant
            .commit(name)
            .context("Registrant already has an active commitment")?;
        chain.submit(commit);
        let committed_at = chain.now();
        chain.mine();

        // Wait out the reveal delay
        let delay = chain.controller().windows().min_commitment_age;
        chain.advance(delay);

        // Phase 2: Reveal, visible to the front-runner before it is mined
        let reveal = registrant
            .reveal(chain, config.registration_duration, config.overpay_bps)
            .context("Commitment not revealable after waiting")?;
        chain.submit(reveal);

        let observed = if should_attack {
            attacker.scan(chain.pending())
        } else {
            None
        };
        if let Some(observed) = &observed {
            let calls = attacker.build_attack(observed, chain);
            chain.submit_priority(calls);
        }

        let revealed_at = chain.now();
        let receipts = chain.mine();

        let victim_receipt = receipts
            .iter()
            .find(|r| r.caller == registrant.account())
            .context("Victim reveal missing from block")?;
        registrant.settle(victim_receipt);

        let winner = match chain.controller().ledger().owner_of(&label_hash(name)) {
            Some(owner) if owner == registrant.account() => NameOwner::Victim,
            Some(owner) if owner == attacker.account() => NameOwner::Attacker,
            _ => NameOwner::Nobody,
        };

        let attack = observed.map(|_| AttackRecord {
            id,
            scenario: *scenario,
            result: attacker.record(name, &receipts, winner == NameOwner::Attacker),
        });

        debug!("{:?} #{}: {} -> {:?}", scenario, id, name, winner);

        Ok((
            RegistrationRecord {
                id,
                scenario: *scenario,
                name: name.to_string(),
                attacked: attack.is_some(),
                outcome: victim_receipt.result.clone(),
                winner,
                victim_spent: victim_receipt.spent,
                reveal_delay: revealed_at - committed_at,
                timestamp: chrono::Utc::now().timestamp(),
            },
            attack,
        ))
    }

    fn state_record(&self, id: u32) -> ChainStateRecord {
        let controller = self.chain.controller();
        ChainStateRecord {
            id,
            scenario: self.scenario,
            controller_balance: controller.balance(),
            pending_commitments: controller.pending_commitments(),
            registered_names: controller.ledger().len(),
        }
    }
}

/// Main simulation orchestrator
pub struct Orchestrator {
    config: SimulationConfig,
    owner: AccountId,
    unprotected: ScenarioRunner,
    protected: ScenarioRunner,
}

impl Orchestrator {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let owner = AccountId::random();
        let unprotected = ScenarioRunner::new(Scenario::Unprotected, &config, owner)?;
        let protected = ScenarioRunner::new(Scenario::Protected, &config, owner)?;

        Ok(Self {
            config,
            owner,
            unprotected,
            protected,
        })
    }

    /// Run the complete simulation
    pub fn run(&mut self) -> Result<SimulationResults> {
        info!("Starting front-running simulation...");
        info!("Total registrations: {}", self.config.total_registrations);
        info!("Attack probability: {:.0}%", self.config.attack_probability * 100.0);
        info!("Attack strategy: {:?}", self.config.attack_strategy);

        let mut registrations = Vec::new();
        let mut attacks = Vec::new();
        let mut chain_history = Vec::new();
        let mut rng = rand::thread_rng();

        for i in 0..self.config.total_registrations {
            let name = random_name(&mut rng);
            let registrant_idx = rng.gen_range(0..self.config.num_registrants as usize);
            let should_attack = rng.gen::<f64>() < self.config.attack_probability;

            for runner in [&mut self.unprotected, &mut self.protected] {
                let (record, attack) =
                    runner.run_registration(i, &name, registrant_idx, should_attack, &self.config)?;
                registrations.push(record);
                attacks.extend(attack);
                chain_history.push(runner.state_record(i));

                if self.config.purge_interval > 0 && (i + 1) % self.config.purge_interval == 0 {
                    runner.purged += runner
                        .chain
                        .purge(self.owner)
                        .context("Failed to purge stale commitments")?;
                }
            }

            if (i + 1) % 100 == 0 || i == 0 {
                info!("Progress: {}/{} registrations", i + 1, self.config.total_registrations);
            }
        }

        let unprotected_revenue = self
            .unprotected
            .chain
            .withdraw(self.owner)
            .context("Owner withdraw failed")?;
        let protected_revenue = self
            .protected
            .chain
            .withdraw(self.owner)
            .context("Owner withdraw failed")?;

        for runner in [&self.unprotected, &self.protected] {
            let (spent, won, lost) = runner.attacker.stats();
            info!(
                "{:?} front-runner: {} won, {} lost, {} spent",
                runner.scenario, won, lost, spent
            );
        }

        let mut unprotected = summarize(Scenario::Unprotected, &registrations, &attacks);
        unprotected.controller_revenue = unprotected_revenue;
        unprotected.stale_commitments_purged = self.unprotected.purged;
        let mut protected = summarize(Scenario::Protected, &registrations, &attacks);
        protected.controller_revenue = protected_revenue;
        protected.stale_commitments_purged = self.protected.purged;

        let protection_rate = if unprotected.names_stolen > 0 {
            let prevented = unprotected.names_stolen.saturating_sub(protected.names_stolen);
            prevented as f64 / unprotected.names_stolen as f64 * 100.0
        } else {
            0.0
        };

        let summary = SimulationSummary {
            total_registrations: self.config.total_registrations,
            unprotected,
            protected,
            protection_rate,
        };

        info!("Simulation complete!");
        info!(
            "Names stolen: unprotected={}, protected={}",
            summary.unprotected.names_stolen, summary.protected.names_stolen
        );

        Ok(SimulationResults {
            config: self.config.clone(),
            registrations,
            attacks,
            chain_history,
            summary,
        })
    }
}

fn summarize(
    scenario: Scenario,
    registrations: &[RegistrationRecord],
    attacks: &[AttackRecord],
) -> ScenarioSummary {
    let records: Vec<&RegistrationRecord> =
        registrations.iter().filter(|r| r.scenario == scenario).collect();
    let attacks: Vec<&AttackRecord> = attacks.iter().filter(|a| a.scenario == scenario).collect();

    let attack_attempts = attacks.len() as u32;
    let names_stolen = attacks.iter().filter(|a| a.result.success).count() as u32;

    ScenarioSummary {
        registrations: records.len() as u32,
        names_obtained: records.iter().filter(|r| r.winner == NameOwner::Victim).count() as u32,
        attack_attempts,
        names_stolen,
        theft_rate: if attack_attempts > 0 {
            names_stolen as f64 / attack_attempts as f64 * 100.0
        } else {
            0.0
        },
        soft_abort_refunds: records
            .iter()
            .filter_map(|r| match r.outcome {
                CallResult::Refunded { refund, .. } => Some(refund),
                _ => None,
            })
            .sum(),
        victim_spent: records.iter().map(|r| r.victim_spent).sum(),
        attacker_spent: attacks.iter().map(|a| a.result.spent).sum(),
        controller_revenue: 0,
        stale_commitments_purged: 0,
    }
}

/// Random lowercase name of 7 to 14 characters
pub fn random_name(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(7..=14);
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AttackStrategy;

    fn config(strategy: AttackStrategy, attack_probability: f64) -> SimulationConfig {
        SimulationConfig {
            total_registrations: 10,
            attack_probability,
            attack_strategy: strategy,
            ..SimulationConfig::quick_test()
        }
    }

    #[test]
    fn test_fresh_commitment_only_beats_unprotected() {
        let mut orchestrator = Orchestrator::new(config(AttackStrategy::FreshCommitment, 1.0)).unwrap();
        let results = orchestrator.run().unwrap();
        let s = &results.summary;

        assert_eq!(results.registrations.len(), 20);
        assert_eq!(s.unprotected.attack_attempts, 10);
        assert_eq!(s.unprotected.names_stolen, 10);
        assert_eq!(s.protected.names_stolen, 0);
        assert_eq!(s.protected.names_obtained, 10);
        assert_eq!(s.protection_rate, 100.0);

        // Unprotected victims lost the race and were refunded in full
        assert!(results
            .registrations
            .iter()
            .filter(|r| r.scenario == Scenario::Unprotected)
            .all(|r| r.victim_spent == 0 && matches!(r.outcome, CallResult::Refunded { .. })));
    }

    #[test]
    fn test_replay_reveal_steals_in_both() {
        let mut orchestrator = Orchestrator::new(config(AttackStrategy::ReplayReveal, 1.0)).unwrap();
        let results = orchestrator.run().unwrap();

        // The digest does not bind the owner, so a copied reveal wins either way
        assert_eq!(results.summary.unprotected.names_stolen, 10);
        assert_eq!(results.summary.protected.names_stolen, 10);
    }

    #[test]
    fn test_no_attacks_everyone_registers() {
        let mut orchestrator = Orchestrator::new(config(AttackStrategy::FreshCommitment, 0.0)).unwrap();
        let results = orchestrator.run().unwrap();
        let s = &results.summary;

        assert_eq!(s.unprotected.names_obtained, 10);
        assert_eq!(s.protected.names_obtained, 10);
        assert_eq!(s.protected.controller_revenue, s.protected.victim_spent);
        assert!(results
            .registrations
            .iter()
            .filter(|r| r.scenario == Scenario::Protected)
            .all(|r| r.reveal_delay >= 3600));
    }

    #[test]
    fn test_random_name_is_valid() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let name = random_name(&mut rng);
            assert!((7..=14).contains(&name.len()));
        }
    }
}
