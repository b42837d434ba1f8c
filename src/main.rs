//! Registrar Simulation CLI
//!
//! Command-line interface for the commit-reveal front-running simulation.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use name_commit_registrar::{
    analytics::{
        logger::{print_summary, SimulationLogger},
        report::generate_report,
    },
    config::{AttackStrategy, SimulationConfig},
    controller::{
        constants::{MAX_COMMITMENT_AGE, MIN_COMMITMENT_AGE, MIN_NAME_LENGTH, MIN_REGISTRATION_DURATION},
        interface::{commitment_controller_id, INTERFACE_META_ID},
    },
    ledger::GRACE_PERIOD,
    simulation::Orchestrator,
};

#[derive(Parser)]
#[command(name = "registrar-sim")]
#[command(version = "0.1.0")]
#[command(about = "Commit-reveal name registration front-running simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with simulation settings; flags override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation
    Run {
        /// Number of registrations to simulate
        #[arg(short, long)]
        registrations: Option<u32>,

        /// Probability of attack (0.0 - 1.0)
        #[arg(short, long)]
        attack_probability: Option<f64>,

        /// Front-running strategy
        #[arg(short, long, value_enum)]
        strategy: Option<AttackStrategy>,

        /// Output directory for results
        #[arg(short, long)]
        output: Option<String>,

        /// Skip HTML report generation
        #[arg(long)]
        no_report: bool,
    },

    /// Generate report from existing simulation results
    Report {
        /// Input JSON file with simulation results
        #[arg(short, long)]
        input: PathBuf,

        /// Output HTML file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show quick simulation stats without full run
    Quick {
        /// Number of registrations for quick test
        #[arg(short, long, default_value = "100")]
        registrations: u32,

        #[arg(short, long, value_enum)]
        strategy: Option<AttackStrategy>,
    },

    /// Print controller parameters
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let base = match &cli.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    match cli.command {
        Commands::Run {
            registrations,
            attack_probability,
            strategy,
            output,
            no_report,
        } => {
            let config = SimulationConfig {
                total_registrations: registrations.unwrap_or(base.total_registrations),
                attack_probability: attack_probability.unwrap_or(base.attack_probability),
                attack_strategy: strategy.unwrap_or(base.attack_strategy),
                output_dir: output.unwrap_or_else(|| base.output_dir.clone()),
                ..base
            };
            run_simulation(config, !no_report)?;
        }

        Commands::Report { input, output } => {
            generate_report_from_file(&input, output.as_deref())?;
        }

        Commands::Quick {
            registrations,
            strategy,
        } => {
            let config = SimulationConfig {
                total_registrations: registrations,
                attack_strategy: strategy.unwrap_or(base.attack_strategy),
                ..base
            };
            run_quick_simulation(config)?;
        }

        Commands::Info => {
            print_info();
        }
    }

    Ok(())
}

fn run_simulation(config: SimulationConfig, generate_html: bool) -> Result<()> {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║       Commit-Reveal Front-Running Simulation             ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    info!("Configuration:");
    info!("  Registrations:       {}", config.total_registrations);
    info!("  Attack Probability:  {:.0}%", config.attack_probability * 100.0);
    info!("  Strategy:            {:?}", config.attack_strategy);
    info!("  Duration:            {} days", config.registration_duration / 86_400);
    info!("  Overpay:             {:.2}%", config.overpay_bps as f64 / 100.0);
    println!();

    let output_dir = config.output_dir.clone();
    let mut orchestrator = Orchestrator::new(config)?;
    let results = orchestrator.run()?;

    print_summary(&results);

    let logger = SimulationLogger::new(&output_dir);
    let json_path = logger.save_results(&results)?;
    logger.save_summary(&results)?;

    if generate_html {
        let report_path = logger.reports_dir().join("report.html");
        generate_report(&results, &report_path)?;

        println!();
        println!("📊 Report generated: {}", report_path.display());
        println!("   Open in browser to view interactive charts");
    }

    println!();
    println!("📁 Results saved to: {}", json_path.display());
    println!();

    Ok(())
}

fn generate_report_from_file(input: &Path, output: Option<&Path>) -> Result<()> {
    info!("Loading results from: {}", input.display());

    let results = SimulationLogger::load_results(input)?;

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| SimulationLogger::new(&results.config.output_dir).reports_dir().join("report.html"));

    generate_report(&results, &output_path)?;

    println!("📊 Report generated: {}", output_path.display());

    Ok(())
}

fn run_quick_simulation(config: SimulationConfig) -> Result<()> {
    println!();
    println!("🚀 Running quick simulation ({} registrations)...", config.total_registrations);
    println!();

    let mut orchestrator = Orchestrator::new(config)?;
    let results = orchestrator.run()?;

    print_summary(&results);

    Ok(())
}

fn print_info() {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║       Registrar Controller - Info                        ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();
    println!("PARAMETERS:");
    println!("  Min commitment age:    {} s", MIN_COMMITMENT_AGE);
    println!("  Max commitment age:    {} s", MAX_COMMITMENT_AGE);
    println!("  Min registration:      {} days", MIN_REGISTRATION_DURATION / 86_400);
    println!("  Min name length:       {} characters", MIN_NAME_LENGTH + 1);
    println!("  Grace period:          {} days", GRACE_PERIOD / 86_400);
    println!();
    println!("INTERFACE IDS:");
    println!("  Introspection:         0x{}", hex::encode(INTERFACE_META_ID));
    println!("  Commitment controller: 0x{}", hex::encode(commitment_controller_id()));
    println!();
    println!("USAGE:");
    println!("  registrar-sim run --registrations 1000      # Run full simulation");
    println!("  registrar-sim run -s replay-reveal          # Copy the victim's reveal");
    println!("  registrar-sim quick                         # Quick 100 registration test");
    println!("  registrar-sim report -i results.json        # Generate report");
    println!();
}
