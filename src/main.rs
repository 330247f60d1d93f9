use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use convergence_analyzer::{
    analysis::{
        analyze, calculate_milestones, generate_projection, required_growth_rate,
        years_to_convergence, Comparison, ScenarioEngine,
    },
    config::EngineConfig,
    io,
    visualization::{
        print_convergence_summary, print_implications_table, print_milestone_table,
        print_projection_table, print_scenario_table, print_sensitivity_table,
    },
};

#[derive(Parser)]
#[command(
    name = "convergence-analyzer",
    about = "Convergence Analyzer - When does a lagging economy catch up, and what does it take?",
    version,
    author
)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project convergence of two income levels under fixed growth rates
    Converge {
        /// Current value of the lagging entity
        #[arg(long)]
        chaser_value: f64,

        /// Current value of the leading entity
        #[arg(long)]
        target_value: f64,

        /// Annual growth rate of the chaser (e.g. 0.05)
        #[arg(long)]
        chaser_growth: f64,

        /// Annual growth rate of the target
        #[arg(long, default_value = "0.0")]
        target_growth: f64,

        /// First projection year
        #[arg(long, default_value = "2024")]
        start_year: i32,

        /// Maximum projection length in years (defaults to config)
        #[arg(long)]
        horizon: Option<u32>,

        /// Show every n-th projection year
        #[arg(long, default_value = "5")]
        step: usize,

        /// Emit JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Growth rate the chaser needs to catch the target within a number of years
    RequiredRate {
        #[arg(long)]
        chaser_value: f64,

        #[arg(long)]
        target_value: f64,

        /// Years allowed to close the gap
        #[arg(long)]
        years: f64,

        #[arg(long, default_value = "0.0")]
        target_growth: f64,
    },

    /// Compare two entities from a dataset file (CSV or JSON)
    Compare {
        /// Path to dataset file
        #[arg(short, long)]
        input: PathBuf,

        /// Id of the lagging entity
        #[arg(long)]
        chaser: String,

        /// Id of the leading entity
        #[arg(long)]
        target: String,

        /// Chaser growth rate (estimated from history when omitted)
        #[arg(long)]
        chaser_growth: Option<f64>,

        /// Target growth rate (estimated from history when omitted)
        #[arg(long)]
        target_growth: Option<f64>,

        #[arg(long, default_value = "5")]
        step: usize,

        #[arg(long)]
        json: bool,
    },

    /// Estimate energy, emissions and urbanization implications of catching up
    Implications {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        chaser: String,

        #[arg(long)]
        target: String,

        /// Scenario id (see `scenarios`)
        #[arg(short, long, default_value = "baseline")]
        scenario: String,

        /// Donor pool whose history forms the template path
        #[arg(short, long, default_value = "east_asian_tigers")]
        pool: String,

        /// Year to evaluate (defaults to the convergence year)
        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        chaser_growth: Option<f64>,

        #[arg(long)]
        target_growth: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// List the available scenarios
    Scenarios,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Converge {
            chaser_value,
            target_value,
            chaser_growth,
            target_growth,
            start_year,
            horizon,
            step,
            json,
        } => {
            if !(chaser_value > 0.0 && target_value > 0.0) {
                anyhow::bail!("Chaser and target values must be positive");
            }
            let convergence =
                years_to_convergence(chaser_value, target_value, chaser_growth, target_growth);
            let points = generate_projection(
                chaser_value,
                target_value,
                chaser_growth,
                target_growth,
                start_year,
                horizon.unwrap_or(config.horizon_cap_years),
            )
            .to_vec();
            let milestones = calculate_milestones(&points, &config.milestone_percentages);
            let sensitivity = analyze(
                chaser_value,
                target_value,
                chaser_growth,
                target_growth,
                start_year,
                config.sensitivity_delta,
            );

            if json {
                let report = json!({
                    "convergence": convergence,
                    "convergence_year": convergence.convergence_year(start_year),
                    "projection": points,
                    "milestones": milestones,
                    "sensitivity": sensitivity,
                });
                println!("{}", io::to_json_string(&report, true)?);
            } else {
                println!(
                    "\n{}",
                    format!("Time to converge: {convergence}").bold().cyan()
                );
                if let Some(year) = convergence.convergence_year(start_year) {
                    println!("  Convergence year: {year}");
                }
                print_projection_table(&points, step);
                print_milestone_table(&milestones);
                print_sensitivity_table(&sensitivity);
            }
        }

        Commands::RequiredRate {
            chaser_value,
            target_value,
            years,
            target_growth,
        } => match required_growth_rate(chaser_value, target_value, target_growth, years) {
            Some(rate) => println!(
                "{} {:.2}% per year to close the gap in {years} years",
                "Required growth:".green().bold(),
                rate * 100.0
            ),
            None => anyhow::bail!("No meaningful growth rate: values and years must be positive"),
        },

        Commands::Compare {
            input,
            chaser,
            target,
            chaser_growth,
            target_growth,
            step,
            json,
        } => {
            let dataset = io::read_dataset(&input)?;
            let comparison = Comparison::new(&dataset, &config, &chaser, &target)?;
            let growth = comparison.growth_assumptions(chaser_growth, target_growth)?;
            let summary = comparison.convergence(&growth)?;
            let points = comparison.projection(&growth, None)?.to_vec();
            let milestones = calculate_milestones(&points, &config.milestone_percentages);
            let sensitivity = comparison.sensitivity(&growth)?;

            if json {
                let report = json!({
                    "summary": summary,
                    "growth": growth,
                    "projection": points,
                    "milestones": milestones,
                    "sensitivity": sensitivity,
                });
                println!("{}", io::to_json_string(&report, true)?);
            } else {
                print_convergence_summary(&summary);
                print_projection_table(&points, step);
                print_milestone_table(&milestones);
                print_sensitivity_table(&sensitivity);
            }
        }

        Commands::Implications {
            input,
            chaser,
            target,
            scenario,
            pool,
            year,
            chaser_growth,
            target_growth,
            json,
        } => {
            let dataset = io::read_dataset(&input)?;

            // resolved once here; unknown ids fall back to baseline
            let resolved = ScenarioEngine::new(config.scenarios.clone())
                .resolve(&scenario)
                .clone();

            // scenario presets only fill in what the user left unset
            let mut config = config;
            if let Some(horizon) = resolved.presets.horizon_years {
                config.horizon_cap_years = horizon;
                config
                    .validate()
                    .with_context(|| format!("Invalid presets in scenario '{}'", resolved.id))?;
            }
            let chaser_growth = chaser_growth.or(resolved.presets.chaser_growth_rate);

            let comparison = Comparison::new(&dataset, &config, &chaser, &target)?;
            let growth = comparison.growth_assumptions(chaser_growth, target_growth)?;
            let report = comparison.implications(&growth, &resolved.id, &pool, year)?;

            if json {
                println!("{}", io::to_json_string(&report, true)?);
            } else {
                print_implications_table(&report);
            }
        }

        Commands::Scenarios => {
            print_scenario_table(&ScenarioEngine::new(config.scenarios.clone()));
        }
    }

    Ok(())
}
