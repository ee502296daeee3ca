//! Warpfleet command-line tools.
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario for ten turns
//! cargo run -p warpfleet_tools -- run scenarios/border_skirmish.ron --turns 10
//!
//! # Show the route between two hexes
//! cargo run -p warpfleet_tools -- path scenarios/border_skirmish.ron --from 0,0 --to 41,2
//!
//! # Project every fleet's next few turns
//! cargo run -p warpfleet_tools -- preview scenarios/border_skirmish.ron --turns 5
//!
//! # Check every scenario in a directory
//! cargo run -p warpfleet_tools -- validate scenarios
//! ```
//!
//! Logs go to stderr; `--json` output goes to stdout.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warpfleet_core::scenario::{Scenario, ScenarioData};
use warpfleet_tools::runner::{parse_hex, preview, route, run_scenario};
use warpfleet_tools::validate::validate_path;
use warpfleet_tools::{ToolError, ToolResult};

#[derive(Parser)]
#[command(name = "warpfleet")]
#[command(about = "Scenario runner and route inspector for the warpfleet core")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and summarize each turn
    Run {
        /// Scenario file
        scenario: PathBuf,

        /// Number of turns to process
        #[arg(short, long, default_value = "10")]
        turns: u64,

        /// Print the full summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show the route between two hexes
    Path {
        /// Scenario file providing the galaxy
        scenario: PathBuf,

        /// Start hex as q,r
        #[arg(long, allow_hyphen_values = true)]
        from: String,

        /// End hex as q,r
        #[arg(long, allow_hyphen_values = true)]
        to: String,
    },

    /// Project every fleet's movement without advancing the game
    Preview {
        /// Scenario file
        scenario: PathBuf,

        /// Turns to project
        #[arg(short, long, default_value = "5")]
        turns: u32,
    },

    /// Validate scenario files
    Validate {
        /// Scenario file or directory
        #[arg(default_value = "scenarios")]
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let default_level = tracing_subscriber::filter::LevelFilter::from_level(log_level);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .init();

    let result = match cli.command {
        Commands::Run {
            scenario,
            turns,
            json,
        } => cmd_run(&scenario, turns, json),
        Commands::Path { scenario, from, to } => cmd_path(&scenario, &from, &to),
        Commands::Preview { scenario, turns } => cmd_preview(&scenario, turns),
        Commands::Validate { path } => cmd_validate(&path),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn load(path: &Path) -> ToolResult<Scenario> {
    let scenario = ScenarioData::load(path)?.build()?;
    tracing::info!(
        "Loaded '{}': {} systems, {} fleets",
        scenario.name,
        scenario.state.galaxy.len(),
        scenario.state.fleets.len()
    );
    Ok(scenario)
}

fn cmd_run(path: &Path, turns: u64, json: bool) -> ToolResult<()> {
    let scenario = load(path)?;
    let summary = run_scenario(&scenario, turns);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} after {} turns ({} combats, hash {:016x})",
        summary.scenario,
        summary.turns,
        summary.combat_count(),
        summary.final_hash
    );
    for fleet in &summary.fleets {
        println!(
            "  {:<20} empire#{:<3} at {:<12} {} orders left",
            fleet.name,
            fleet.owner,
            fleet.location.to_string(),
            fleet.orders_left
        );
    }
    Ok(())
}

fn cmd_path(path: &Path, from: &str, to: &str) -> ToolResult<()> {
    let scenario = load(path)?;
    let (from, to) = (parse_hex(from)?, parse_hex(to)?);

    match route(&scenario, from, to) {
        Some(summary) => {
            println!(
                "{} hexes, {} warp jumps",
                summary.hexes.len().saturating_sub(1),
                summary.warp_jumps
            );
            let hexes: Vec<String> = summary.hexes.iter().map(ToString::to_string).collect();
            println!("{}", hexes.join(" -> "));
        }
        None => println!("No route from {from} to {to}"),
    }
    Ok(())
}

fn cmd_preview(path: &Path, turns: u32) -> ToolResult<()> {
    let scenario = load(path)?;

    for fleet in preview(&scenario, turns) {
        let Some(last) = fleet.steps.last() else {
            println!("{:<20} holding", fleet.name);
            continue;
        };
        let jumps = fleet.steps.iter().filter(|s| s.warp_jump).count();
        println!(
            "{:<20} {} steps, {} warp jumps, at {} by turn {}",
            fleet.name,
            fleet.steps.len(),
            jumps,
            last.hex,
            last.turn + 1
        );
    }
    Ok(())
}

fn cmd_validate(path: &Path) -> ToolResult<()> {
    tracing::info!("Validating scenarios in: {}", path.display());

    let mut failures = 0;
    for (file, result) in validate_path(path)? {
        match result {
            Ok(summary) => tracing::info!(
                "{}: '{}' ok ({} systems, {} empires, {} fleets)",
                file.display(),
                summary.name,
                summary.systems,
                summary.empires,
                summary.fleets
            ),
            Err(e) => {
                failures += 1;
                tracing::error!("{}: {e}", file.display());
            }
        }
    }

    if failures > 0 {
        return Err(ToolError::ValidationFailed(failures));
    }
    tracing::info!("Validation passed");
    Ok(())
}
