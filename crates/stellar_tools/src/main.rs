//! Stellar Dominion - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use stellar_tools::{tables, validate, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stellar-tools")]
#[command(about = "Development tools for Stellar Dominion")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a game config file
    Validate {
        /// Path to the RON config
        #[arg(default_value = "assets/config/default.ron")]
        path: PathBuf,
    },
    /// Print cost, build time and energy per level of a structure
    Structure {
        /// Structure type key
        structure: String,
        /// First level
        #[arg(long, default_value_t = 1)]
        from: u32,
        /// Last level
        #[arg(long, default_value_t = 20)]
        to: u32,
        /// Path to the RON config
        #[arg(long, default_value = "assets/config/default.ron")]
        config: PathBuf,
    },
    /// Compute travel time for a convoy
    Travel {
        /// Ships as type=count,type=count
        ships: String,
        /// Origin as galaxy:x:y
        from: String,
        /// Destination as galaxy:x:y
        to: String,
        /// Path to the RON config
        #[arg(long, default_value = "assets/config/default.ron")]
        config: PathBuf,
    },
    /// Print the reputation curve, or the level of a point total
    Reputation {
        /// Highest level to print
        #[arg(long, default_value_t = 20)]
        levels: u32,
        /// Point total to look up instead
        #[arg(long, allow_hyphen_values = true)]
        points: Option<i64>,
    },
}

fn emit<T: Serialize + std::fmt::Debug>(json: bool, value: &T) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value:#?}");
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating game config: {}", path.display());
            let report = validate::validate_config_file(&path)?;
            tracing::info!("Validation passed");
            emit(cli.json, &report)
        }
        Commands::Structure {
            structure,
            from,
            to,
            config,
        } => {
            let config = validate::load_config(&config)?;
            let rows = tables::structure_table(&config, &structure, from, to)?;
            if cli.json {
                return emit(true, &rows);
            }
            println!(
                "{:>5} {:>12} {:>10} {:>10} {:>10}",
                "level", "metal", "seconds", "energy-", "energy+"
            );
            for row in rows {
                println!(
                    "{:>5} {:>12} {:>10} {:>10.1} {:>10.1}",
                    row.level,
                    row.metal_cost,
                    row.build_seconds,
                    row.energy_consumption,
                    row.energy_production
                );
            }
            Ok(())
        }
        Commands::Travel {
            ships,
            from,
            to,
            config,
        } => {
            let config = validate::load_config(&config)?;
            let ships = tables::parse_manifest(&ships)?;
            let from = tables::parse_position(&from)?;
            let to = tables::parse_position(&to)?;
            let estimate = tables::travel_estimate(&config, &ships, from, to)?;
            emit(cli.json, &estimate)
        }
        Commands::Reputation { levels, points } => match points {
            Some(points) => {
                let level = tables::reputation_level(points);
                if cli.json {
                    emit(true, &serde_json::json!({ "points": points, "level": level }))
                } else {
                    println!("{points} points -> level {level}");
                    Ok(())
                }
            }
            None => {
                let rows = tables::reputation_table(levels);
                if cli.json {
                    return emit(true, &rows);
                }
                for row in rows {
                    println!("{:>4} {:>14}", row.level, row.points);
                }
                Ok(())
            }
        },
    }
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
