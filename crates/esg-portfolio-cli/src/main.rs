mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::optimize::OptimizeArgs;
use commands::preferences::PreferencesArgs;

/// Preference-driven ESG portfolio allocation
#[derive(Parser)]
#[command(
    name = "esgp",
    version,
    about = "Preference-driven ESG portfolio allocation",
    long_about = "Builds a long-only portfolio that maximises expected return subject to \
                  budget, per-stock cap, return, volatility, ESG and beta constraints \
                  derived from four preference answers, and solves it as a linear programme."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve for the optimal allocation over a stock universe
    Optimize(OptimizeArgs),
    /// Show the preference tier table, or the targets for a set of answers
    Preferences(PreferencesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Optimize(args) => commands::optimize::run_optimize(args),
        Commands::Preferences(args) => commands::preferences::run_preferences(args),
        Commands::Version => {
            println!("esgp {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
