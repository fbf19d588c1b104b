mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::budget::BudgetArgs;
use commands::simulate::SimulateArgs;

/// Mortgage extra-payment strategy simulator
#[derive(Parser)]
#[command(
    name = "msim",
    version,
    about = "Mortgage extra-payment strategy simulator",
    long_about = "Projects a mortgage month by month against a bank-only baseline \
                  with decimal precision. Supports statement calibration, \
                  inflation-indexed loans, interest subsidies and recurring, \
                  seasonal, one-time and escalating extra payments."
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
    /// Simulate baseline vs strategy amortization
    Simulate(SimulateArgs),
    /// Recommend a monthly extra payment from a household budget
    Budget(BudgetArgs),
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
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Budget(args) => commands::budget::run_budget(args),
        Commands::Version => {
            println!("msim {}", env!("CARGO_PKG_VERSION"));
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
