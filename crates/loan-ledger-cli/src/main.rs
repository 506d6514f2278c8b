mod commands;
mod input;
mod output;
mod settings;
mod store;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::calculate::CalculateArgs;
use commands::format::FormatArgs;
use commands::ledger::LedgerArgs;
use commands::rates::RatesArgs;
use commands::words::WordsArgs;

/// Loan figure calculation and record keeping
#[derive(Parser)]
#[command(
    name = "loanc",
    version,
    about = "Loan figure calculation and record keeping",
    long_about = "Derives loan amount, principal, interest and insurance figures from \
                  a loan entry form with decimal precision, renders them in the \
                  house display layout, and keeps a ledger of calculated records."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Calculation settings file (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate a loan record from form fields
    Calculate(CalculateArgs),
    /// Convert an amount written in words to a number
    Words(WordsArgs),
    /// Look up insurance rates for a loan-to-value and term
    Rates(RatesArgs),
    /// Render a single value in the display layout
    Format(FormatArgs),
    /// Add, edit, delete, list and export stored loan records
    Ledger(LedgerArgs),
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
    let cli = Cli::parse();

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> =
        settings::load(cli.config.as_deref()).and_then(|config| match cli.command {
            Commands::Calculate(args) => commands::calculate::run_calculate(args, config),
            Commands::Words(args) => commands::words::run_words(args),
            Commands::Rates(args) => commands::rates::run_rates(args, config),
            Commands::Format(args) => commands::format::run_format(args),
            Commands::Ledger(args) => commands::ledger::run_ledger(args, config),
            Commands::Version => Ok(serde_json::json!({
                "version": format!("loanc {}", env!("CARGO_PKG_VERSION")),
            })),
        });

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
