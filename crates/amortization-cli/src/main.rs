mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::process;

use amortization_core::AmortizationError;
use commands::schedule::{ChartArgs, ExportArgs, LoanArgs, RerunArgs};

/// Loan amortization schedules, charts and CSV export
#[derive(Parser)]
#[command(
    name = "amort",
    version,
    about = "Loan amortization schedules, charts and CSV export",
    long_about = "Computes a fixed-rate loan amortization schedule with optional one-time \
                  extra payments, summarises the payoff, builds cumulative chart series \
                  and exports the schedule as CSV. All math in decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full amortization schedule
    Schedule(LoanArgs),
    /// Monthly payment, total interest and payoff timing only
    Summary(LoanArgs),
    /// Cumulative principal/interest series for charting
    Chart(ChartArgs),
    /// Write the schedule to a CSV file
    Export(ExportArgs),
    /// Recompute using the one-time payments from an exported CSV
    Rerun(RerunArgs),
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

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("logger initialisation failed: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Summary(args) => commands::schedule::run_summary(args),
        Commands::Chart(args) => commands::schedule::run_chart(args),
        Commands::Export(args) => commands::schedule::run_export(args),
        Commands::Rerun(args) => commands::schedule::run_rerun(args),
        Commands::Version => {
            println!("amort {}", env!("CARGO_PKG_VERSION"));
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
            if let Some(err) = e.downcast_ref::<AmortizationError>() {
                eprintln!("{}", err.user_message().yellow());
            }
            process::exit(1);
        }
    }
}
