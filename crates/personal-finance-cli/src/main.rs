mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::savings::SavingsArgs;
use commands::schedule::{PaymentArgs, ScheduleArgs};
use commands::term::TermArgs;

/// Loan amortization, prepayment and savings projections
#[derive(Parser)]
#[command(
    name = "pfin",
    version,
    about = "Loan amortization, prepayment and savings projections",
    long_about = "A CLI for personal finance calculations with decimal precision. \
                  Builds amortization schedules with rate adjustments and lump-sum \
                  prepayments, compares prepayment scenarios, solves level payments \
                  and projects registered savings plans."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine decisions (rate changes, payoff) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a full amortization schedule
    Schedule(ScheduleArgs),
    /// Compare a schedule with and without its lump sums
    PrepaymentImpact(ScheduleArgs),
    /// Solve the level monthly payment for a loan
    Payment(PaymentArgs),
    /// Normalize a years + months term
    Term(TermArgs),
    /// Project a savings plan with contributions and grants
    Savings(SavingsArgs),
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
    logging::init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::PrepaymentImpact(args) => commands::schedule::run_prepayment_impact(args),
        Commands::Payment(args) => commands::schedule::run_payment(args),
        Commands::Term(args) => commands::term::run_term(args),
        Commands::Savings(args) => commands::savings::run_savings(args),
        Commands::Version => {
            println!("pfin {}", env!("CARGO_PKG_VERSION"));
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
