mod commands;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::affordability::{IncomeArgs, ObligationsArgs};
use commands::catalog::CatalogArgs;
use commands::quote::{CompareArgs, EligibilityArgs, InstallmentArgs, QuoteArgs};
use loan_quote_core::ProductCatalog;

/// Loan eligibility and installment quotes
#[derive(Parser)]
#[command(
    name = "lq",
    version,
    about = "Loan eligibility and installment quotes",
    long_about = "A CLI for quoting collateral-backed consumer loans with decimal precision. \
                  Resolves the eligibility ceiling from appraisal or income, prices flat-rate \
                  installments, compares terms, and checks debt-service ratios."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Product catalog file (JSON or YAML); built-in rates and terms otherwise
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Full quote: eligibility, clamped amount, installment and term comparison
    Quote(QuoteArgs),
    /// Maximum eligible loan amount
    Eligibility(EligibilityArgs),
    /// Flat-rate installment for one principal and term
    Installment(InstallmentArgs),
    /// Monthly payments across every allowed term of a product
    Compare(CompareArgs),
    /// Show product rates, income multipliers and terms
    Catalog(CatalogArgs),
    /// Summarise income and expense-based debt-service ratio
    Income(IncomeArgs),
    /// Debt-service ratio on existing loans plus a proposed installment
    Obligations(ObligationsArgs),
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

    let custom_catalog = match cli.catalog.as_deref().map(input::file::read_catalog).transpose() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    let default_catalog = ProductCatalog::default();
    let catalog = custom_catalog.as_ref().unwrap_or(&default_catalog);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Quote(args) => commands::quote::run_quote(args, custom_catalog.as_ref()),
        Commands::Eligibility(args) => commands::quote::run_eligibility(args, catalog),
        Commands::Installment(args) => commands::quote::run_installment(args, catalog),
        Commands::Compare(args) => commands::quote::run_compare(args, catalog),
        Commands::Catalog(args) => commands::catalog::run_catalog(args, catalog),
        Commands::Income(args) => commands::affordability::run_income(args),
        Commands::Obligations(args) => commands::affordability::run_obligations(args),
        Commands::Version => {
            println!("lq {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
