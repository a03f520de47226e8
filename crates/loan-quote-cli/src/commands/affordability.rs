use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_quote_core::affordability::{self, IncomeInput, ObligationsInput};

use crate::input;

/// Arguments for the income summary
#[derive(Args)]
pub struct IncomeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Base monthly salary
    #[arg(long)]
    pub base_salary: Option<Decimal>,

    /// Other monthly income
    #[arg(long)]
    pub other_income: Option<Decimal>,

    /// Monthly expenses and debt payments
    #[arg(long)]
    pub expenses: Option<Decimal>,
}

/// Arguments for the debt-service assessment
#[derive(Args)]
pub struct ObligationsArgs {
    /// Path to JSON input file with existing loans
    #[arg(long)]
    pub input: Option<String>,

    /// Override the installment of the proposed loan
    #[arg(long)]
    pub proposed_installment: Option<Decimal>,

    /// Override the debt-service ceiling in percent
    #[arg(long)]
    pub max_dsr: Option<Decimal>,
}

pub fn run_income(args: IncomeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let income_input: IncomeInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        IncomeInput {
            base_salary: args
                .base_salary
                .ok_or("--base-salary is required (or provide --input)")?,
            other_income: args.other_income.unwrap_or(Decimal::ZERO),
            expenses: args.expenses.unwrap_or(Decimal::ZERO),
        }
    };

    let result = affordability::income_summary(&income_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_obligations(args: ObligationsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut obligations: ObligationsInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for obligations".into());
    };

    if args.proposed_installment.is_some() {
        obligations.proposed_installment = args.proposed_installment;
    }
    if args.max_dsr.is_some() {
        obligations.max_dsr_pct = args.max_dsr;
    }

    let result = affordability::assess_obligations(&obligations)?;
    Ok(serde_json::to_value(result)?)
}
