use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;

use loan_quote_core::amortization::compute_installment;
use loan_quote_core::comparison::{comparison_bars, generate_comparison};
use loan_quote_core::eligibility::summarize_eligibility;
use loan_quote_core::quote::{self, QuoteRequest};
use loan_quote_core::{with_metadata, LoanQuoteInput, ProductCatalog, ProductType};

use crate::input;

/// Arguments for a full loan quote
#[derive(Args)]
pub struct QuoteArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Collateral product: car, motorcycle, truck, agricultural, land
    #[arg(long, default_value = "car")]
    pub product: ProductType,

    /// Collateral appraisal value
    #[arg(long)]
    pub appraisal: Option<Decimal>,

    /// Monthly income, used when no appraisal is given
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Requested loan amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,
}

/// Arguments for the eligibility ceiling alone
#[derive(Args)]
pub struct EligibilityArgs {
    #[arg(long, default_value = "car")]
    pub product: ProductType,

    #[arg(long)]
    pub appraisal: Option<Decimal>,

    #[arg(long)]
    pub income: Option<Decimal>,
}

/// Arguments for a single flat-rate installment
#[derive(Args)]
pub struct InstallmentArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Term in months
    #[arg(long)]
    pub term: u32,

    /// Annual flat rate (e.g. 0.2399); defaults to the product's catalog rate
    #[arg(long)]
    pub rate: Option<Decimal>,

    #[arg(long, default_value = "car")]
    pub product: ProductType,
}

/// Arguments for the term comparison chart
#[derive(Args)]
pub struct CompareArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    #[arg(long, default_value = "car")]
    pub product: ProductType,

    /// Term to highlight
    #[arg(long)]
    pub term: Option<u32>,
}

/// Currency figures are rounded up for display only.
fn display_amount(value: Decimal) -> Decimal {
    value.ceil()
}

pub fn run_quote(
    args: QuoteArgs,
    catalog: Option<&ProductCatalog>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let quote_input: LoanQuoteInput = if let Some(ref path) = args.input {
        LoanQuoteInput::from_json_value(input::file::read_json_value(path)?)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        LoanQuoteInput::from_json_value(data)?
    } else {
        LoanQuoteInput {
            product_type: args.product,
            appraisal_value: args.appraisal,
            monthly_income: args.income,
            requested_amount: args
                .amount
                .ok_or("--amount is required (or provide --input)")?,
            term_months: args.term.ok_or("--term is required (or provide --input)")?,
        }
    };

    let request = QuoteRequest {
        input: quote_input,
        catalog: catalog.cloned(),
    };
    let result = quote::run_quote(&request)?;

    let display = json!({
        "monthly_payment": display_amount(result.result.monthly_payment),
        "total_interest": display_amount(result.result.total_interest),
        "total_repayment": display_amount(result.result.total_repayment),
    });

    let mut value = serde_json::to_value(result)?;
    if let Some(map) = value.as_object_mut() {
        map.insert("display".into(), display);
    }
    Ok(value)
}

pub fn run_eligibility(
    args: EligibilityArgs,
    catalog: &ProductCatalog,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let summary = summarize_eligibility(args.product, args.appraisal, args.income, catalog);

    let output = with_metadata(
        "Eligibility ceiling: 90% LTV, else income multiple, else default; floored at the minimum loan",
        &json!({
            "product_type": args.product,
            "income_multiplier": catalog.eligibility_multiplier_for(args.product),
        }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        summary,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_installment(
    args: InstallmentArgs,
    catalog: &ProductCatalog,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let rate = match args.rate {
        Some(rate) => rate,
        None => catalog.rate_for(args.product)?,
    };
    if args.principal <= Decimal::ZERO || args.term == 0 {
        warnings.push("Principal or term is zero; payment reported as 0".to_string());
    }

    let installment = compute_installment(args.principal, args.term, rate);

    let output = with_metadata(
        "Flat-rate installment",
        &json!({
            "principal": args.principal,
            "term_months": args.term,
            "annual_interest_rate": rate,
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        installment,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_compare(
    args: CompareArgs,
    catalog: &ProductCatalog,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let rate = catalog.rate_for(args.product)?;
    let terms = catalog.allowed_terms_for(args.product);
    if let Some(term) = args.term {
        if !terms.contains(&term) {
            warnings.push(format!("{term} months is not offered for {}", args.product));
        }
    }

    let entries = generate_comparison(args.principal, rate, terms);
    let bars: Vec<Value> = comparison_bars(&entries, args.term)
        .into_iter()
        .map(|bar| {
            json!({
                "term_months": bar.term_months,
                "monthly_payment": bar.monthly_payment,
                "monthly_payment_display": display_amount(bar.monthly_payment),
                "relative_height": bar.relative_height,
                "is_selected": bar.is_selected,
            })
        })
        .collect();

    let output = with_metadata(
        "Flat-rate payment comparison across allowed terms",
        &json!({
            "product_type": args.product,
            "principal": args.principal,
            "annual_interest_rate": rate,
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        json!({ "bars": bars }),
    );
    Ok(serde_json::to_value(output)?)
}
