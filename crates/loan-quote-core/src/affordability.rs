use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::{LoanQuoteError, LoanQuoteResult, types::*};

/// Debt-service ratio above which a borrower is flagged, in percent.
pub const DEFAULT_MAX_DSR_PCT: Decimal = dec!(70);

const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Monthly income and expense declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeInput {
    pub base_salary: Money,
    #[serde(default)]
    pub other_income: Money,
    /// Recurring monthly debt payments and expenses.
    #[serde(default)]
    pub expenses: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSummary {
    pub total_income: Money,
    pub net_income: Money,
    /// Expenses as a percentage of total income; zero without income.
    pub debt_service_ratio_pct: Decimal,
}

/// A loan the borrower is already servicing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingLoan {
    pub loan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub outstanding_balance: Money,
    pub monthly_installment: Money,
    /// Principal plus interest over the full contract.
    pub contracted_total: Money,
    pub total_months: Months,
    pub paid_months: Months,
}

impl ExistingLoan {
    pub fn remaining_months(&self) -> Months {
        self.total_months.saturating_sub(self.paid_months)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObligationsInput {
    pub monthly_income: Money,
    #[serde(default)]
    pub existing_loans: Vec<ExistingLoan>,
    /// Installment of the loan being applied for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_installment: Option<Money>,
    /// Ceiling in percent; defaults to 70.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_dsr_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObligationsSummary {
    pub loan_count: usize,
    pub total_outstanding_balance: Money,
    pub total_monthly_installment: Money,
    pub total_contracted_amount: Money,
    pub current_dsr_pct: Decimal,
    pub projected_dsr_pct: Decimal,
    pub max_dsr_pct: Decimal,
    /// Installment headroom under the ceiling before the proposed loan.
    pub installment_capacity: Money,
    pub within_limit: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Total and net income with the expense-based debt-service ratio.
pub fn income_summary(input: &IncomeInput) -> LoanQuoteResult<ComputationOutput<IncomeSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    for (field, value) in [
        ("base_salary", input.base_salary),
        ("other_income", input.other_income),
        ("expenses", input.expenses),
    ] {
        check_amount(field, value)?;
    }

    let total_income = input.base_salary + input.other_income;
    let net_income = total_income - input.expenses;
    let debt_service_ratio_pct = if total_income.is_zero() {
        warnings.push("No income declared; debt-service ratio reported as 0".into());
        Decimal::ZERO
    } else {
        input.expenses / total_income * HUNDRED
    };

    if net_income < Decimal::ZERO {
        warnings.push(format!("Expenses exceed income by {}", -net_income));
    }

    let output = IncomeSummary {
        total_income,
        net_income,
        debt_service_ratio_pct,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Income summary and expense-based debt-service ratio",
        &serde_json::json!({
            "base_salary": input.base_salary.to_string(),
            "other_income": input.other_income.to_string(),
            "expenses": input.expenses.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Aggregate existing obligations and test the debt-service ratio, with and
/// without the proposed installment, against the ceiling.
pub fn assess_obligations(
    input: &ObligationsInput,
) -> LoanQuoteResult<ComputationOutput<ObligationsSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_obligations(input)?;

    let max_dsr_pct = input.max_dsr_pct.unwrap_or(DEFAULT_MAX_DSR_PCT);
    let proposed = input.proposed_installment.unwrap_or(Decimal::ZERO);

    let mut total_outstanding_balance = Decimal::ZERO;
    let mut total_monthly_installment = Decimal::ZERO;
    let mut total_contracted_amount = Decimal::ZERO;

    for loan in &input.existing_loans {
        total_outstanding_balance += loan.outstanding_balance;
        total_monthly_installment += loan.monthly_installment;
        total_contracted_amount += loan.contracted_total;

        if loan.paid_months > loan.total_months {
            warnings.push(format!(
                "Loan {}: paid months ({}) exceed contract term ({})",
                loan.loan_id, loan.paid_months, loan.total_months
            ));
        }
    }

    let current_dsr_pct = total_monthly_installment / input.monthly_income * HUNDRED;
    let projected_dsr_pct =
        (total_monthly_installment + proposed) / input.monthly_income * HUNDRED;

    let ceiling = input.monthly_income * max_dsr_pct / HUNDRED;
    let installment_capacity = (ceiling - total_monthly_installment).max(Decimal::ZERO);

    let within_limit = projected_dsr_pct <= max_dsr_pct;
    if current_dsr_pct > max_dsr_pct {
        warnings.push(format!(
            "Existing obligations already exceed the {max_dsr_pct}% debt-service ceiling"
        ));
    }

    let output = ObligationsSummary {
        loan_count: input.existing_loans.len(),
        total_outstanding_balance,
        total_monthly_installment,
        total_contracted_amount,
        current_dsr_pct,
        projected_dsr_pct,
        max_dsr_pct,
        installment_capacity,
        within_limit,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt-service ratio on existing and proposed installments",
        &serde_json::json!({
            "monthly_income": input.monthly_income.to_string(),
            "max_dsr_pct": max_dsr_pct.to_string(),
            "proposed_installment": proposed.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Amounts must lie in `[0, MAX_MONEY]`.
fn check_amount(field: &str, value: Money) -> LoanQuoteResult<()> {
    if value < Decimal::ZERO {
        return Err(LoanQuoteError::InvalidInput {
            field: field.into(),
            reason: "Amount cannot be negative".into(),
        });
    }
    if value > MAX_MONEY {
        return Err(LoanQuoteError::InvalidInput {
            field: field.into(),
            reason: format!("Amount exceeds the supported maximum of {MAX_MONEY}"),
        });
    }
    Ok(())
}

fn validate_obligations(input: &ObligationsInput) -> LoanQuoteResult<()> {
    if input.monthly_income <= Decimal::ZERO {
        return Err(LoanQuoteError::InvalidInput {
            field: "monthly_income".into(),
            reason: "Monthly income must be positive".into(),
        });
    }
    check_amount("monthly_income", input.monthly_income)?;
    if let Some(max) = input.max_dsr_pct {
        if max <= Decimal::ZERO || max > HUNDRED {
            return Err(LoanQuoteError::InvalidInput {
                field: "max_dsr_pct".into(),
                reason: "Ceiling must be above 0 and at most 100".into(),
            });
        }
    }
    if let Some(proposed) = input.proposed_installment {
        check_amount("proposed_installment", proposed)?;
    }
    for loan in &input.existing_loans {
        let field = format!("existing_loans[{}]", loan.loan_id);
        for value in [loan.outstanding_balance, loan.monthly_installment, loan.contracted_total] {
            check_amount(&field, value)?;
        }
    }
    Ok(())
}
