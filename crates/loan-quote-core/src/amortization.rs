use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::*;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Level installment under flat-rate interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_repayment: Money,
}

impl Installment {
    fn zero(principal: Money) -> Self {
        Self {
            monthly_payment: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            total_repayment: principal.max(Decimal::ZERO),
        }
    }

    /// Totals pinned at `Decimal::MAX` when the exact figures overflow.
    fn saturated(principal: Money, term: Decimal) -> Self {
        Self {
            monthly_payment: Decimal::MAX / term,
            total_interest: Decimal::MAX - principal,
            total_repayment: Decimal::MAX,
        }
    }
}

/// Flat-rate installment: interest accrues on the original principal for the
/// whole term and the total is spread evenly over the months.
///
/// ```text
/// total_interest  = principal * annual_rate * term / 12
/// monthly_payment = (principal + total_interest) / term
/// ```
///
/// A non-positive principal or a zero term yields a zero payment. Results are
/// left unrounded; totals beyond the decimal range saturate at `Decimal::MAX`.
pub fn compute_installment(principal: Money, term_months: Months, annual_rate: Rate) -> Installment {
    if principal <= Decimal::ZERO || term_months == 0 {
        return Installment::zero(principal);
    }

    let term = Decimal::from(term_months);
    let years = term / MONTHS_PER_YEAR;
    let totals = principal
        .checked_mul(annual_rate)
        .and_then(|v| v.checked_mul(years))
        .and_then(|interest| principal.checked_add(interest).map(|total| (interest, total)));

    let Some((total_interest, total_repayment)) = totals else {
        tracing::debug!(%principal, term_months, %annual_rate, "installment overflowed, saturating");
        return Installment::saturated(principal, term);
    };

    Installment {
        monthly_payment: total_repayment / term,
        total_interest,
        total_repayment,
    }
}

/// Monthly payment only; see [`compute_installment`].
pub fn monthly_payment(principal: Money, term_months: Months, annual_rate: Rate) -> Money {
    compute_installment(principal, term_months, annual_rate).monthly_payment
}
