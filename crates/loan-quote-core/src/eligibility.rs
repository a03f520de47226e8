use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::catalog::{ProductCatalog, ProductType};
use crate::types::*;

/// Maximum loan-to-value against the collateral appraisal.
pub const LOAN_TO_VALUE_CEILING: Rate = dec!(0.90);

/// Ceiling used when neither appraisal nor income is known.
pub const DEFAULT_MAX_ELIGIBLE: Money = dec!(1_000_000);

/// Smallest amount a borrower can request.
pub const MIN_LOAN_AMOUNT: Money = dec!(10_000);

/// Increment of the requested-amount selector.
pub const AMOUNT_STEP: Money = dec!(5_000);

/// Which rule produced the eligibility ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityBasis {
    Appraisal,
    Income,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub max_eligible_amount: Money,
    pub basis: EligibilityBasis,
}

/// Resolved ceiling alongside the figures a quote actually offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilitySummary {
    /// Raw result of the rule chain; may sit below the minimum loan amount.
    pub resolved_amount: Money,
    /// Ceiling used for quoting, never below the minimum loan amount.
    pub max_eligible_amount: Money,
    pub basis: EligibilityBasis,
    pub amount_bounds: AmountBounds,
}

/// Range offered to the borrower when choosing an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBounds {
    pub min: Money,
    pub max: Money,
    pub step: Money,
}

/// Resolve the eligibility ceiling and the rule that produced it.
///
/// Rules, first match wins:
/// 1. appraisal > 0: `floor(appraisal * 0.90)`
/// 2. income > 0: `floor(income * multiplier(product))`
/// 3. otherwise 1,000,000
///
/// Missing, zero and negative inputs all fall through to the next rule.
pub fn resolve_eligibility(
    product: ProductType,
    appraisal_value: Option<Money>,
    monthly_income: Option<Money>,
    catalog: &ProductCatalog,
) -> Eligibility {
    if let Some(appraisal) = appraisal_value.filter(|v| *v > Decimal::ZERO) {
        return Eligibility {
            max_eligible_amount: (appraisal * LOAN_TO_VALUE_CEILING).floor(),
            basis: EligibilityBasis::Appraisal,
        };
    }

    if let Some(income) = monthly_income.filter(|v| *v > Decimal::ZERO) {
        let multiplier = catalog.eligibility_multiplier_for(product);
        return Eligibility {
            max_eligible_amount: income
                .checked_mul(multiplier)
                .unwrap_or(Decimal::MAX)
                .floor(),
            basis: EligibilityBasis::Income,
        };
    }

    Eligibility {
        max_eligible_amount: DEFAULT_MAX_ELIGIBLE,
        basis: EligibilityBasis::Default,
    }
}

/// Maximum loan amount for the given collateral and income.
pub fn resolve_max_eligible(
    product: ProductType,
    appraisal_value: Option<Money>,
    monthly_income: Option<Money>,
    catalog: &ProductCatalog,
) -> Money {
    resolve_eligibility(product, appraisal_value, monthly_income, catalog).max_eligible_amount
}

/// Resolve eligibility and raise the ceiling to the minimum loan amount, the
/// same figures [`crate::quote::quote`] reports.
pub fn summarize_eligibility(
    product: ProductType,
    appraisal_value: Option<Money>,
    monthly_income: Option<Money>,
    catalog: &ProductCatalog,
) -> EligibilitySummary {
    let eligibility = resolve_eligibility(product, appraisal_value, monthly_income, catalog);
    let max_eligible_amount = eligibility.max_eligible_amount.max(MIN_LOAN_AMOUNT);
    EligibilitySummary {
        resolved_amount: eligibility.max_eligible_amount,
        max_eligible_amount,
        basis: eligibility.basis,
        amount_bounds: amount_bounds(max_eligible_amount),
    }
}

/// Selector range for a ceiling. The upper bound never drops below the
/// minimum loan amount.
pub fn amount_bounds(max_eligible: Money) -> AmountBounds {
    AmountBounds {
        min: MIN_LOAN_AMOUNT,
        max: max_eligible.max(MIN_LOAN_AMOUNT),
        step: AMOUNT_STEP,
    }
}

/// Bound a requested amount to `[0, max_eligible]`.
pub fn clamp_amount(requested: Money, max_eligible: Money) -> Money {
    requested.max(Decimal::ZERO).min(max_eligible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn resolve(product: ProductType, appraisal: Option<Money>, income: Option<Money>) -> Eligibility {
        resolve_eligibility(product, appraisal, income, &ProductCatalog::default())
    }

    #[test]
    fn test_appraisal_takes_priority_over_income() {
        let e = resolve(ProductType::Car, Some(dec!(1_380_000)), Some(dec!(40_000)));
        assert_eq!(e.max_eligible_amount, dec!(1_242_000));
        assert_eq!(e.basis, EligibilityBasis::Appraisal);
    }

    #[test]
    fn test_appraisal_is_floored() {
        // 12_345.67 * 0.9 = 11_111.103
        let e = resolve(ProductType::Land, Some(dec!(12_345.67)), None);
        assert_eq!(e.max_eligible_amount, dec!(11_111));
    }

    #[test]
    fn test_income_multiplier_per_product() {
        let income = Some(dec!(40_000));
        assert_eq!(resolve(ProductType::Motorcycle, None, income).max_eligible_amount, dec!(400_000));
        assert_eq!(resolve(ProductType::Car, None, income).max_eligible_amount, dec!(1_200_000));
        assert_eq!(resolve(ProductType::Truck, None, income).max_eligible_amount, dec!(1_400_000));
        assert_eq!(resolve(ProductType::Agricultural, None, income).max_eligible_amount, dec!(800_000));
        assert_eq!(resolve(ProductType::Land, None, income).max_eligible_amount, dec!(2_000_000));
    }

    #[test]
    fn test_zero_appraisal_falls_through_to_income() {
        let e = resolve(ProductType::Car, Some(Decimal::ZERO), Some(dec!(1_000.5)));
        assert_eq!(e.basis, EligibilityBasis::Income);
        assert_eq!(e.max_eligible_amount, dec!(30_015));
    }

    #[test]
    fn test_negative_inputs_use_default() {
        let e = resolve(ProductType::Truck, Some(dec!(-5)), Some(dec!(-1)));
        assert_eq!(e.max_eligible_amount, DEFAULT_MAX_ELIGIBLE);
        assert_eq!(e.basis, EligibilityBasis::Default);
    }

    #[test]
    fn test_income_overflow_saturates() {
        let max = resolve_max_eligible(ProductType::Land, None, Some(Decimal::MAX), &ProductCatalog::default());
        assert_eq!(max, Decimal::MAX);
    }

    #[test]
    fn test_summary_raises_small_ceiling_to_minimum() {
        let summary =
            summarize_eligibility(ProductType::Car, Some(dec!(5_000)), None, &ProductCatalog::default());
        assert_eq!(summary.resolved_amount, dec!(4_500));
        assert_eq!(summary.max_eligible_amount, MIN_LOAN_AMOUNT);
        assert_eq!(summary.amount_bounds.max, summary.max_eligible_amount);
        assert_eq!(summary.basis, EligibilityBasis::Appraisal);
    }

    #[test]
    fn test_amount_bounds_floor() {
        let bounds = amount_bounds(dec!(4_500));
        assert_eq!(bounds.min, dec!(10_000));
        assert_eq!(bounds.max, dec!(10_000));
        assert_eq!(amount_bounds(dec!(400_000)).max, dec!(400_000));
    }

    #[test]
    fn test_clamp_amount() {
        assert_eq!(clamp_amount(dec!(500_000), dec!(400_000)), dec!(400_000));
        assert_eq!(clamp_amount(dec!(100_000), dec!(400_000)), dec!(100_000));
        assert_eq!(clamp_amount(dec!(-10), dec!(400_000)), Decimal::ZERO);
    }
}
