use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::monthly_payment;
use crate::types::*;

/// Monthly payment for one candidate term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPayment {
    pub term_months: Months,
    pub monthly_payment: Money,
}

/// A term payment scaled for a bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonBar {
    pub term_months: Months,
    pub monthly_payment: Money,
    /// Payment relative to the shortest term's payment, in `[0, 1]`.
    pub relative_height: Decimal,
    pub is_selected: bool,
}

/// Payment for every term in `allowed_terms`, in the order supplied.
pub fn generate_comparison(
    principal: Money,
    annual_rate: Rate,
    allowed_terms: &[Months],
) -> Vec<TermPayment> {
    allowed_terms
        .iter()
        .map(|&term_months| TermPayment {
            term_months,
            monthly_payment: monthly_payment(principal, term_months, annual_rate),
        })
        .collect()
}

/// Bar height of `entry` against the shortest term in `all_entries`.
///
/// The shortest term carries the largest flat-rate payment, so it is the
/// baseline at 1.0. A zero baseline makes every height zero.
pub fn relative_height(entry: &TermPayment, all_entries: &[TermPayment]) -> Decimal {
    let baseline = all_entries
        .iter()
        .min_by_key(|e| e.term_months)
        .map(|e| e.monthly_payment)
        .unwrap_or(Decimal::ZERO);

    if baseline <= Decimal::ZERO || entry.monthly_payment <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    (entry.monthly_payment / baseline).min(Decimal::ONE)
}

/// Comparison entries with their chart heights, flagging `selected_term`.
pub fn comparison_bars(entries: &[TermPayment], selected_term: Option<Months>) -> Vec<ComparisonBar> {
    entries
        .iter()
        .map(|entry| ComparisonBar {
            term_months: entry.term_months,
            monthly_payment: entry.monthly_payment,
            relative_height: relative_height(entry, entries),
            is_selected: selected_term == Some(entry.term_months),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TERMS: [Months; 6] = [6, 12, 18, 24, 30, 36];

    #[test]
    fn test_one_entry_per_term_in_order() {
        let table = generate_comparison(dec!(100_000), dec!(0.2399), &TERMS);
        let terms: Vec<Months> = table.iter().map(|e| e.term_months).collect();
        assert_eq!(terms, TERMS.to_vec());
    }

    #[test]
    fn test_payments_strictly_decrease() {
        let table = generate_comparison(dec!(250_000), dec!(0.2399), &TERMS);
        for pair in table.windows(2) {
            assert!(pair[0].monthly_payment > pair[1].monthly_payment);
        }
    }

    #[test]
    fn test_shortest_term_is_full_height() {
        let table = generate_comparison(dec!(100_000), dec!(0.2399), &TERMS);
        assert_eq!(relative_height(&table[0], &table), Decimal::ONE);
        for entry in &table[1..] {
            let h = relative_height(entry, &table);
            assert!(h > Decimal::ZERO && h < Decimal::ONE);
        }
    }

    #[test]
    fn test_baseline_ignores_input_order() {
        let table = generate_comparison(dec!(100_000), dec!(0.2399), &[24, 6, 12]);
        assert_eq!(relative_height(&table[1], &table), Decimal::ONE);
    }

    #[test]
    fn test_zero_principal_heights() {
        let table = generate_comparison(Decimal::ZERO, dec!(0.2399), &TERMS);
        assert!(table.iter().all(|e| e.monthly_payment.is_zero()));
        assert!(table.iter().all(|e| relative_height(e, &table).is_zero()));
    }

    #[test]
    fn test_bars_flag_selection() {
        let table = generate_comparison(dec!(50_000), dec!(0.2399), &TERMS);
        let bars = comparison_bars(&table, Some(24));
        assert_eq!(bars.iter().filter(|b| b.is_selected).count(), 1);
        assert!(bars[3].is_selected);
        assert_eq!(bars[0].relative_height, Decimal::ONE);
    }

    #[test]
    fn test_empty_terms() {
        assert!(generate_comparison(dec!(50_000), dec!(0.2399), &[]).is_empty());
    }
}
