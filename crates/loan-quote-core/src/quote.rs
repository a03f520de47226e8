use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::compute_installment;
use crate::catalog::{ProductCatalog, ProductType};
use crate::comparison::{generate_comparison, TermPayment};
use crate::eligibility::{
    clamp_amount, summarize_eligibility, AmountBounds, EligibilityBasis, MIN_LOAN_AMOUNT,
};
use crate::{LoanQuoteError, LoanQuoteResult, types::*};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanQuoteInput {
    pub product_type: ProductType,
    /// Collateral appraisal. Takes priority over income when positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appraisal_value: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<Money>,
    pub requested_amount: Money,
    /// Must be one of the product's allowed terms.
    pub term_months: Months,
}

impl LoanQuoteInput {
    /// Parse a JSON quote input. Malformed fields (negative terms, unknown
    /// product tags) are reported as invalid input.
    pub fn from_json(json: &str) -> LoanQuoteResult<Self> {
        serde_json::from_str(json).map_err(invalid_input)
    }

    /// [`LoanQuoteInput::from_json`] for an already-parsed document.
    pub fn from_json_value(value: serde_json::Value) -> LoanQuoteResult<Self> {
        serde_json::from_value(value).map_err(invalid_input)
    }
}

fn invalid_input(e: serde_json::Error) -> LoanQuoteError {
    LoanQuoteError::InvalidInput {
        field: "input".into(),
        reason: e.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuoteOutput {
    pub product_type: ProductType,
    pub term_months: Months,
    pub annual_interest_rate: Rate,
    pub eligibility_basis: EligibilityBasis,
    /// Eligibility ceiling, never below the minimum loan amount.
    pub max_eligible_amount: Money,
    pub amount_bounds: AmountBounds,
    /// Requested amount bounded to `max_eligible_amount`.
    pub clamped_amount: Money,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_repayment: Money,
    /// Payment at `clamped_amount` for every allowed term of the product.
    pub comparison_table: Vec<TermPayment>,
}

/// A quote request with an optional catalog override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub input: LoanQuoteInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<ProductCatalog>,
}

impl QuoteRequest {
    /// Parse a request document; malformed input or catalog fields are
    /// reported as invalid input.
    pub fn from_json(json: &str) -> LoanQuoteResult<Self> {
        serde_json::from_str(json).map_err(invalid_input)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price a loan: eligibility ceiling, clamped principal, installment for the
/// selected term and the comparison across every allowed term.
///
/// Pure: identical inputs give identical outputs.
pub fn quote(input: &LoanQuoteInput, catalog: &ProductCatalog) -> LoanQuoteResult<LoanQuoteOutput> {
    quote_with_warnings(input, catalog).map(|(output, _)| output)
}

/// [`quote`] wrapped in the standard computation envelope.
pub fn run_quote(request: &QuoteRequest) -> LoanQuoteResult<ComputationOutput<LoanQuoteOutput>> {
    let start = Instant::now();

    let default_catalog;
    let catalog = match &request.catalog {
        Some(catalog) => {
            catalog.validate()?;
            catalog
        }
        None => {
            default_catalog = ProductCatalog::default();
            &default_catalog
        }
    };

    let (output, warnings) = quote_with_warnings(&request.input, catalog)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Flat-rate loan quote",
        &serde_json::json!({
            "product_type": request.input.product_type,
            "annual_interest_rate": output.annual_interest_rate.to_string(),
            "interest_model": "flat rate on original principal",
            "eligibility_basis": output.eligibility_basis,
            "custom_catalog": request.catalog.is_some(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn quote_with_warnings(
    input: &LoanQuoteInput,
    catalog: &ProductCatalog,
) -> LoanQuoteResult<(LoanQuoteOutput, Vec<String>)> {
    let mut warnings: Vec<String> = Vec::new();
    let product = input.product_type;

    validate_amounts(input)?;
    validate_term(input, catalog)?;
    let rate = catalog.rate_for(product)?;

    let eligibility =
        summarize_eligibility(product, input.appraisal_value, input.monthly_income, catalog);
    let max_eligible = eligibility.max_eligible_amount;

    if eligibility.basis == EligibilityBasis::Appraisal
        && input.monthly_income.is_some_and(|v| v > Decimal::ZERO)
    {
        warnings.push("Appraisal value present; monthly income ignored for eligibility".into());
    }

    let clamped = clamp_amount(input.requested_amount, max_eligible);
    if clamped < input.requested_amount {
        tracing::debug!(
            requested = %input.requested_amount,
            max_eligible = %max_eligible,
            "requested amount reduced to eligibility ceiling"
        );
        warnings.push(format!(
            "Requested amount {} exceeds maximum eligible {}; reduced to {}",
            input.requested_amount, max_eligible, clamped
        ));
    }
    if clamped > Decimal::ZERO && clamped < MIN_LOAN_AMOUNT {
        warnings.push(format!(
            "Amount {clamped} is below the minimum loan amount {MIN_LOAN_AMOUNT}"
        ));
    }

    let installment = compute_installment(clamped, input.term_months, rate);
    let comparison_table = generate_comparison(clamped, rate, catalog.allowed_terms_for(product));

    tracing::trace!(%product, term = input.term_months, amount = %clamped, "quote computed");

    let output = LoanQuoteOutput {
        product_type: product,
        term_months: input.term_months,
        annual_interest_rate: rate,
        eligibility_basis: eligibility.basis,
        max_eligible_amount: max_eligible,
        amount_bounds: eligibility.amount_bounds,
        clamped_amount: clamped,
        monthly_payment: installment.monthly_payment,
        total_interest: installment.total_interest,
        total_repayment: installment.total_repayment,
        comparison_table,
    };

    Ok((output, warnings))
}

/// Money inputs above [`MAX_MONEY`] are rejected; negative values keep their
/// fall-through and clamping meaning.
fn validate_amounts(input: &LoanQuoteInput) -> LoanQuoteResult<()> {
    for (field, value) in [
        ("appraisal_value", input.appraisal_value),
        ("monthly_income", input.monthly_income),
        ("requested_amount", Some(input.requested_amount)),
    ] {
        if value.is_some_and(|v| v > MAX_MONEY) {
            return Err(LoanQuoteError::InvalidInput {
                field: field.into(),
                reason: format!("Amount exceeds the supported maximum of {MAX_MONEY}"),
            });
        }
    }
    Ok(())
}

/// The selected term must be a positive member of the product's term list.
/// Terms are never auto-corrected when the product changes.
fn validate_term(input: &LoanQuoteInput, catalog: &ProductCatalog) -> LoanQuoteResult<()> {
    if input.term_months == 0 {
        return Err(LoanQuoteError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be a positive number of months".into(),
        });
    }

    let allowed = catalog.allowed_terms_for(input.product_type);
    if !allowed.contains(&input.term_months) {
        let listed: Vec<String> = allowed.iter().map(|t| t.to_string()).collect();
        return Err(LoanQuoteError::InvalidInput {
            field: "term_months".into(),
            reason: format!(
                "{} months is not offered for {}; choose one of {}",
                input.term_months,
                input.product_type,
                listed.join(", ")
            ),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Holds the borrower's current selections. Every change replaces the input
/// and returns a fresh quote.
#[derive(Debug, Clone)]
pub struct QuoteSession {
    input: LoanQuoteInput,
    catalog: ProductCatalog,
}

impl QuoteSession {
    pub fn new(input: LoanQuoteInput, catalog: ProductCatalog) -> Self {
        Self { input, catalog }
    }

    pub fn input(&self) -> &LoanQuoteInput {
        &self.input
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn current(&self) -> LoanQuoteResult<LoanQuoteOutput> {
        quote(&self.input, &self.catalog)
    }

    /// Switch product. The selected term is kept as-is; if the new product
    /// does not offer it, the quote fails until a valid term is chosen.
    pub fn set_product(&mut self, product: ProductType) -> LoanQuoteResult<LoanQuoteOutput> {
        self.input.product_type = product;
        self.reclamp_requested_amount();
        self.current()
    }

    pub fn set_appraisal_value(&mut self, appraisal: Option<Money>) -> LoanQuoteResult<LoanQuoteOutput> {
        self.input.appraisal_value = appraisal;
        self.reclamp_requested_amount();
        self.current()
    }

    pub fn set_monthly_income(&mut self, income: Option<Money>) -> LoanQuoteResult<LoanQuoteOutput> {
        self.input.monthly_income = income;
        self.reclamp_requested_amount();
        self.current()
    }

    pub fn set_requested_amount(&mut self, amount: Money) -> LoanQuoteResult<LoanQuoteOutput> {
        self.input.requested_amount = clamp_amount(amount, self.max_eligible());
        self.current()
    }

    pub fn set_term_months(&mut self, term_months: Months) -> LoanQuoteResult<LoanQuoteOutput> {
        self.input.term_months = term_months;
        self.current()
    }

    fn max_eligible(&self) -> Money {
        summarize_eligibility(
            self.input.product_type,
            self.input.appraisal_value,
            self.input.monthly_income,
            &self.catalog,
        )
        .max_eligible_amount
    }

    fn reclamp_requested_amount(&mut self) {
        let max = self.max_eligible();
        if self.input.requested_amount > max {
            self.input.requested_amount = max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn car_input() -> LoanQuoteInput {
        LoanQuoteInput {
            product_type: ProductType::Car,
            appraisal_value: None,
            monthly_income: None,
            requested_amount: dec!(100_000),
            term_months: 24,
        }
    }

    #[test]
    fn test_default_quote() {
        let out = quote(&car_input(), &ProductCatalog::default()).unwrap();
        assert_eq!(out.max_eligible_amount, dec!(1_000_000));
        assert_eq!(out.eligibility_basis, EligibilityBasis::Default);
        assert_eq!(out.clamped_amount, dec!(100_000));
        assert_eq!(out.total_interest, dec!(47_980));
        assert_eq!(out.total_repayment, dec!(147_980));
        assert_eq!(out.comparison_table.len(), 9);
    }

    #[test]
    fn test_requested_amount_is_clamped() {
        let mut input = car_input();
        input.monthly_income = Some(dec!(10_000));
        input.requested_amount = dec!(500_000);
        let out = quote(&input, &ProductCatalog::default()).unwrap();
        assert_eq!(out.max_eligible_amount, dec!(300_000));
        assert_eq!(out.clamped_amount, dec!(300_000));
    }

    #[test]
    fn test_small_appraisal_raised_to_minimum() {
        let mut input = car_input();
        input.appraisal_value = Some(dec!(5_000));
        input.requested_amount = dec!(50_000);
        let out = quote(&input, &ProductCatalog::default()).unwrap();
        assert_eq!(out.max_eligible_amount, MIN_LOAN_AMOUNT);
        assert_eq!(out.clamped_amount, MIN_LOAN_AMOUNT);
    }

    #[test]
    fn test_term_not_offered_is_rejected() {
        let mut input = car_input();
        input.term_months = 6;
        let err = quote(&input, &ProductCatalog::default()).unwrap_err();
        assert!(matches!(err, LoanQuoteError::InvalidInput { ref field, .. } if field == "term_months"));
    }

    #[test]
    fn test_zero_term_is_rejected() {
        let mut input = car_input();
        input.term_months = 0;
        assert!(quote(&input, &ProductCatalog::default()).is_err());
    }

    #[test]
    fn test_run_quote_warns_on_clamp() {
        let mut input = car_input();
        input.monthly_income = Some(dec!(10_000));
        input.requested_amount = dec!(500_000);
        let out = run_quote(&QuoteRequest { input, catalog: None }).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("reduced"));
        assert_eq!(out.methodology, "Flat-rate loan quote");
    }

    #[test]
    fn test_run_quote_rejects_invalid_catalog() {
        let mut catalog = ProductCatalog::default();
        if let Some(terms) = catalog.products.get_mut(&ProductType::Car) {
            terms.annual_interest_rate = dec!(-0.1);
        }
        let request = QuoteRequest { input: car_input(), catalog: Some(catalog) };
        assert!(run_quote(&request).is_err());
    }

    #[test]
    fn test_from_json_rejects_negative_term() {
        let json = r#"{"product_type":"car","requested_amount":"100000","term_months":-12}"#;
        assert!(matches!(
            LoanQuoteInput::from_json(json),
            Err(LoanQuoteError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_from_json_accepts_numbers_and_aliases() {
        let json = r#"{"product_type":"moto","monthly_income":40000,"requested_amount":150000,"term_months":12}"#;
        let input = LoanQuoteInput::from_json(json).unwrap();
        assert_eq!(input.product_type, ProductType::Motorcycle);
        assert_eq!(input.monthly_income, Some(dec!(40_000)));
    }

    #[test]
    fn test_oversized_amounts_are_rejected() {
        let input = LoanQuoteInput {
            product_type: ProductType::Land,
            appraisal_value: Some(dec!(50_000_000_000_000_000_000_000_000_000)),
            monthly_income: None,
            requested_amount: dec!(40_000_000_000_000_000_000_000_000_000),
            term_months: 84,
        };
        let err = quote(&input, &ProductCatalog::default()).unwrap_err();
        assert!(matches!(err, LoanQuoteError::InvalidInput { ref field, .. } if field == "appraisal_value"));

        let mut input = car_input();
        input.monthly_income = Some(Decimal::MAX);
        let err = quote(&input, &ProductCatalog::default()).unwrap_err();
        assert!(matches!(err, LoanQuoteError::InvalidInput { ref field, .. } if field == "monthly_income"));
    }

    #[test]
    fn test_largest_accepted_amount_quotes() {
        let mut input = car_input();
        input.product_type = ProductType::Land;
        input.appraisal_value = Some(MAX_MONEY);
        input.requested_amount = MAX_MONEY;
        input.term_months = 84;
        let out = quote(&input, &ProductCatalog::default()).unwrap();
        assert_eq!(out.total_repayment, out.clamped_amount + out.total_interest);
    }

    #[test]
    fn test_quote_request_from_json_rejects_unknown_product() {
        let json = r#"{"input":{"product_type":"boat","requested_amount":"100000","term_months":24}}"#;
        assert!(matches!(
            QuoteRequest::from_json(json),
            Err(LoanQuoteError::InvalidInput { ref field, .. }) if field == "input"
        ));
    }

    #[test]
    fn test_from_json_value() {
        let value = serde_json::json!({"product_type": "truck", "requested_amount": 80000, "term_months": 36});
        let input = LoanQuoteInput::from_json_value(value).unwrap();
        assert_eq!(input.product_type, ProductType::Truck);
        assert!(LoanQuoteInput::from_json_value(serde_json::json!({"product_type": "truck"})).is_err());
    }

    #[test]
    fn test_session_keeps_term_across_products() {
        let mut session = QuoteSession::new(car_input(), ProductCatalog::default());
        session.set_product(ProductType::Motorcycle).unwrap();
        session.set_term_months(6).unwrap();
        // 6 months is motorcycle-only
        assert!(session.set_product(ProductType::Land).is_err());
        assert_eq!(session.input().term_months, 6);
        assert!(session.set_term_months(12).is_ok());
    }

    #[test]
    fn test_session_reclamps_when_income_drops() {
        let mut input = car_input();
        input.requested_amount = dec!(900_000);
        let mut session = QuoteSession::new(input, ProductCatalog::default());
        let out = session.set_monthly_income(Some(dec!(20_000))).unwrap();
        assert_eq!(out.max_eligible_amount, dec!(600_000));
        assert_eq!(session.input().requested_amount, dec!(600_000));

        // Raising eligibility again does not restore the earlier request
        let out = session.set_monthly_income(Some(dec!(40_000))).unwrap();
        assert_eq!(out.clamped_amount, dec!(600_000));
    }

    #[test]
    fn test_session_clamps_requested_amount() {
        let mut session = QuoteSession::new(car_input(), ProductCatalog::default());
        session.set_appraisal_value(Some(dec!(200_000))).unwrap();
        let out = session.set_requested_amount(dec!(250_000)).unwrap();
        assert_eq!(out.clamped_amount, dec!(180_000));
        assert_eq!(session.input().requested_amount, dec!(180_000));
    }
}
