use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use loan_quote_core::amortization::compute_installment;
use loan_quote_core::comparison::{comparison_bars, generate_comparison};
use loan_quote_core::eligibility::summarize_eligibility;
use loan_quote_core::quote::{run_quote, QuoteRequest};
use loan_quote_core::types::{Money, Months, Rate};
use loan_quote_core::{ProductCatalog, ProductType};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn catalog_or_default(catalog: Option<ProductCatalog>) -> NapiResult<ProductCatalog> {
    match catalog {
        Some(catalog) => {
            catalog.validate().map_err(to_napi_error)?;
            Ok(catalog)
        }
        None => Ok(ProductCatalog::default()),
    }
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

#[napi]
pub fn quote(input_json: String) -> NapiResult<String> {
    let request = QuoteRequest::from_json(&input_json).map_err(to_napi_error)?;
    let output = run_quote(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct EligibilityRequest {
    product_type: ProductType,
    appraisal_value: Option<Money>,
    monthly_income: Option<Money>,
    catalog: Option<ProductCatalog>,
}

#[napi]
pub fn max_eligible(input_json: String) -> NapiResult<String> {
    let request: EligibilityRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let catalog = catalog_or_default(request.catalog)?;
    let summary = summarize_eligibility(
        request.product_type,
        request.appraisal_value,
        request.monthly_income,
        &catalog,
    );
    serde_json::to_string(&summary).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct InstallmentRequest {
    principal: Money,
    term_months: Months,
    annual_interest_rate: Rate,
}

#[napi]
pub fn installment(input_json: String) -> NapiResult<String> {
    let request: InstallmentRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = compute_installment(
        request.principal,
        request.term_months,
        request.annual_interest_rate,
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct ComparisonRequest {
    product_type: ProductType,
    principal: Money,
    selected_term: Option<Months>,
    catalog: Option<ProductCatalog>,
}

#[napi]
pub fn comparison(input_json: String) -> NapiResult<String> {
    let request: ComparisonRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let catalog = catalog_or_default(request.catalog)?;
    let rate = catalog
        .rate_for(request.product_type)
        .map_err(to_napi_error)?;
    let entries = generate_comparison(
        request.principal,
        rate,
        catalog.allowed_terms_for(request.product_type),
    );
    let bars = comparison_bars(&entries, request.selected_term);
    serde_json::to_string(&bars).map_err(to_napi_error)
}

#[napi]
pub fn product_catalog() -> NapiResult<String> {
    serde_json::to_string(&ProductCatalog::default()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Affordability
// ---------------------------------------------------------------------------

#[napi]
pub fn income_summary(input_json: String) -> NapiResult<String> {
    let input: loan_quote_core::affordability::IncomeInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        loan_quote_core::affordability::income_summary(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn assess_obligations(input_json: String) -> NapiResult<String> {
    let input: loan_quote_core::affordability::ObligationsInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        loan_quote_core::affordability::assess_obligations(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
