use clap::Args;
use serde_json::{json, Value};

use loan_quote_core::{ProductCatalog, ProductType};

/// Arguments for printing the product catalog
#[derive(Args)]
pub struct CatalogArgs {
    /// Only show this product
    #[arg(long)]
    pub product: Option<ProductType>,

    /// Print the raw catalog document instead of the effective rules
    #[arg(long)]
    pub raw: bool,
}

/// Effective rules per product, with fallbacks applied.
pub fn run_catalog(
    args: CatalogArgs,
    catalog: &ProductCatalog,
) -> Result<Value, Box<dyn std::error::Error>> {
    if args.raw {
        return Ok(serde_json::to_value(catalog)?);
    }

    let products: Vec<ProductType> = match args.product {
        Some(product) => vec![product],
        None => ProductType::ALL.to_vec(),
    };

    let rows: Vec<Value> = products
        .into_iter()
        .map(|product| {
            json!({
                "product_type": product,
                "configured": catalog.contains(product),
                "annual_interest_rate": catalog.rate_for(product).ok(),
                "eligibility_multiplier": catalog.eligibility_multiplier_for(product),
                "allowed_terms_months": catalog.allowed_terms_for(product),
            })
        })
        .collect();

    Ok(Value::Array(rows))
}
