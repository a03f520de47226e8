use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{LoanQuoteError, LoanQuoteResult, types::*};

/// Headline annual flat rate quoted for every product line.
pub const STANDARD_ANNUAL_RATE: Rate = dec!(0.2399);

/// Income multiplier for products without a configured multiplier.
pub const DEFAULT_ELIGIBILITY_MULTIPLIER: u32 = 20;

const MOTORCYCLE_TERMS: [Months; 6] = [6, 12, 18, 24, 30, 36];
const VEHICLE_TERMS: [Months; 9] = [12, 18, 24, 30, 36, 42, 48, 54, 60];
const LAND_TERMS: [Months; 13] = [12, 18, 24, 30, 36, 42, 48, 54, 60, 66, 72, 78, 84];

// ---------------------------------------------------------------------------
// Product type
// ---------------------------------------------------------------------------

/// Collateral class securing the loan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Car,
    #[serde(alias = "moto")]
    Motorcycle,
    Truck,
    #[serde(alias = "agri")]
    Agricultural,
    Land,
}

impl ProductType {
    pub const ALL: [ProductType; 5] = [
        ProductType::Car,
        ProductType::Motorcycle,
        ProductType::Truck,
        ProductType::Agricultural,
        ProductType::Land,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Car => "car",
            ProductType::Motorcycle => "motorcycle",
            ProductType::Truck => "truck",
            ProductType::Agricultural => "agricultural",
            ProductType::Land => "land",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = LoanQuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" => Ok(ProductType::Car),
            "motorcycle" | "moto" => Ok(ProductType::Motorcycle),
            "truck" => Ok(ProductType::Truck),
            "agricultural" | "agri" => Ok(ProductType::Agricultural),
            "land" => Ok(ProductType::Land),
            other => Err(LoanQuoteError::InvalidInput {
                field: "product_type".into(),
                reason: format!(
                    "'{other}' is not one of car, motorcycle, truck, agricultural, land"
                ),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Pricing and tenor rules for a single product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTerms {
    pub annual_interest_rate: Rate,
    /// Monthly-income multiple used when no appraisal is available.
    /// `None` falls back to [`DEFAULT_ELIGIBILITY_MULTIPLIER`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility_multiplier: Option<u32>,
    /// Permissible term lengths, strictly ascending.
    pub allowed_terms_months: Vec<Months>,
}

/// Read-only reference data: rate, income multiplier and tenors per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCatalog {
    pub products: BTreeMap<ProductType, ProductTerms>,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        let entry = |multiplier: Option<u32>, terms: &[Months]| ProductTerms {
            annual_interest_rate: STANDARD_ANNUAL_RATE,
            eligibility_multiplier: multiplier,
            allowed_terms_months: terms.to_vec(),
        };

        let mut products = BTreeMap::new();
        products.insert(ProductType::Motorcycle, entry(Some(10), &MOTORCYCLE_TERMS));
        products.insert(ProductType::Car, entry(Some(30), &VEHICLE_TERMS));
        products.insert(ProductType::Truck, entry(Some(35), &VEHICLE_TERMS));
        products.insert(ProductType::Agricultural, entry(None, &VEHICLE_TERMS));
        products.insert(ProductType::Land, entry(Some(50), &LAND_TERMS));

        Self { products }
    }
}

impl ProductCatalog {
    pub fn contains(&self, product: ProductType) -> bool {
        self.products.contains_key(&product)
    }

    /// Annual flat interest rate for a product.
    pub fn rate_for(&self, product: ProductType) -> LoanQuoteResult<Rate> {
        self.products
            .get(&product)
            .map(|t| t.annual_interest_rate)
            .ok_or(LoanQuoteError::UnknownProduct(product))
    }

    /// Allowed term lengths for a product. Products missing from the catalog
    /// get the car term list.
    pub fn allowed_terms_for(&self, product: ProductType) -> &[Months] {
        if let Some(terms) = self.products.get(&product) {
            return &terms.allowed_terms_months;
        }
        tracing::debug!(%product, "product not in catalog, using car term list");
        self.products
            .get(&ProductType::Car)
            .map(|t| t.allowed_terms_months.as_slice())
            .unwrap_or(&VEHICLE_TERMS)
    }

    /// Income multiplier for a product, 20 when unconfigured.
    pub fn eligibility_multiplier_for(&self, product: ProductType) -> Multiple {
        let multiplier = self
            .products
            .get(&product)
            .and_then(|t| t.eligibility_multiplier)
            .unwrap_or(DEFAULT_ELIGIBILITY_MULTIPLIER);
        Decimal::from(multiplier)
    }

    pub fn is_allowed_term(&self, product: ProductType, term_months: Months) -> bool {
        self.allowed_terms_for(product).contains(&term_months)
    }

    /// Check that every configured product has usable pricing data.
    pub fn validate(&self) -> LoanQuoteResult<()> {
        for (product, terms) in &self.products {
            if terms.annual_interest_rate < Decimal::ZERO {
                return Err(LoanQuoteError::InvalidInput {
                    field: format!("{product}.annual_interest_rate"),
                    reason: "Interest rate cannot be negative".into(),
                });
            }
            if terms.eligibility_multiplier == Some(0) {
                return Err(LoanQuoteError::InvalidInput {
                    field: format!("{product}.eligibility_multiplier"),
                    reason: "Multiplier must be a positive integer".into(),
                });
            }
            if terms.allowed_terms_months.is_empty() {
                return Err(LoanQuoteError::InvalidInput {
                    field: format!("{product}.allowed_terms_months"),
                    reason: "At least one term is required".into(),
                });
            }
            if terms.allowed_terms_months.contains(&0) {
                return Err(LoanQuoteError::InvalidInput {
                    field: format!("{product}.allowed_terms_months"),
                    reason: "Terms must be positive".into(),
                });
            }
            if terms.allowed_terms_months.windows(2).any(|w| w[0] >= w[1]) {
                return Err(LoanQuoteError::InvalidInput {
                    field: format!("{product}.allowed_terms_months"),
                    reason: "Terms must be unique and ascending".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn without(product: ProductType) -> ProductCatalog {
        let mut catalog = ProductCatalog::default();
        catalog.products.remove(&product);
        catalog
    }

    #[test]
    fn test_default_rates_are_uniform() {
        let catalog = ProductCatalog::default();
        for product in ProductType::ALL {
            assert_eq!(catalog.rate_for(product).unwrap(), dec!(0.2399));
        }
    }

    #[test]
    fn test_default_terms() {
        let catalog = ProductCatalog::default();
        assert_eq!(
            catalog.allowed_terms_for(ProductType::Motorcycle),
            &[6, 12, 18, 24, 30, 36]
        );
        assert_eq!(catalog.allowed_terms_for(ProductType::Truck).len(), 9);
        assert_eq!(catalog.allowed_terms_for(ProductType::Land).last(), Some(&84));
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_default_multipliers() {
        let catalog = ProductCatalog::default();
        assert_eq!(catalog.eligibility_multiplier_for(ProductType::Land), dec!(50));
        assert_eq!(catalog.eligibility_multiplier_for(ProductType::Car), dec!(30));
        assert_eq!(catalog.eligibility_multiplier_for(ProductType::Truck), dec!(35));
        assert_eq!(catalog.eligibility_multiplier_for(ProductType::Motorcycle), dec!(10));
        assert_eq!(catalog.eligibility_multiplier_for(ProductType::Agricultural), dec!(20));
    }

    #[test]
    fn test_missing_product_falls_back() {
        let catalog = without(ProductType::Land);
        assert_eq!(
            catalog.allowed_terms_for(ProductType::Land),
            catalog.allowed_terms_for(ProductType::Car)
        );
        assert_eq!(catalog.eligibility_multiplier_for(ProductType::Land), dec!(20));
        assert!(matches!(
            catalog.rate_for(ProductType::Land),
            Err(LoanQuoteError::UnknownProduct(ProductType::Land))
        ));
    }

    #[test]
    fn test_missing_car_uses_builtin_vehicle_terms() {
        let mut catalog = ProductCatalog::default();
        catalog.products.clear();
        assert_eq!(catalog.allowed_terms_for(ProductType::Truck), &VEHICLE_TERMS);
    }

    #[test]
    fn test_parse_product_aliases() {
        assert_eq!("moto".parse::<ProductType>().unwrap(), ProductType::Motorcycle);
        assert_eq!(" Agri ".parse::<ProductType>().unwrap(), ProductType::Agricultural);
        assert_eq!("land".parse::<ProductType>().unwrap(), ProductType::Land);
        assert!("boat".parse::<ProductType>().is_err());
    }

    #[test]
    fn test_validate_rejects_unordered_terms() {
        let mut catalog = ProductCatalog::default();
        if let Some(terms) = catalog.products.get_mut(&ProductType::Car) {
            terms.allowed_terms_months = vec![24, 12];
        }
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_multiplier() {
        let mut catalog = ProductCatalog::default();
        if let Some(terms) = catalog.products.get_mut(&ProductType::Truck) {
            terms.eligibility_multiplier = Some(0);
        }
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_catalog_json_keys() {
        let json = serde_json::to_value(ProductCatalog::default()).unwrap();
        assert!(json["products"]["motorcycle"].is_object());
        assert!(json["products"]["agricultural"]
            .get("eligibility_multiplier")
            .is_none());
    }
}
