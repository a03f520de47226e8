pub mod error;
pub mod types;

pub mod catalog;
pub mod eligibility;
pub mod amortization;
pub mod comparison;
pub mod quote;

#[cfg(feature = "affordability")]
pub mod affordability;

pub use catalog::{ProductCatalog, ProductType};
pub use error::LoanQuoteError;
pub use quote::{quote, LoanQuoteInput, LoanQuoteOutput};
pub use types::*;

/// Standard result type for all loan-quote operations
pub type LoanQuoteResult<T> = Result<T, LoanQuoteError>;
