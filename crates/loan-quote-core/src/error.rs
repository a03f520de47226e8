use thiserror::Error;

use crate::catalog::ProductType;

#[derive(Debug, Error)]
pub enum LoanQuoteError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown product: {0} is not configured in the catalog")]
    UnknownProduct(ProductType),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LoanQuoteError {
    fn from(e: serde_json::Error) -> Self {
        LoanQuoteError::SerializationError(e.to_string())
    }
}
