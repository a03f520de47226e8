pub mod affordability;
pub mod catalog;
pub mod quote;
