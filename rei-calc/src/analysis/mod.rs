//! Deal analysis.
//!
//! Ties the financing, operating and BRRRR calculations together into one
//! [`DealAnalysis`] per deal.

pub mod analyzer;
pub mod types;

pub use analyzer::DealAnalyzer;
pub use types::{DealAnalysis, DealInputs, FinancingInputs, PropertyInputs, Strategy, MAX_TERM_YEARS};
