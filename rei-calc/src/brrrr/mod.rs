//! Temporary Financing (BRRRR) Module.
//!
//! Buy, Rehab, Rent, Refinance, Repeat: the property is bought and renovated
//! on a short-term loan, then refinanced into a long-term mortgage sized off
//! the after-repair value (ARV).
//!
//! # Chain
//!
//! 1. **Carrying cost**: simple interest over the holding period plus points
//! 2. **Invested capital**: all-in project cost not covered by the loan
//! 3. **Refinance**: ARV × LTV, less the short-term payoff and closing costs
//! 4. **Cash left in deal**: invested capital not returned, floored at zero
//! 5. **Analysis start date**: purchase date plus the holding period
//!
//! Cross-field checks produce [`FinancingWarning`]s; they never fail the
//! calculation.
//!
//! # Usage
//!
//! ```ignore
//! use rei_calc::brrrr::{calculate_temporary_financing_analysis, FinancingLimits};
//!
//! let analysis = calculate_temporary_financing_analysis(
//!     &property,
//!     &temporary_financing,
//!     &FinancingLimits::default(),
//! );
//! println!("Cash left in deal: {:.0}", analysis.cash_left_in_deal);
//! ```

pub mod analyzer;
pub mod types;

pub use analyzer::{
    analysis_start_date, calculate_temporary_financing_analysis, interest_cost, points_cost,
};
pub use types::{
    FinancingLimits, FinancingWarning, TemporaryFinancingAnalysis, TemporaryFinancingInputs,
};
