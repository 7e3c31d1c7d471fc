//! Cash-out refinance.

use rei_common::validation::{check_non_negative, check_percentage, ValidationError, Validator};
use rei_common::{Validate, ValidationResult};
use serde::{Deserialize, Serialize};

use super::mortgage::{monthly_payment, MAX_TERM_YEARS};

/// Cash-out refinance inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceInputs {
    /// Appraised value the lender sizes the loan against
    pub property_value: f64,
    /// Loan-to-value offered (%)
    pub ltv_pct: f64,
    /// Balance paid off at closing
    #[serde(default)]
    pub existing_loan_balance: f64,
    /// New loan rate (%)
    pub interest_rate_pct: f64,
    /// New loan term (years)
    pub term_years: u32,
    /// Closing costs deducted from proceeds
    #[serde(default)]
    pub closing_costs: f64,
}

impl Validate for RefinanceInputs {
    fn validate(&self) -> ValidationResult<()> {
        let mut v = Validator::new();
        v.check(check_non_negative("property_value", self.property_value))
            .check(check_non_negative("ltv_pct", self.ltv_pct))
            .check(check_non_negative("existing_loan_balance", self.existing_loan_balance))
            .check(check_percentage("interest_rate_pct", self.interest_rate_pct))
            .check(check_non_negative("closing_costs", self.closing_costs));
        if self.term_years == 0 || self.term_years > MAX_TERM_YEARS {
            v.check(Err(ValidationError::OutOfRange {
                field: "term_years".into(),
                value: self.term_years as f64,
                min: 1.0,
                max: MAX_TERM_YEARS as f64,
            }));
        }
        v.finish()
    }
}

/// Cash-out refinance result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceResult {
    /// New loan principal (value × LTV)
    pub new_loan_amount: f64,
    /// Old balance paid off
    pub payoff: f64,
    /// Closing costs
    pub closing_costs: f64,
    /// Cash to the borrower; negative means cash is due at closing
    pub cash_out: f64,
    /// Principal-and-interest payment on the new loan
    pub monthly_payment: f64,
}

impl RefinanceResult {
    /// Whether the borrower has to bring money to closing.
    pub fn requires_cash_at_closing(&self) -> bool {
        self.cash_out < 0.0
    }
}

/// Size a cash-out refinance and the resulting payment.
pub fn calculate_cash_out_refinance(inputs: &RefinanceInputs) -> RefinanceResult {
    let new_loan_amount = (inputs.property_value * inputs.ltv_pct / 100.0).max(0.0);
    let cash_out = new_loan_amount - inputs.existing_loan_balance - inputs.closing_costs;
    let payment = monthly_payment(new_loan_amount, inputs.interest_rate_pct, inputs.term_years);

    tracing::debug!(
        new_loan_amount,
        cash_out,
        monthly_payment = payment,
        "Cash-out refinance sized"
    );

    RefinanceResult {
        new_loan_amount,
        payoff: inputs.existing_loan_balance,
        closing_costs: inputs.closing_costs,
        cash_out,
        monthly_payment: payment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> RefinanceInputs {
        RefinanceInputs {
            property_value: 300_000.0,
            ltv_pct: 75.0,
            existing_loan_balance: 150_000.0,
            interest_rate_pct: 7.0,
            term_years: 30,
            closing_costs: 5_000.0,
        }
    }

    #[test]
    fn test_cash_out() {
        let result = calculate_cash_out_refinance(&inputs());
        assert!((result.new_loan_amount - 225_000.0).abs() < 1e-9);
        assert!((result.cash_out - 70_000.0).abs() < 1e-9);
        assert!((result.monthly_payment - monthly_payment(225_000.0, 7.0, 30)).abs() < 1e-9);
        assert!(!result.requires_cash_at_closing());
    }

    #[test]
    fn test_shortfall_is_negative_cash_out() {
        let mut inputs = inputs();
        inputs.existing_loan_balance = 230_000.0;
        let result = calculate_cash_out_refinance(&inputs);
        assert!((result.cash_out + 10_000.0).abs() < 1e-9);
        assert!(result.requires_cash_at_closing());
    }

    #[test]
    fn test_validate() {
        assert!(inputs().validate().is_ok());

        let mut bad = inputs();
        bad.term_years = 0;
        bad.property_value = -1.0;
        let err = bad.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["property_value", "term_years"]);
    }

    #[test]
    fn test_validate_rejects_term_beyond_max() {
        let mut long = inputs();
        long.term_years = MAX_TERM_YEARS;
        assert!(long.validate().is_ok());

        long.term_years = 400_000_000;
        let err = long.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["term_years"]);
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_zero_value() {
        let mut inputs = inputs();
        inputs.property_value = 0.0;
        inputs.existing_loan_balance = 0.0;
        inputs.closing_costs = 0.0;
        let result = calculate_cash_out_refinance(&inputs);
        assert_eq!(result.new_loan_amount, 0.0);
        assert_eq!(result.monthly_payment, 0.0);
        assert_eq!(result.cash_out, 0.0);
    }
}
