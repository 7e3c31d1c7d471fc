//! Temporary financing (BRRRR) types.

use chrono::NaiveDate;
use rei_common::config::CalculatorDefaults;
use serde::{Deserialize, Serialize};

// ============================================================================
// Inputs
// ============================================================================

/// Short-term acquisition/rehab loan followed by a cash-out refinance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporaryFinancingInputs {
    /// Short-term loan principal (hard money, private, HELOC)
    pub loan_amount: f64,
    /// Annual interest rate on the short-term loan (%), simple interest
    pub interest_rate_pct: f64,
    /// Origination points (% of the loan)
    pub points_pct: f64,
    /// Months the short-term loan is held before the refinance
    pub holding_months: u32,
    /// Refinance loan-to-value against ARV (%)
    pub refinance_ltv_pct: f64,
    /// Refinance loan rate (%)
    pub refinance_rate_pct: f64,
    /// Refinance loan term (years)
    pub refinance_term_years: u32,
    /// Closing costs on the refinance
    pub refinance_closing_costs: f64,
    /// Purchase (funding) date of the short-term loan
    pub purchase_date: Option<NaiveDate>,
}

impl Default for TemporaryFinancingInputs {
    fn default() -> Self {
        Self {
            loan_amount: 0.0,
            interest_rate_pct: 0.0,
            points_pct: 0.0,
            holding_months: 6,
            refinance_ltv_pct: 75.0,
            refinance_rate_pct: 7.0,
            refinance_term_years: 30,
            refinance_closing_costs: 0.0,
            purchase_date: None,
        }
    }
}

/// Thresholds for advisory warnings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancingLimits {
    /// Typical lender maximum refinance LTV (%)
    pub max_refinance_ltv_pct: f64,
    /// Holding period considered long (months)
    pub max_holding_months: u32,
    /// Points considered high (%)
    pub max_points_pct: f64,
}

impl Default for FinancingLimits {
    fn default() -> Self {
        Self::from(&CalculatorDefaults::default())
    }
}

impl From<&CalculatorDefaults> for FinancingLimits {
    fn from(defaults: &CalculatorDefaults) -> Self {
        Self {
            max_refinance_ltv_pct: defaults.max_refinance_ltv_pct,
            max_holding_months: defaults.max_holding_months,
            max_points_pct: defaults.max_points_pct,
        }
    }
}

// ============================================================================
// Warnings
// ============================================================================

/// Advisory cross-field warnings. These never block the calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FinancingWarning {
    /// No ARV entered, so the refinance cannot be sized
    MissingAfterRepairValue,
    /// ARV is below purchase + closing + rehab
    ArvBelowAllInCost { arv: f64, all_in_cost: f64 },
    /// Refinance LTV above 100%
    LtvAboveHundred { ltv_pct: f64 },
    /// Refinance LTV above what lenders usually offer
    LtvAboveLenderMaximum { ltv_pct: f64, max_pct: f64 },
    /// Zero-month hold: no interest accrues
    ZeroHoldingPeriod,
    /// Hold longer than configured maximum
    LongHoldingPeriod { months: u32, max_months: u32 },
    /// Points above configured maximum
    HighPoints { points_pct: f64, max_pct: f64 },
    /// Short-term loan larger than purchase price plus rehab
    LoanExceedsPurchaseAndRehab {
        loan_amount: f64,
        purchase_and_rehab: f64,
    },
    /// Non-zero loan at 0% interest
    ZeroInterestRate,
    /// Refinance does not cover the payoff and closing costs
    RefinanceShortfall { shortfall: f64 },
}

impl FinancingWarning {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAfterRepairValue => "missing_after_repair_value",
            Self::ArvBelowAllInCost { .. } => "arv_below_all_in_cost",
            Self::LtvAboveHundred { .. } => "ltv_above_hundred",
            Self::LtvAboveLenderMaximum { .. } => "ltv_above_lender_maximum",
            Self::ZeroHoldingPeriod => "zero_holding_period",
            Self::LongHoldingPeriod { .. } => "long_holding_period",
            Self::HighPoints { .. } => "high_points",
            Self::LoanExceedsPurchaseAndRehab { .. } => "loan_exceeds_purchase_and_rehab",
            Self::ZeroInterestRate => "zero_interest_rate",
            Self::RefinanceShortfall { .. } => "refinance_shortfall",
        }
    }
}

impl std::fmt::Display for FinancingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAfterRepairValue => {
                write!(f, "After-repair value is required to size the refinance")
            }
            Self::ArvBelowAllInCost { arv, all_in_cost } => write!(
                f,
                "ARV ${:.0} is below the all-in cost of ${:.0}",
                arv, all_in_cost
            ),
            Self::LtvAboveHundred { ltv_pct } => {
                write!(f, "Refinance LTV of {:.1}% exceeds 100%", ltv_pct)
            }
            Self::LtvAboveLenderMaximum { ltv_pct, max_pct } => write!(
                f,
                "Refinance LTV of {:.1}% exceeds the typical lender maximum of {:.1}%",
                ltv_pct, max_pct
            ),
            Self::ZeroHoldingPeriod => {
                write!(f, "Holding period is 0 months; no interest cost accrues")
            }
            Self::LongHoldingPeriod { months, max_months } => write!(
                f,
                "Holding period of {} months exceeds {} months; seasoning and carrying costs add up",
                months, max_months
            ),
            Self::HighPoints {
                points_pct,
                max_pct,
            } => write!(
                f,
                "Origination points of {:.2}% exceed {:.2}%",
                points_pct, max_pct
            ),
            Self::LoanExceedsPurchaseAndRehab {
                loan_amount,
                purchase_and_rehab,
            } => write!(
                f,
                "Temporary loan ${:.0} exceeds purchase price plus rehab of ${:.0}",
                loan_amount, purchase_and_rehab
            ),
            Self::ZeroInterestRate => {
                write!(f, "Temporary loan has a 0% interest rate")
            }
            Self::RefinanceShortfall { shortfall } => write!(
                f,
                "Refinance falls ${:.0} short of the payoff; cash is due at closing",
                shortfall
            ),
        }
    }
}

// ============================================================================
// Result
// ============================================================================

/// Temporary financing analysis, computed in dependency order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryFinancingAnalysis {
    // === Carrying costs ===
    /// Short-term loan principal
    pub loan_amount: f64,
    /// Simple interest over the holding period
    pub interest_cost: f64,
    /// Points paid at origination
    pub points_cost: f64,
    /// Interest plus points
    pub total_financing_cost: f64,

    // === Capital ===
    /// Purchase + closing + rehab + financing cost
    pub total_project_cost: f64,
    /// Investor cash: project cost not covered by the short-term loan
    pub total_invested_capital: f64,

    // === Refinance ===
    /// New loan sized off ARV
    pub refinance_amount: f64,
    /// Refinance closing costs
    pub refinance_closing_costs: f64,
    /// Proceeds after paying off the short-term loan and closing costs
    pub cash_out: f64,
    /// Payment on the refinance loan
    pub refinance_monthly_payment: f64,

    // === Residual ===
    /// Investor capital still tied up after the refinance
    pub cash_left_in_deal: f64,
    /// Proceeds beyond the investor's capital
    pub excess_cash_out: f64,
    /// Share of invested capital returned by the refinance (%)
    pub capital_recovered_pct: f64,
    /// First month of stabilised (post-refinance) operations
    pub analysis_start_date: Option<NaiveDate>,

    /// Advisory warnings
    pub warnings: Vec<FinancingWarning>,
}

impl TemporaryFinancingAnalysis {
    /// Whether the refinance pulls out every dollar invested.
    pub fn is_infinite_return(&self) -> bool {
        self.cash_left_in_deal <= 0.0
    }

    /// Warnings rendered as display strings.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_follow_calculator_defaults() {
        let mut defaults = CalculatorDefaults::default();
        defaults.max_refinance_ltv_pct = 70.0;
        let limits = FinancingLimits::from(&defaults);
        assert!((limits.max_refinance_ltv_pct - 70.0).abs() < f64::EPSILON);
        assert_eq!(limits.max_holding_months, 12);
    }

    #[test]
    fn test_warning_serialization_is_tagged() {
        let warning = FinancingWarning::RefinanceShortfall { shortfall: 1200.0 };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "refinance_shortfall");
        assert_eq!(json["shortfall"], 1200.0);
        assert_eq!(warning.code(), "refinance_shortfall");
    }

    #[test]
    fn test_warning_display() {
        let warning = FinancingWarning::LtvAboveLenderMaximum {
            ltv_pct: 85.0,
            max_pct: 80.0,
        };
        assert_eq!(
            warning.to_string(),
            "Refinance LTV of 85.0% exceeds the typical lender maximum of 80.0%"
        );
    }

    #[test]
    fn test_inputs_deserialize_with_defaults() {
        let inputs: TemporaryFinancingInputs =
            serde_json::from_str(r#"{"loan_amount": 100000, "purchase_date": "2026-01-15"}"#)
                .unwrap();
        assert!((inputs.loan_amount - 100_000.0).abs() < f64::EPSILON);
        assert_eq!(inputs.holding_months, 6);
        assert_eq!(
            inputs.purchase_date,
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );
    }
}
