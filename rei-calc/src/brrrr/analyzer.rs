//! Temporary financing (BRRRR) analysis.
//!
//! Runs the buy/rehab/refinance chain for a deal carried on a short-term loan:
//!
//! ```text
//! interest + points ─► total invested capital ─► refinance proceeds
//!                                                    │
//!            analysis start date ◄── cash left in deal
//! ```

use chrono::{Months, NaiveDate};

use super::types::*;
use crate::analysis::PropertyInputs;
use crate::finance::refinance::{calculate_cash_out_refinance, RefinanceInputs};

/// Simple interest on an interest-only loan held for `months`.
pub fn interest_cost(loan_amount: f64, annual_rate_pct: f64, months: u32) -> f64 {
    loan_amount * annual_rate_pct / 100.0 * months as f64 / 12.0
}

/// Origination points paid up front.
pub fn points_cost(loan_amount: f64, points_pct: f64) -> f64 {
    loan_amount * points_pct / 100.0
}

/// Purchase date plus the holding period in calendar months.
///
/// Day-of-month is clamped to the end of shorter months (Jan 31 + 1 month is
/// Feb 28/29).
pub fn analysis_start_date(purchase_date: Option<NaiveDate>, holding_months: u32) -> Option<NaiveDate> {
    purchase_date?.checked_add_months(Months::new(holding_months))
}

/// Run the full temporary financing analysis.
pub fn calculate_temporary_financing_analysis(
    property: &PropertyInputs,
    inputs: &TemporaryFinancingInputs,
    limits: &FinancingLimits,
) -> TemporaryFinancingAnalysis {
    let loan = inputs.loan_amount;

    // Carrying costs
    let interest = interest_cost(loan, inputs.interest_rate_pct, inputs.holding_months);
    let points = points_cost(loan, inputs.points_pct);
    let total_financing_cost = interest + points;

    // Capital
    let total_project_cost = property.all_in_cost() + total_financing_cost;
    let total_invested_capital = (total_project_cost - loan).max(0.0);

    // Refinance against ARV, paying off the short-term loan
    let refinance = calculate_cash_out_refinance(&RefinanceInputs {
        property_value: property.after_repair_value,
        ltv_pct: inputs.refinance_ltv_pct,
        existing_loan_balance: loan,
        interest_rate_pct: inputs.refinance_rate_pct,
        term_years: inputs.refinance_term_years,
        closing_costs: inputs.refinance_closing_costs,
    });

    // Residual
    let cash_left_in_deal = (total_invested_capital - refinance.cash_out).max(0.0);
    let excess_cash_out = (refinance.cash_out - total_invested_capital).max(0.0);
    let capital_recovered_pct = if total_invested_capital > 0.0 {
        refinance.cash_out.clamp(0.0, total_invested_capital) / total_invested_capital * 100.0
    } else {
        100.0
    };

    let start_date = analysis_start_date(inputs.purchase_date, inputs.holding_months);
    let warnings = collect_warnings(property, inputs, limits, refinance.cash_out);

    tracing::debug!(
        interest_cost = interest,
        points_cost = points,
        total_invested_capital,
        refinance_amount = refinance.new_loan_amount,
        cash_left_in_deal,
        warnings = warnings.len(),
        "Temporary financing analyzed"
    );

    TemporaryFinancingAnalysis {
        loan_amount: loan,
        interest_cost: interest,
        points_cost: points,
        total_financing_cost,
        total_project_cost,
        total_invested_capital,
        refinance_amount: refinance.new_loan_amount,
        refinance_closing_costs: refinance.closing_costs,
        cash_out: refinance.cash_out,
        refinance_monthly_payment: refinance.monthly_payment,
        cash_left_in_deal,
        excess_cash_out,
        capital_recovered_pct,
        analysis_start_date: start_date,
        warnings,
    }
}

/// Cross-field checks. Order is stable so reports read the same every time.
fn collect_warnings(
    property: &PropertyInputs,
    inputs: &TemporaryFinancingInputs,
    limits: &FinancingLimits,
    cash_out: f64,
) -> Vec<FinancingWarning> {
    let mut warnings = Vec::new();
    let arv = property.after_repair_value;
    let has_arv = arv > 0.0;

    if !has_arv {
        warnings.push(FinancingWarning::MissingAfterRepairValue);
    } else if arv < property.all_in_cost() {
        warnings.push(FinancingWarning::ArvBelowAllInCost {
            arv,
            all_in_cost: property.all_in_cost(),
        });
    }

    if inputs.refinance_ltv_pct > 100.0 {
        warnings.push(FinancingWarning::LtvAboveHundred {
            ltv_pct: inputs.refinance_ltv_pct,
        });
    } else if inputs.refinance_ltv_pct > limits.max_refinance_ltv_pct {
        warnings.push(FinancingWarning::LtvAboveLenderMaximum {
            ltv_pct: inputs.refinance_ltv_pct,
            max_pct: limits.max_refinance_ltv_pct,
        });
    }

    if inputs.holding_months == 0 {
        warnings.push(FinancingWarning::ZeroHoldingPeriod);
    } else if inputs.holding_months > limits.max_holding_months {
        warnings.push(FinancingWarning::LongHoldingPeriod {
            months: inputs.holding_months,
            max_months: limits.max_holding_months,
        });
    }

    if inputs.points_pct > limits.max_points_pct {
        warnings.push(FinancingWarning::HighPoints {
            points_pct: inputs.points_pct,
            max_pct: limits.max_points_pct,
        });
    }

    let purchase_and_rehab = property.purchase_price + property.rehab_costs;
    if inputs.loan_amount > purchase_and_rehab {
        warnings.push(FinancingWarning::LoanExceedsPurchaseAndRehab {
            loan_amount: inputs.loan_amount,
            purchase_and_rehab,
        });
    }

    if inputs.loan_amount > 0.0 && inputs.interest_rate_pct == 0.0 {
        warnings.push(FinancingWarning::ZeroInterestRate);
    }

    // Without an ARV the shortfall is implied by the missing value.
    if has_arv && cash_out < 0.0 {
        warnings.push(FinancingWarning::RefinanceShortfall {
            shortfall: -cash_out,
        });
    }

    warnings
}
