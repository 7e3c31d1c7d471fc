//! Closed-form financial formulas.
//!
//! Everything here is a pure function of scalar inputs:
//!
//! - [`mortgage`]: PMT, loan sizing, remaining balance, amortization
//! - [`operating`]: income, operating expenses, NOI, cash flow
//! - [`metrics`]: cap rate, cash-on-cash ROI, DSCR, GRM
//! - [`refinance`]: cash-out refinance sizing
//! - [`returns`]: NPV, IRR, equity multiple

pub mod metrics;
pub mod mortgage;
pub mod operating;
pub mod refinance;
pub mod returns;

pub use metrics::{
    break_even_occupancy, cap_rate, cash_on_cash_roi, debt_service_coverage,
    gross_rent_multiplier, meets_one_percent_rule,
};
pub use mortgage::{
    amortization_schedule, down_payment, loan_amount, loan_summary, monthly_payment,
    remaining_balance, yearly_summary, AmortizationRow, AmortizationYear, LoanSummary,
};
pub use operating::{
    annual_cash_flow, effective_gross_income, expense_breakdown, gross_monthly_income,
    monthly_cash_flow, monthly_operating_expenses, net_operating_income, vacancy_loss,
    ExpenseInputs, ExpenseLine, IncomeInputs,
};
pub use refinance::{calculate_cash_out_refinance, RefinanceInputs, RefinanceResult};
pub use returns::{equity_multiple, irr, npv};
