//! Multi-year hold projection.
//!
//! Grows rent and fixed expenses, appreciates the property, amortizes the
//! loan, and sells at the end of the hold to produce IRR, NPV and equity
//! multiple.

use serde::{Deserialize, Serialize};

use crate::finance::mortgage::{monthly_payment, remaining_balance, PERIODS_PER_YEAR};
use crate::finance::operating::{net_operating_income, ExpenseInputs, IncomeInputs};
use crate::finance::returns::{equity_multiple, irr, npv};

/// Projection assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionInputs {
    /// Years held before sale
    pub hold_years: u32,
    /// Annual property appreciation (%)
    pub appreciation_pct: f64,
    /// Annual rent growth (%)
    pub rent_growth_pct: f64,
    /// Annual growth of fixed expenses (%)
    pub expense_growth_pct: f64,
    /// Selling costs at exit (% of sale price)
    pub selling_costs_pct: f64,
}

impl Default for ProjectionInputs {
    fn default() -> Self {
        Self {
            hold_years: 5,
            appreciation_pct: 3.0,
            rent_growth_pct: 2.0,
            expense_growth_pct: 2.0,
            selling_costs_pct: 6.0,
        }
    }
}

/// What the projection starts from.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionBasis<'a> {
    pub income: &'a IncomeInputs,
    pub expenses: &'a ExpenseInputs,
    /// Permanent loan principal
    pub loan_amount: f64,
    pub interest_rate_pct: f64,
    pub term_years: u32,
    /// Property value at the start of year 1
    pub starting_value: f64,
    /// Cash the investor has in the deal at time zero
    pub cash_invested: f64,
}

/// One projected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: u32,
    pub gross_rent: f64,
    pub net_operating_income: f64,
    pub debt_service: f64,
    pub cash_flow: f64,
    pub property_value: f64,
    pub loan_balance: f64,
    pub equity: f64,
}

/// Projection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub years: Vec<ProjectionYear>,
    pub sale_price: f64,
    pub selling_costs: f64,
    /// Sale price less selling costs and loan payoff
    pub net_sale_proceeds: f64,
    /// Time-zero investment followed by yearly cash flows; sale in the last year
    pub cash_flows: Vec<f64>,
    pub total_cash_flow: f64,
    /// Internal rate of return (%)
    pub irr: Option<f64>,
    /// NPV at the discount rate
    pub npv: f64,
    pub discount_rate_pct: f64,
    pub equity_multiple: Option<f64>,
}

fn growth(rate_pct: f64, years: u32) -> f64 {
    (1.0 + rate_pct / 100.0).powi(years as i32)
}

/// Income and expenses for a year `elapsed` years after the start.
fn grown_inputs(
    income: &IncomeInputs,
    expenses: &ExpenseInputs,
    inputs: &ProjectionInputs,
    elapsed: u32,
) -> (IncomeInputs, ExpenseInputs) {
    let rent_factor = growth(inputs.rent_growth_pct, elapsed);
    let expense_factor = growth(inputs.expense_growth_pct, elapsed);

    let income = IncomeInputs {
        monthly_rent: income.monthly_rent * rent_factor,
        other_monthly_income: income.other_monthly_income * rent_factor,
        vacancy_rate_pct: income.vacancy_rate_pct,
    };
    // Percentage expenses follow rent on their own.
    let expenses = ExpenseInputs {
        property_tax_annual: expenses.property_tax_annual * expense_factor,
        insurance_annual: expenses.insurance_annual * expense_factor,
        hoa_monthly: expenses.hoa_monthly * expense_factor,
        utilities_monthly: expenses.utilities_monthly * expense_factor,
        other_monthly: expenses.other_monthly * expense_factor,
        ..expenses.clone()
    };
    (income, expenses)
}

/// Project the hold period and the exit.
pub fn project(
    basis: &ProjectionBasis<'_>,
    inputs: &ProjectionInputs,
    discount_rate_pct: f64,
) -> Projection {
    let payment = monthly_payment(basis.loan_amount, basis.interest_rate_pct, basis.term_years);
    let term_months = basis.term_years.saturating_mul(PERIODS_PER_YEAR);

    let years: Vec<ProjectionYear> = (1..=inputs.hold_years)
        .map(|year| {
            let (income, expenses) = grown_inputs(basis.income, basis.expenses, inputs, year - 1);
            let noi = net_operating_income(&income, &expenses);

            let months_elapsed = (year - 1).saturating_mul(PERIODS_PER_YEAR);
            let months_paid = term_months.saturating_sub(months_elapsed).min(PERIODS_PER_YEAR);
            let debt_service = payment * months_paid as f64;

            let property_value = basis.starting_value * growth(inputs.appreciation_pct, year);
            let loan_balance = remaining_balance(
                basis.loan_amount,
                basis.interest_rate_pct,
                basis.term_years,
                year.saturating_mul(PERIODS_PER_YEAR),
            );

            ProjectionYear {
                year,
                gross_rent: income.monthly_rent * 12.0,
                net_operating_income: noi,
                debt_service,
                cash_flow: noi - debt_service,
                property_value,
                loan_balance,
                equity: property_value - loan_balance,
            }
        })
        .collect();

    let (sale_price, final_balance) = years
        .last()
        .map(|y| (y.property_value, y.loan_balance))
        .unwrap_or((basis.starting_value, basis.loan_amount));
    let selling_costs = sale_price * inputs.selling_costs_pct / 100.0;
    let net_sale_proceeds = sale_price - selling_costs - final_balance;

    let mut cash_flows = Vec::with_capacity(years.len() + 1);
    cash_flows.push(-basis.cash_invested);
    cash_flows.extend(years.iter().map(|y| y.cash_flow));
    if let Some(last) = cash_flows.last_mut() {
        if !years.is_empty() {
            *last += net_sale_proceeds;
        }
    }

    let total_cash_flow = years.iter().map(|y| y.cash_flow).sum();
    let irr = irr(&cash_flows);
    let npv = npv(discount_rate_pct, &cash_flows);
    let equity_multiple = equity_multiple(&cash_flows);

    tracing::debug!(
        hold_years = inputs.hold_years,
        net_sale_proceeds,
        irr = ?irr,
        npv,
        "Hold projection complete"
    );

    Projection {
        years,
        sale_price,
        selling_costs,
        net_sale_proceeds,
        cash_flows,
        total_cash_flow,
        irr,
        npv,
        discount_rate_pct,
        equity_multiple,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn income() -> IncomeInputs {
        IncomeInputs {
            monthly_rent: 2_000.0,
            other_monthly_income: 0.0,
            vacancy_rate_pct: 5.0,
        }
    }

    fn expenses() -> ExpenseInputs {
        ExpenseInputs {
            property_tax_annual: 2_400.0,
            insurance_annual: 1_200.0,
            maintenance_pct: 5.0,
            ..ExpenseInputs::default()
        }
    }

    fn run(inputs: &ProjectionInputs) -> Projection {
        let income = income();
        let expenses = expenses();
        let basis = ProjectionBasis {
            income: &income,
            expenses: &expenses,
            loan_amount: 160_000.0,
            interest_rate_pct: 6.0,
            term_years: 30,
            starting_value: 200_000.0,
            cash_invested: 45_000.0,
        };
        project(&basis, inputs, 8.0)
    }

    #[test]
    fn test_year_one_matches_operating_statement() {
        let projection = run(&ProjectionInputs::default());
        let first = &projection.years[0];
        let noi = net_operating_income(&income(), &expenses());

        assert_eq!(projection.years.len(), 5);
        assert!((first.net_operating_income - noi).abs() < 1e-6);
        assert!((first.debt_service - monthly_payment(160_000.0, 6.0, 30) * 12.0).abs() < 1e-6);
        assert!((first.property_value - 206_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_growth_compounds() {
        let projection = run(&ProjectionInputs::default());
        let rents: Vec<f64> = projection.years.iter().map(|y| y.gross_rent).collect();
        assert!(rents.windows(2).all(|w| w[1] > w[0]));
        let balances: Vec<f64> = projection.years.iter().map(|y| y.loan_balance).collect();
        assert!(balances.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_exit_and_returns() {
        let projection = run(&ProjectionInputs::default());
        let last = projection.years.last().unwrap();

        assert!((projection.sale_price - last.property_value).abs() < 1e-9);
        assert!((projection.selling_costs - last.property_value * 0.06).abs() < 1e-6);
        assert_eq!(projection.cash_flows.len(), 6);
        assert_eq!(projection.cash_flows[0], -45_000.0);
        assert!(
            (projection.cash_flows[5] - (last.cash_flow + projection.net_sale_proceeds)).abs()
                < 1e-6
        );

        let irr = projection.irr.unwrap();
        assert!(irr > 0.0, "irr: {irr}");
        assert!(npv(irr, &projection.cash_flows).abs() < 0.01);
        assert!(projection.equity_multiple.unwrap() > 1.0);
    }

    #[test]
    fn test_flat_growth_keeps_noi_constant() {
        let inputs = ProjectionInputs {
            rent_growth_pct: 0.0,
            expense_growth_pct: 0.0,
            appreciation_pct: 0.0,
            ..ProjectionInputs::default()
        };
        let projection = run(&inputs);
        let first = projection.years[0].net_operating_income;
        assert!(projection
            .years
            .iter()
            .all(|y| (y.net_operating_income - first).abs() < 1e-9));
    }

    #[test]
    fn test_debt_service_stops_after_term() {
        let income = income();
        let expenses = expenses();
        let basis = ProjectionBasis {
            income: &income,
            expenses: &expenses,
            loan_amount: 50_000.0,
            interest_rate_pct: 5.0,
            term_years: 2,
            starting_value: 200_000.0,
            cash_invested: 150_000.0,
        };
        let projection = project(&basis, &ProjectionInputs::default(), 8.0);
        assert!(projection.years[1].debt_service > 0.0);
        assert_eq!(projection.years[2].debt_service, 0.0);
        assert_eq!(projection.years[2].loan_balance, 0.0);
    }

    #[test]
    fn test_zero_hold_has_no_years() {
        let inputs = ProjectionInputs {
            hold_years: 0,
            ..ProjectionInputs::default()
        };
        let projection = run(&inputs);
        assert!(projection.years.is_empty());
        assert_eq!(projection.cash_flows, vec![-45_000.0]);
        assert_eq!(projection.irr, None);
    }
}
