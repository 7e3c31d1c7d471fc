//! Rental income, operating expenses, NOI and cash flow.
//!
//! Monthly figures unless a name says otherwise. Percentage-based expenses
//! (maintenance, management, capex) are charged against scheduled monthly rent.

use serde::{Deserialize, Serialize};

/// Rental income inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeInputs {
    /// Scheduled monthly rent
    pub monthly_rent: f64,
    /// Other monthly income (laundry, parking, storage)
    pub other_monthly_income: f64,
    /// Vacancy allowance (%)
    pub vacancy_rate_pct: f64,
}

/// Operating expense inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseInputs {
    pub property_tax_annual: f64,
    pub insurance_annual: f64,
    pub hoa_monthly: f64,
    pub utilities_monthly: f64,
    pub other_monthly: f64,
    /// Maintenance reserve (% of rent)
    pub maintenance_pct: f64,
    /// Property management fee (% of rent)
    pub management_pct: f64,
    /// Capital expenditure reserve (% of rent)
    pub capex_pct: f64,
}

/// A labelled monthly expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub label: String,
    pub monthly: f64,
}

/// Scheduled monthly income before vacancy.
pub fn gross_monthly_income(income: &IncomeInputs) -> f64 {
    income.monthly_rent + income.other_monthly_income
}

/// Monthly income lost to vacancy.
pub fn vacancy_loss(income: &IncomeInputs) -> f64 {
    gross_monthly_income(income) * income.vacancy_rate_pct / 100.0
}

/// Effective gross income per month (gross minus vacancy).
pub fn effective_gross_income(income: &IncomeInputs) -> f64 {
    gross_monthly_income(income) - vacancy_loss(income)
}

/// Monthly operating expenses itemised, in a stable order.
pub fn expense_breakdown(income: &IncomeInputs, expenses: &ExpenseInputs) -> Vec<ExpenseLine> {
    let rent = income.monthly_rent;
    let line = |label: &str, monthly: f64| ExpenseLine {
        label: label.to_string(),
        monthly,
    };

    vec![
        line("Property Tax", expenses.property_tax_annual / 12.0),
        line("Insurance", expenses.insurance_annual / 12.0),
        line("HOA", expenses.hoa_monthly),
        line("Utilities", expenses.utilities_monthly),
        line("Maintenance", rent * expenses.maintenance_pct / 100.0),
        line("Management", rent * expenses.management_pct / 100.0),
        line("CapEx", rent * expenses.capex_pct / 100.0),
        line("Other", expenses.other_monthly),
    ]
}

/// Total monthly operating expenses (debt service excluded).
pub fn monthly_operating_expenses(income: &IncomeInputs, expenses: &ExpenseInputs) -> f64 {
    expense_breakdown(income, expenses)
        .iter()
        .map(|l| l.monthly)
        .sum()
}

/// Annual net operating income: effective gross income less operating
/// expenses, before debt service.
pub fn net_operating_income(income: &IncomeInputs, expenses: &ExpenseInputs) -> f64 {
    (effective_gross_income(income) - monthly_operating_expenses(income, expenses)) * 12.0
}

/// Monthly cash flow after operating expenses and debt service.
pub fn monthly_cash_flow(
    income: &IncomeInputs,
    expenses: &ExpenseInputs,
    monthly_debt_service: f64,
) -> f64 {
    effective_gross_income(income) - monthly_operating_expenses(income, expenses)
        - monthly_debt_service
}

/// Annual cash flow after operating expenses and debt service.
pub fn annual_cash_flow(
    income: &IncomeInputs,
    expenses: &ExpenseInputs,
    monthly_debt_service: f64,
) -> f64 {
    monthly_cash_flow(income, expenses, monthly_debt_service) * 12.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn income() -> IncomeInputs {
        IncomeInputs {
            monthly_rent: 2000.0,
            other_monthly_income: 100.0,
            vacancy_rate_pct: 5.0,
        }
    }

    fn expenses() -> ExpenseInputs {
        ExpenseInputs {
            property_tax_annual: 2400.0,
            insurance_annual: 1200.0,
            hoa_monthly: 50.0,
            utilities_monthly: 0.0,
            other_monthly: 25.0,
            maintenance_pct: 5.0,
            management_pct: 8.0,
            capex_pct: 5.0,
        }
    }

    #[test]
    fn test_income_figures() {
        let income = income();
        assert!((gross_monthly_income(&income) - 2100.0).abs() < 1e-9);
        assert!((vacancy_loss(&income) - 105.0).abs() < 1e-9);
        assert!((effective_gross_income(&income) - 1995.0).abs() < 1e-9);
    }

    #[test]
    fn test_operating_expenses() {
        // 200 tax + 100 insurance + 50 hoa + 25 other + 360 (18% of 2000)
        let opex = monthly_operating_expenses(&income(), &expenses());
        assert!((opex - 735.0).abs() < 1e-9, "opex: {opex}");
    }

    #[test]
    fn test_breakdown_order_and_sum() {
        let lines = expense_breakdown(&income(), &expenses());
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0].label, "Property Tax");
        assert_eq!(lines[7].label, "Other");
        assert!((lines[5].monthly - 160.0).abs() < 1e-9);
    }

    #[test]
    fn test_noi_excludes_debt_service() {
        let noi = net_operating_income(&income(), &expenses());
        assert!((noi - (1995.0 - 735.0) * 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_cash_flow() {
        let monthly = monthly_cash_flow(&income(), &expenses(), 1000.0);
        assert!((monthly - 260.0).abs() < 1e-9);
        let annual = annual_cash_flow(&income(), &expenses(), 1000.0);
        assert!((annual - 3120.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_cash_flow_is_reported() {
        let monthly = monthly_cash_flow(&income(), &expenses(), 1500.0);
        assert!(monthly < 0.0);
    }

    #[test]
    fn test_defaults_are_zero() {
        let income = IncomeInputs::default();
        let expenses = ExpenseInputs::default();
        assert_eq!(net_operating_income(&income, &expenses), 0.0);
    }
}
