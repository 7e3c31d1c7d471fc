//! Deal Analyzer.
//!
//! Recomputes every derived metric for a deal from its inputs.

use chrono::Utc;
use rei_common::config::CalculatorDefaults;
use rei_common::Validate;

use super::types::*;
use crate::brrrr::{calculate_temporary_financing_analysis, FinancingLimits};
use crate::error::CalcError;
use crate::finance::{metrics, mortgage, operating};
use crate::projection::{project, ProjectionBasis};

/// DSCR below which lenders generally decline.
const MIN_HEALTHY_DSCR: f64 = 1.0;

/// Deal analyzer.
#[derive(Debug, Clone, Default)]
pub struct DealAnalyzer {
    defaults: CalculatorDefaults,
}

/// Permanent loan and the cash position once it is in place.
struct CapitalStack {
    down_payment: Option<f64>,
    initial_cash_invested: f64,
    total_cash_invested: f64,
    loan_amount: f64,
    interest_rate_pct: f64,
    term_years: u32,
    monthly_payment: f64,
}

impl DealAnalyzer {
    /// Create a new analyzer with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with configured defaults and thresholds.
    pub fn with_defaults(defaults: CalculatorDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &CalculatorDefaults {
        &self.defaults
    }

    /// Warning thresholds for temporary financing.
    pub fn financing_limits(&self) -> FinancingLimits {
        FinancingLimits::from(&self.defaults)
    }

    /// Validate the inputs and run the full analysis.
    pub fn analyze(&self, inputs: &DealInputs) -> Result<DealAnalysis, CalcError> {
        inputs.validate()?;

        let property = &inputs.property;
        let all_in_cost = property.all_in_cost();

        // Permanent financing: conventional mortgage, or the refinance loan
        let temporary = inputs.temporary_financing.as_ref().map(|t| {
            calculate_temporary_financing_analysis(property, t, &self.financing_limits())
        });

        let capital = match (&temporary, &inputs.temporary_financing) {
            (Some(analysis), Some(t)) => CapitalStack {
                down_payment: None,
                initial_cash_invested: analysis.total_invested_capital,
                total_cash_invested: analysis.cash_left_in_deal,
                loan_amount: analysis.refinance_amount,
                interest_rate_pct: t.refinance_rate_pct,
                term_years: t.refinance_term_years,
                monthly_payment: analysis.refinance_monthly_payment,
            },
            _ => {
                let financing = &inputs.financing;
                let down = mortgage::down_payment(property.purchase_price, financing.down_payment_pct);
                let loan = mortgage::loan_amount(property.purchase_price, financing.down_payment_pct);
                let cash = down + property.closing_costs + property.rehab_costs;
                CapitalStack {
                    down_payment: Some(down),
                    initial_cash_invested: cash,
                    total_cash_invested: cash,
                    loan_amount: loan,
                    interest_rate_pct: financing.interest_rate_pct,
                    term_years: financing.term_years,
                    monthly_payment: mortgage::monthly_payment(
                        loan,
                        financing.interest_rate_pct,
                        financing.term_years,
                    ),
                }
            }
        };

        // Operations
        let income = &inputs.income;
        let expenses = &inputs.expenses;
        let gross = operating::gross_monthly_income(income);
        let opex = operating::monthly_operating_expenses(income, expenses);
        let noi = operating::net_operating_income(income, expenses);
        let monthly_cash_flow = operating::monthly_cash_flow(income, expenses, capital.monthly_payment);
        let annual_cash_flow = monthly_cash_flow * 12.0;
        let annual_debt_service = capital.monthly_payment * 12.0;

        // Ratios
        let has_arv = property.after_repair_value > 0.0;
        let cap_rate = metrics::cap_rate(noi, property.purchase_price);
        let cap_rate_on_arv = has_arv.then(|| metrics::cap_rate(noi, property.after_repair_value));
        let cash_on_cash_roi = metrics::cash_on_cash_roi(annual_cash_flow, capital.total_cash_invested);
        let debt_service_coverage = metrics::debt_service_coverage(noi, annual_debt_service);

        // Projection starts from ARV when the rehab adds value
        let projection = inputs.projection.as_ref().map(|p| {
            let basis = ProjectionBasis {
                income,
                expenses,
                loan_amount: capital.loan_amount,
                interest_rate_pct: capital.interest_rate_pct,
                term_years: capital.term_years,
                starting_value: if has_arv {
                    property.after_repair_value
                } else {
                    property.purchase_price
                },
                cash_invested: capital.total_cash_invested,
            };
            project(&basis, p, self.defaults.discount_rate_pct)
        });

        let mut warnings: Vec<String> = temporary
            .as_ref()
            .map(|t| t.warning_messages())
            .unwrap_or_default();
        if monthly_cash_flow < 0.0 {
            warnings.push(format!(
                "Monthly cash flow is negative (${:.2})",
                monthly_cash_flow
            ));
        }
        if let Some(dscr) = debt_service_coverage {
            if dscr < MIN_HEALTHY_DSCR {
                warnings.push(format!(
                    "Debt service coverage of {:.2} is below {:.2}",
                    dscr, MIN_HEALTHY_DSCR
                ));
            }
        }

        let strategy = if temporary.is_some() {
            Strategy::Brrrr
        } else {
            Strategy::Conventional
        };

        tracing::debug!(
            deal = %inputs.name,
            strategy = %strategy,
            noi,
            monthly_cash_flow,
            cap_rate,
            warnings = warnings.len(),
            "Deal analyzed"
        );

        Ok(DealAnalysis {
            name: inputs.name.clone(),
            strategy,
            all_in_cost,
            down_payment: capital.down_payment,
            initial_cash_invested: capital.initial_cash_invested,
            total_cash_invested: capital.total_cash_invested,
            loan_amount: capital.loan_amount,
            interest_rate_pct: capital.interest_rate_pct,
            term_years: capital.term_years,
            monthly_payment: capital.monthly_payment,
            gross_monthly_income: gross,
            vacancy_loss: operating::vacancy_loss(income),
            effective_gross_income: operating::effective_gross_income(income),
            monthly_operating_expenses: opex,
            expense_breakdown: operating::expense_breakdown(income, expenses),
            net_operating_income: noi,
            monthly_cash_flow,
            annual_cash_flow,
            cap_rate,
            cap_rate_on_arv,
            cash_on_cash_roi,
            debt_service_coverage,
            gross_rent_multiplier: metrics::gross_rent_multiplier(
                property.purchase_price,
                income.monthly_rent * 12.0,
            ),
            break_even_occupancy: metrics::break_even_occupancy(opex, capital.monthly_payment, gross),
            meets_one_percent_rule: metrics::meets_one_percent_rule(income.monthly_rent, all_in_cost),
            temporary_financing: temporary,
            projection,
            warnings,
            analyzed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brrrr::TemporaryFinancingInputs;
    use crate::finance::operating::{ExpenseInputs, IncomeInputs};

    fn make_test_deal() -> DealInputs {
        DealInputs {
            name: "Maple Ave SFR".to_string(),
            address: "12 Maple Ave".to_string(),
            notes: String::new(),
            property: PropertyInputs {
                purchase_price: 200_000.0,
                closing_costs: 5_000.0,
                rehab_costs: 0.0,
                after_repair_value: 0.0,
            },
            financing: FinancingInputs {
                down_payment_pct: 20.0,
                interest_rate_pct: 6.0,
                term_years: 30,
            },
            income: IncomeInputs {
                monthly_rent: 2_000.0,
                other_monthly_income: 0.0,
                vacancy_rate_pct: 5.0,
            },
            expenses: ExpenseInputs {
                property_tax_annual: 2_400.0,
                insurance_annual: 1_200.0,
                maintenance_pct: 5.0,
                ..ExpenseInputs::default()
            },
            temporary_financing: None,
            projection: None,
        }
    }

    #[test]
    fn test_analyze_conventional() {
        let analyzer = DealAnalyzer::new();
        let result = analyzer.analyze(&make_test_deal()).unwrap();

        assert_eq!(result.strategy, Strategy::Conventional);
        assert!((result.down_payment.unwrap() - 40_000.0).abs() < 1e-6);
        assert!((result.total_cash_invested - 45_000.0).abs() < 1e-6);
        assert!((result.loan_amount - 160_000.0).abs() < 1e-6);
        assert!((result.monthly_payment - 959.28).abs() < 0.01);

        // EGI 1,900 - opex 400 = 1,500/mo
        assert!((result.net_operating_income - 18_000.0).abs() < 1e-6);
        assert!((result.cap_rate - 9.0).abs() < 1e-9);
        assert!((result.monthly_cash_flow - (1_500.0 - result.monthly_payment)).abs() < 1e-9);

        let roi = result.cash_on_cash_roi.unwrap();
        assert!((roi - result.annual_cash_flow / 45_000.0 * 100.0).abs() < 1e-9);
        assert!(result.debt_service_coverage.unwrap() > 1.0);
        assert!(!result.meets_one_percent_rule);
        assert_eq!(result.cap_rate_on_arv, None);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_negative_cash_flow_warns() {
        let mut deal = make_test_deal();
        deal.income.monthly_rent = 1_000.0;
        let result = DealAnalyzer::new().analyze(&deal).unwrap();

        assert!(result.monthly_cash_flow < 0.0);
        assert!(result.warnings.iter().any(|w| w.contains("negative")));
        assert!(result.warnings.iter().any(|w| w.contains("Debt service coverage")));
    }

    #[test]
    fn test_analyze_brrrr_uses_refinance_loan() {
        let mut deal = make_test_deal();
        deal.property = PropertyInputs {
            purchase_price: 100_000.0,
            closing_costs: 3_000.0,
            rehab_costs: 30_000.0,
            after_repair_value: 180_000.0,
        };
        deal.income.monthly_rent = 1_800.0;
        deal.temporary_financing = Some(TemporaryFinancingInputs {
            loan_amount: 104_000.0,
            interest_rate_pct: 12.0,
            points_pct: 2.0,
            holding_months: 6,
            refinance_ltv_pct: 75.0,
            refinance_rate_pct: 7.0,
            refinance_term_years: 30,
            refinance_closing_costs: 4_000.0,
            purchase_date: None,
        });

        let result = DealAnalyzer::new().analyze(&deal).unwrap();
        let brrrr = result.temporary_financing.as_ref().unwrap();

        assert_eq!(result.strategy, Strategy::Brrrr);
        assert_eq!(result.down_payment, None);
        assert!((result.loan_amount - 135_000.0).abs() < 1e-6);
        assert!((result.monthly_payment - brrrr.refinance_monthly_payment).abs() < 1e-9);
        assert!((result.initial_cash_invested - 37_320.0).abs() < 1e-6);
        assert!((result.total_cash_invested - 10_320.0).abs() < 1e-6);
        assert!(result.cap_rate_on_arv.unwrap() < result.cap_rate);
        assert!(result.meets_one_percent_rule);
    }

    #[test]
    fn test_brrrr_full_recovery_has_unbounded_roi() {
        let mut deal = make_test_deal();
        deal.property.after_repair_value = 320_000.0;
        deal.temporary_financing = Some(TemporaryFinancingInputs {
            loan_amount: 200_000.0,
            interest_rate_pct: 10.0,
            holding_months: 4,
            ..TemporaryFinancingInputs::default()
        });

        let result = DealAnalyzer::new().analyze(&deal).unwrap();
        assert_eq!(result.total_cash_invested, 0.0);
        assert_eq!(result.cash_on_cash_roi, None);
    }

    #[test]
    fn test_financing_warnings_surface_first() {
        let mut deal = make_test_deal();
        deal.income.monthly_rent = 800.0;
        deal.temporary_financing = Some(TemporaryFinancingInputs {
            loan_amount: 150_000.0,
            interest_rate_pct: 11.0,
            ..TemporaryFinancingInputs::default()
        });

        let result = DealAnalyzer::new().analyze(&deal).unwrap();
        assert!(result.warnings[0].starts_with("After-repair value"));
        assert_eq!(result.loan_amount, 0.0);
        assert_eq!(result.debt_service_coverage, None);
    }

    #[test]
    fn test_projection_included_when_requested() {
        let mut deal = make_test_deal();
        deal.projection = Some(crate::projection::ProjectionInputs::default());
        let result = DealAnalyzer::new().analyze(&deal).unwrap();
        let projection = result.projection.unwrap();
        assert_eq!(projection.years.len(), 5);
        assert_eq!(projection.cash_flows[0], -45_000.0);
        assert!((projection.discount_rate_pct - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut deal = make_test_deal();
        deal.financing.interest_rate_pct = -1.0;
        let err = DealAnalyzer::new().analyze(&deal).unwrap_err();
        assert!(matches!(err, CalcError::Validation(_)));
    }

    #[test]
    fn test_custom_limits() {
        let defaults = CalculatorDefaults {
            max_refinance_ltv_pct: 70.0,
            ..CalculatorDefaults::default()
        };
        let analyzer = DealAnalyzer::with_defaults(defaults);
        assert!((analyzer.financing_limits().max_refinance_ltv_pct - 70.0).abs() < f64::EPSILON);

        let mut deal = make_test_deal();
        deal.property.after_repair_value = 260_000.0;
        deal.temporary_financing = Some(TemporaryFinancingInputs {
            loan_amount: 160_000.0,
            interest_rate_pct: 10.0,
            ..TemporaryFinancingInputs::default()
        });
        let result = analyzer.analyze(&deal).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("typical lender maximum")));
    }
}
