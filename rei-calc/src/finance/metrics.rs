//! Return and coverage ratios.
//!
//! Percent-valued results are on a 0-100 scale. Ratios whose denominator is
//! zero or negative are `None` rather than infinite, so they serialize cleanly.

/// Capitalization rate (%): annual NOI over property value.
pub fn cap_rate(noi_annual: f64, property_value: f64) -> f64 {
    if property_value <= 0.0 {
        return 0.0;
    }
    noi_annual / property_value * 100.0
}

/// Cash-on-cash return (%): annual cash flow over total cash invested.
///
/// `None` when nothing is invested (all capital recovered), which is an
/// unbounded return.
pub fn cash_on_cash_roi(annual_cash_flow: f64, total_cash_invested: f64) -> Option<f64> {
    (total_cash_invested > 0.0).then(|| annual_cash_flow / total_cash_invested * 100.0)
}

/// Debt service coverage ratio: NOI over annual debt service.
pub fn debt_service_coverage(noi_annual: f64, annual_debt_service: f64) -> Option<f64> {
    (annual_debt_service > 0.0).then(|| noi_annual / annual_debt_service)
}

/// Gross rent multiplier: price over annual gross rent.
pub fn gross_rent_multiplier(price: f64, annual_gross_rent: f64) -> Option<f64> {
    (annual_gross_rent > 0.0).then(|| price / annual_gross_rent)
}

/// Occupancy (%) needed for income to cover expenses and debt service.
pub fn break_even_occupancy(
    operating_expenses_monthly: f64,
    debt_service_monthly: f64,
    gross_monthly_income: f64,
) -> Option<f64> {
    (gross_monthly_income > 0.0).then(|| {
        (operating_expenses_monthly + debt_service_monthly) / gross_monthly_income * 100.0
    })
}

/// Monthly rent is at least 1% of the all-in acquisition cost.
pub fn meets_one_percent_rule(monthly_rent: f64, all_in_cost: f64) -> bool {
    all_in_cost > 0.0 && monthly_rent >= all_in_cost * 0.01
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_rate() {
        assert!((cap_rate(15_120.0, 200_000.0) - 7.56).abs() < 1e-9);
        assert_eq!(cap_rate(15_000.0, 0.0), 0.0);
        assert!(cap_rate(-1_000.0, 100_000.0) < 0.0);
    }

    #[test]
    fn test_cash_on_cash() {
        let roi = cash_on_cash_roi(3_120.0, 52_000.0).unwrap();
        assert!((roi - 6.0).abs() < 1e-9);
        assert_eq!(cash_on_cash_roi(3_120.0, 0.0), None);
    }

    #[test]
    fn test_dscr() {
        let dscr = debt_service_coverage(15_000.0, 12_000.0).unwrap();
        assert!((dscr - 1.25).abs() < 1e-9);
        assert_eq!(debt_service_coverage(15_000.0, 0.0), None);
    }

    #[test]
    fn test_grm_and_break_even() {
        assert!((gross_rent_multiplier(240_000.0, 24_000.0).unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(gross_rent_multiplier(240_000.0, 0.0), None);

        let occupancy = break_even_occupancy(700.0, 1_100.0, 2_000.0).unwrap();
        assert!((occupancy - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_one_percent_rule() {
        assert!(meets_one_percent_rule(2_000.0, 200_000.0));
        assert!(!meets_one_percent_rule(1_999.0, 200_000.0));
        assert!(!meets_one_percent_rule(2_000.0, 0.0));
    }
}
