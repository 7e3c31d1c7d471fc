//! Loan commands: mortgage and cash-out refinance.

use rei_calc::analysis::MAX_TERM_YEARS;
use rei_calc::finance::mortgage::{amortization_schedule, loan_summary, yearly_summary};
use rei_calc::finance::refinance::{calculate_cash_out_refinance, RefinanceInputs};
use rei_calc::format::money;
use rei_common::validation::{check_non_negative, check_percentage, check_range, Validator};
use rei_common::{Result, Validate};

/// Print the payment (and optionally the yearly schedule) for a loan.
pub fn mortgage(principal: f64, rate: f64, years: u32, schedule: bool) -> Result<()> {
    println!("{}", mortgage_text(principal, rate, years, schedule)?);
    Ok(())
}

fn mortgage_text(principal: f64, rate: f64, years: u32, schedule: bool) -> Result<String> {
    Validator::new()
        .check(check_non_negative("principal", principal))
        .check(check_percentage("rate", rate))
        .check(check_range("years", years as f64, 1.0, MAX_TERM_YEARS as f64))
        .finish()?;

    let summary = loan_summary(principal, rate, years);
    let mut lines = vec![
        format!("Loan:             {:>14}", money(summary.principal)),
        format!("Monthly payment:  {:>14}", money(summary.monthly_payment)),
        format!("Total paid:       {:>14}", money(summary.total_paid)),
        format!("Total interest:   {:>14}", money(summary.total_interest)),
    ];

    if schedule {
        lines.push(String::new());
        lines.push(format!(
            "{:>4}  {:>14}  {:>14}  {:>14}",
            "Year", "Interest", "Principal", "Balance"
        ));
        for year in yearly_summary(&amortization_schedule(principal, rate, years)) {
            lines.push(format!(
                "{:>4}  {:>14}  {:>14}  {:>14}",
                year.year,
                money(year.interest),
                money(year.principal),
                money(year.ending_balance)
            ));
        }
    }

    Ok(lines.join("\n"))
}

/// Print the sizing of a cash-out refinance.
pub fn refinance(
    value: f64,
    ltv: f64,
    balance: f64,
    rate: f64,
    years: u32,
    closing_costs: f64,
) -> Result<()> {
    let inputs = RefinanceInputs {
        property_value: value,
        ltv_pct: ltv,
        existing_loan_balance: balance,
        interest_rate_pct: rate,
        term_years: years,
        closing_costs,
    };
    println!("{}", refinance_text(&inputs)?);
    Ok(())
}

fn refinance_text(inputs: &RefinanceInputs) -> Result<String> {
    inputs.validate()?;
    let result = calculate_cash_out_refinance(inputs);

    let mut lines = vec![
        format!("New loan:         {:>14}", money(result.new_loan_amount)),
        format!("Payoff:           {:>14}", money(result.payoff)),
        format!("Closing costs:    {:>14}", money(result.closing_costs)),
        format!("Cash out:         {:>14}", money(result.cash_out)),
        format!("Monthly payment:  {:>14}", money(result.monthly_payment)),
    ];
    if result.requires_cash_at_closing() {
        lines.push(format!("! {} is due at closing", money(-result.cash_out)));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mortgage_text() {
        let text = mortgage_text(200_000.0, 6.0, 30, false).unwrap();
        assert!(text.contains("$1,199.10"));
        assert!(!text.contains("Year"));
    }

    #[test]
    fn test_mortgage_schedule_rows() {
        let text = mortgage_text(24_000.0, 0.0, 2, true).unwrap();
        assert!(text.contains("Year"));
        assert!(text.contains("$12,000.00"));
        assert_eq!(text.lines().count(), 4 + 2 + 2);
    }

    #[test]
    fn test_mortgage_rejects_bad_input() {
        assert!(mortgage_text(-1.0, 6.0, 30, false).is_err());
        assert!(mortgage_text(100_000.0, 6.0, 0, false).is_err());
    }

    #[test]
    fn test_refinance_rejects_long_term() {
        let inputs = RefinanceInputs {
            property_value: 200_000.0,
            ltv_pct: 75.0,
            existing_loan_balance: 0.0,
            interest_rate_pct: 7.0,
            term_years: 400_000_000,
            closing_costs: 0.0,
        };
        let err = refinance_text(&inputs).unwrap_err();
        assert!(err.to_string().contains("term_years"));
        assert!(mortgage_text(100_000.0, 6.0, MAX_TERM_YEARS + 1, false).is_err());
    }

    #[test]
    fn test_refinance_shortfall() {
        let inputs = RefinanceInputs {
            property_value: 200_000.0,
            ltv_pct: 70.0,
            existing_loan_balance: 150_000.0,
            interest_rate_pct: 7.0,
            term_years: 30,
            closing_costs: 3_000.0,
        };
        let text = refinance_text(&inputs).unwrap();
        assert!(text.contains("Cash out:"));
        assert!(text.contains("-$13,000.00"));
        assert!(text.contains("$13,000.00 is due at closing"));
    }
}
