//! Fixed-rate mortgage math.
//!
//! Rates are annual percentages (`6.5` means 6.5%), terms are in years and
//! payments are monthly.

use serde::{Deserialize, Serialize};

/// Number of payment periods per year.
pub const PERIODS_PER_YEAR: u32 = 12;

/// Longest loan term or hold accepted, in years.
pub const MAX_TERM_YEARS: u32 = 50;

/// Monthly payments over a term; saturates instead of overflowing.
fn payment_count(term_years: u32) -> u32 {
    term_years.saturating_mul(PERIODS_PER_YEAR)
}

/// Monthly periodic rate for an annual percentage rate.
fn periodic_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / PERIODS_PER_YEAR as f64
}

/// Monthly principal-and-interest payment (PMT).
///
/// Returns 0 for a non-positive principal or a zero term. A zero rate
/// spreads the principal evenly over the term.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, term_years: u32) -> f64 {
    let n = payment_count(term_years);
    if principal <= 0.0 || n == 0 {
        return 0.0;
    }

    let r = periodic_rate(annual_rate_pct);
    if r == 0.0 {
        return principal / n as f64;
    }

    // Discount form; stays finite for very long terms.
    let discount = (1.0 + r).powf(-(n as f64));
    principal * r / (1.0 - discount)
}

/// Down payment in currency for a purchase price and percentage.
pub fn down_payment(purchase_price: f64, down_payment_pct: f64) -> f64 {
    (purchase_price * down_payment_pct / 100.0).max(0.0)
}

/// Loan amount left after the down payment, never negative.
pub fn loan_amount(purchase_price: f64, down_payment_pct: f64) -> f64 {
    (purchase_price - down_payment(purchase_price, down_payment_pct)).max(0.0)
}

/// Outstanding balance after `payments_made` monthly payments.
pub fn remaining_balance(
    principal: f64,
    annual_rate_pct: f64,
    term_years: u32,
    payments_made: u32,
) -> f64 {
    let n = payment_count(term_years);
    if principal <= 0.0 || n == 0 {
        return 0.0;
    }
    if payments_made >= n {
        return 0.0;
    }

    let r = periodic_rate(annual_rate_pct);
    if r == 0.0 {
        return principal * (1.0 - payments_made as f64 / n as f64);
    }

    // P * (G - g) / (G - 1), rewritten with negative exponents
    let remaining = (1.0 + r).powf(-((n - payments_made) as f64));
    let full = (1.0 + r).powf(-(n as f64));
    (principal * (1.0 - remaining) / (1.0 - full)).max(0.0)
}

/// Payment and lifetime totals for a fixed-rate loan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub principal: f64,
    pub monthly_payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
}

pub fn loan_summary(principal: f64, annual_rate_pct: f64, term_years: u32) -> LoanSummary {
    let payment = monthly_payment(principal, annual_rate_pct, term_years);
    let total_paid = payment * payment_count(term_years) as f64;
    LoanSummary {
        principal: principal.max(0.0),
        monthly_payment: payment,
        total_paid,
        total_interest: (total_paid - principal.max(0.0)).max(0.0),
    }
}

/// One month of an amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Payment number, starting at 1
    pub period: u32,
    /// Total payment for the period
    pub payment: f64,
    /// Interest portion
    pub interest: f64,
    /// Principal portion
    pub principal: f64,
    /// Balance after the payment
    pub balance: f64,
}

/// Full monthly amortization schedule.
///
/// The final payment absorbs floating-point residue so the last balance is
/// exactly zero.
pub fn amortization_schedule(
    principal: f64,
    annual_rate_pct: f64,
    term_years: u32,
) -> Vec<AmortizationRow> {
    let n = payment_count(term_years);
    if principal <= 0.0 || n == 0 {
        return Vec::new();
    }

    let r = periodic_rate(annual_rate_pct);
    let payment = monthly_payment(principal, annual_rate_pct, term_years);
    let mut balance = principal;
    let mut rows = Vec::with_capacity(n.min(payment_count(MAX_TERM_YEARS)) as usize);

    for period in 1..=n {
        let interest = balance * r;
        let mut principal_part = payment - interest;
        let mut this_payment = payment;
        if period == n {
            principal_part = balance;
            this_payment = balance + interest;
        }
        balance = (balance - principal_part).max(0.0);
        rows.push(AmortizationRow {
            period,
            payment: this_payment,
            interest,
            principal: principal_part,
            balance,
        });
    }

    rows
}

/// Amortization totals for one loan year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub payments: f64,
    pub interest: f64,
    pub principal: f64,
    pub ending_balance: f64,
}

/// Fold a monthly schedule into yearly totals.
pub fn yearly_summary(rows: &[AmortizationRow]) -> Vec<AmortizationYear> {
    rows.chunks(PERIODS_PER_YEAR as usize)
        .enumerate()
        .map(|(i, chunk)| AmortizationYear {
            year: i as u32 + 1,
            payments: chunk.iter().map(|r| r.payment).sum(),
            interest: chunk.iter().map(|r| r.interest).sum(),
            principal: chunk.iter().map(|r| r.principal).sum(),
            ending_balance: chunk.last().map(|r| r.balance).unwrap_or(0.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_monthly_payment_standard_loan() {
        // 200k at 6% over 30 years
        let payment = monthly_payment(200_000.0, 6.0, 30);
        assert!((payment - 1199.10).abs() < 0.01, "payment: {payment}");
    }

    #[test]
    fn test_monthly_payment_fifteen_year() {
        let payment = monthly_payment(150_000.0, 4.5, 15);
        assert!((payment - 1147.49).abs() < 0.01, "payment: {payment}");
    }

    #[test]
    fn test_monthly_payment_zero_rate() {
        let payment = monthly_payment(120_000.0, 0.0, 10);
        assert!((payment - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_payment_degenerate_inputs() {
        assert_eq!(monthly_payment(0.0, 6.0, 30), 0.0);
        assert_eq!(monthly_payment(-5.0, 6.0, 30), 0.0);
        assert_eq!(monthly_payment(100_000.0, 6.0, 0), 0.0);
    }

    #[test]
    fn test_loan_and_down_payment() {
        assert!((down_payment(250_000.0, 20.0) - 50_000.0).abs() < 1e-9);
        assert!((loan_amount(250_000.0, 20.0) - 200_000.0).abs() < 1e-9);
        assert_eq!(loan_amount(250_000.0, 100.0), 0.0);
    }

    #[test]
    fn test_loan_summary() {
        let summary = loan_summary(200_000.0, 6.0, 30);
        assert!((summary.monthly_payment - 1199.10).abs() < 0.01);
        assert!((summary.total_paid - summary.monthly_payment * 360.0).abs() < 1e-6);
        assert!((summary.total_interest - (summary.total_paid - 200_000.0)).abs() < 1e-6);

        let empty = loan_summary(0.0, 6.0, 30);
        assert_eq!(empty.total_paid, 0.0);
        assert_eq!(empty.total_interest, 0.0);
    }

    #[test]
    fn test_remaining_balance_matches_schedule() {
        let schedule = amortization_schedule(200_000.0, 6.0, 30);
        let after_five_years = remaining_balance(200_000.0, 6.0, 30, 60);
        assert!((schedule[59].balance - after_five_years).abs() < 0.01);
        assert_eq!(remaining_balance(200_000.0, 6.0, 30, 360), 0.0);
        assert_eq!(remaining_balance(200_000.0, 6.0, 30, 0), 200_000.0);
    }

    #[test]
    fn test_remaining_balance_zero_rate() {
        let balance = remaining_balance(120_000.0, 0.0, 10, 60);
        assert!((balance - 60_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_schedule_pays_off_loan() {
        let schedule = amortization_schedule(100_000.0, 7.25, 15);
        assert_eq!(schedule.len(), 180);
        assert_eq!(schedule.last().unwrap().balance, 0.0);

        let principal_paid: f64 = schedule.iter().map(|r| r.principal).sum();
        assert!((principal_paid - 100_000.0).abs() < 0.01);
    }

    #[test]
    fn test_yearly_summary() {
        let schedule = amortization_schedule(100_000.0, 5.0, 2);
        let years = yearly_summary(&schedule);
        assert_eq!(years.len(), 2);
        assert_eq!(years[1].ending_balance, 0.0);
        let total_principal: f64 = years.iter().map(|y| y.principal).sum();
        assert!((total_principal - 100_000.0).abs() < 0.01);
        assert!(years[0].interest > years[1].interest);
    }

    #[test]
    fn test_huge_term_does_not_overflow() {
        let payment = monthly_payment(200_000.0, 6.0, 400_000_000);
        // Interest only, the principal never amortizes
        assert!((payment - 1_000.0).abs() < 1e-6, "payment: {payment}");
        assert!(monthly_payment(200_000.0, 0.0, u32::MAX) > 0.0);

        let summary = loan_summary(200_000.0, 6.0, u32::MAX);
        assert!(summary.total_paid.is_finite());
        assert!(remaining_balance(200_000.0, 6.0, u32::MAX, 3_000_000_000) > 0.0);
    }

    #[test]
    fn test_empty_schedule() {
        assert!(amortization_schedule(0.0, 5.0, 30).is_empty());
        assert!(yearly_summary(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn payment_grows_with_rate(
            principal in 1_000.0f64..2_000_000.0,
            rate in 0.0f64..15.0,
            years in 1u32..40,
        ) {
            let low = monthly_payment(principal, rate, years);
            let high = monthly_payment(principal, rate + 0.5, years);
            prop_assert!(high > low);
            prop_assert!(low * (years * 12) as f64 >= principal - 1e-6);
        }
    }
}
