//! Time-value-of-money helpers: NPV, IRR and equity multiple.
//!
//! Cash flows are yearly, with index 0 at time zero (usually the negative
//! initial investment). Rates are percentages.

const NEWTON_MAX_ITERATIONS: u32 = 100;
const BISECTION_MAX_ITERATIONS: u32 = 200;
const TOLERANCE: f64 = 1e-7;
/// Lower bound for the bisection search, as a decimal rate.
const MIN_RATE: f64 = -0.9999;
/// Upper bound for the bisection search, as a decimal rate.
const MAX_RATE: f64 = 10.0;

/// Net present value at `rate_pct`.
pub fn npv(rate_pct: f64, cash_flows: &[f64]) -> f64 {
    npv_decimal(rate_pct / 100.0, cash_flows)
}

fn npv_decimal(rate: f64, cash_flows: &[f64]) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// d(NPV)/d(rate)
fn npv_derivative(rate: f64, cash_flows: &[f64]) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, cf)| -(t as f64) * cf / (1.0 + rate).powi(t as i32 + 1))
        .sum()
}

/// Internal rate of return (%).
///
/// `None` when the flows never change sign or no root is found in
/// (-99.99%, 1000%).
pub fn irr(cash_flows: &[f64]) -> Option<f64> {
    let has_positive = cash_flows.iter().any(|cf| *cf > 0.0);
    let has_negative = cash_flows.iter().any(|cf| *cf < 0.0);
    if !has_positive || !has_negative {
        return None;
    }

    newton(cash_flows)
        .or_else(|| bisection(cash_flows))
        .map(|rate| rate * 100.0)
}

fn newton(cash_flows: &[f64]) -> Option<f64> {
    let mut rate = 0.1;
    for _ in 0..NEWTON_MAX_ITERATIONS {
        let value = npv_decimal(rate, cash_flows);
        if value.abs() < TOLERANCE {
            return Some(rate);
        }
        let slope = npv_derivative(rate, cash_flows);
        if slope == 0.0 || !slope.is_finite() {
            return None;
        }
        let next = rate - value / slope;
        if !next.is_finite() || next <= MIN_RATE || next > MAX_RATE {
            return None;
        }
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }
    None
}

fn bisection(cash_flows: &[f64]) -> Option<f64> {
    let mut low = MIN_RATE;
    let mut high = MAX_RATE;
    let mut f_low = npv_decimal(low, cash_flows);
    let f_high = npv_decimal(high, cash_flows);
    if f_low.signum() == f_high.signum() {
        return None;
    }

    for _ in 0..BISECTION_MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let f_mid = npv_decimal(mid, cash_flows);
        if f_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }
        if f_mid.signum() == f_low.signum() {
            low = mid;
            f_low = f_mid;
        } else {
            high = mid;
        }
    }
    Some((low + high) / 2.0)
}

/// Total distributions over total contributions.
pub fn equity_multiple(cash_flows: &[f64]) -> Option<f64> {
    let invested: f64 = cash_flows.iter().filter(|cf| **cf < 0.0).map(|cf| -cf).sum();
    let returned: f64 = cash_flows.iter().filter(|cf| **cf > 0.0).sum();
    (invested > 0.0).then(|| returned / invested)
}
