//! Number formatting shared by documents and reports.

/// Largest cent count an `f64` holds exactly (2^53).
const MAX_EXACT_CENTS: f64 = 9_007_199_254_740_992.0;

/// `$1,234.56`, with a leading minus for negatives.
///
/// Amounts too large to count in whole cents are printed ungrouped.
pub fn money(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let scaled = (value.abs() * 100.0).round();
    if scaled > MAX_EXACT_CENTS {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}${:.2}", value.abs());
    }
    let cents = scaled as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// Percentage with two decimals, e.g. `8.25%`.
pub fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Optional percentage; `n/a` when undefined.
pub fn percent_or_na(value: Option<f64>) -> String {
    value.map(percent).unwrap_or_else(|| "n/a".to_string())
}

fn group_thousands(mut whole: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if whole < 1_000 {
            groups.push(whole.to_string());
            break;
        }
        groups.push(format!("{:03}", whole % 1_000));
        whole /= 1_000;
    }
    groups.reverse();
    groups.join(",")
}
