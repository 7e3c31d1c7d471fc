//! Printable deal report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{DealAnalysis, DealInputs};
use crate::format::{money, percent, percent_or_na};
use crate::sanitize::escape_html;

/// Deal report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealReport {
    /// Report title (escaped)
    pub title: String,
    /// Property address (escaped)
    pub address: String,
    /// Headline numbers
    pub summary: ReportSummary,
    pub generated_at: DateTime<Utc>,
    /// Markdown report
    pub text_report: String,
}

/// Headline numbers for the top of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub strategy: String,
    pub all_in_cost: f64,
    pub cash_invested: f64,
    pub monthly_cash_flow: f64,
    pub annual_cash_flow: f64,
    pub net_operating_income: f64,
    pub cap_rate: f64,
    pub cash_on_cash_roi: Option<f64>,
}

impl DealReport {
    /// Generate a report from a deal and its analysis.
    pub fn generate(inputs: &DealInputs, analysis: &DealAnalysis) -> Self {
        let title = if inputs.name.trim().is_empty() {
            "Rental Property Analysis".to_string()
        } else {
            escape_html(&inputs.name)
        };
        let address = escape_html(&inputs.address);

        let summary = ReportSummary {
            strategy: analysis.strategy.to_string(),
            all_in_cost: analysis.all_in_cost,
            cash_invested: analysis.total_cash_invested,
            monthly_cash_flow: analysis.monthly_cash_flow,
            annual_cash_flow: analysis.annual_cash_flow,
            net_operating_income: analysis.net_operating_income,
            cap_rate: analysis.cap_rate,
            cash_on_cash_roi: analysis.cash_on_cash_roi,
        };

        let text_report = Self::format_text_report(&title, &address, inputs, analysis);

        Self {
            title,
            address,
            summary,
            generated_at: analysis.analyzed_at,
            text_report,
        }
    }

    fn format_text_report(
        title: &str,
        address: &str,
        inputs: &DealInputs,
        a: &DealAnalysis,
    ) -> String {
        let mut report = String::new();

        report.push_str(&format!("# {title}\n\n"));
        if !address.is_empty() {
            report.push_str(&format!("{address}\n\n"));
        }
        report.push_str(&format!(
            "_Strategy: {} | Generated {}_\n\n",
            a.strategy,
            a.analyzed_at.format("%Y-%m-%d %H:%M UTC")
        ));

        // Summary
        report.push_str("## Summary\n\n");
        report.push_str("| Metric | Value |\n|---|---:|\n");
        let roi = if a.total_cash_invested <= 0.0 && a.annual_cash_flow > 0.0 {
            "Infinite (no cash left in deal)".to_string()
        } else {
            percent_or_na(a.cash_on_cash_roi)
        };
        let rows = [
            ("All-in cost", money(a.all_in_cost)),
            ("Cash invested", money(a.total_cash_invested)),
            ("Loan amount", money(a.loan_amount)),
            ("Monthly payment", money(a.monthly_payment)),
            ("Monthly cash flow", money(a.monthly_cash_flow)),
            ("Annual cash flow", money(a.annual_cash_flow)),
            ("Cap rate", percent(a.cap_rate)),
            ("Cash-on-cash ROI", roi),
            (
                "DSCR",
                a.debt_service_coverage
                    .map(|d| format!("{d:.2}"))
                    .unwrap_or_else(|| "n/a".to_string()),
            ),
            (
                "1% rule",
                if a.meets_one_percent_rule { "Pass" } else { "Fail" }.to_string(),
            ),
        ];
        for (label, value) in rows {
            report.push_str(&format!("| {label} | {value} |\n"));
        }
        if let Some(cap) = a.cap_rate_on_arv {
            report.push_str(&format!("| Cap rate on ARV | {} |\n", percent(cap)));
        }
        report.push('\n');

        // Operating statement
        report.push_str("## Operating Statement (monthly)\n\n");
        report.push_str("| Line | Amount |\n|---|---:|\n");
        report.push_str(&format!("| Gross income | {} |\n", money(a.gross_monthly_income)));
        report.push_str(&format!("| Vacancy | {} |\n", money(-a.vacancy_loss)));
        report.push_str(&format!(
            "| Effective gross income | {} |\n",
            money(a.effective_gross_income)
        ));
        for line in &a.expense_breakdown {
            report.push_str(&format!("| {} | {} |\n", line.label, money(-line.monthly)));
        }
        report.push_str(&format!(
            "| Net operating income | {} |\n",
            money(a.net_operating_income / 12.0)
        ));
        report.push_str(&format!("| Debt service | {} |\n", money(-a.monthly_payment)));
        report.push_str(&format!("| **Cash flow** | **{}** |\n\n", money(a.monthly_cash_flow)));

        // BRRRR
        if let Some(t) = &a.temporary_financing {
            report.push_str("## Temporary Financing\n\n");
            report.push_str("| Line | Amount |\n|---|---:|\n");
            report.push_str(&format!("| Short-term loan | {} |\n", money(t.loan_amount)));
            report.push_str(&format!("| Interest cost | {} |\n", money(t.interest_cost)));
            report.push_str(&format!("| Points | {} |\n", money(t.points_cost)));
            report.push_str(&format!("| Total project cost | {} |\n", money(t.total_project_cost)));
            report.push_str(&format!(
                "| Invested capital | {} |\n",
                money(t.total_invested_capital)
            ));
            report.push_str(&format!("| Refinance loan | {} |\n", money(t.refinance_amount)));
            report.push_str(&format!("| Cash out | {} |\n", money(t.cash_out)));
            report.push_str(&format!("| Cash left in deal | {} |\n", money(t.cash_left_in_deal)));
            if t.excess_cash_out > 0.0 {
                report.push_str(&format!("| Excess cash out | {} |\n", money(t.excess_cash_out)));
            }
            report.push_str(&format!(
                "| Capital recovered | {} |\n",
                percent(t.capital_recovered_pct)
            ));
            if let Some(date) = t.analysis_start_date {
                report.push_str(&format!("| Rental analysis starts | {date} |\n"));
            }
            report.push('\n');
        }

        // Projection
        if let Some(p) = &a.projection {
            report.push_str(&format!("## {}-Year Projection\n\n", p.years.len()));
            report.push_str("| Year | NOI | Cash flow | Value | Loan | Equity |\n");
            report.push_str("|---:|---:|---:|---:|---:|---:|\n");
            for y in &p.years {
                report.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    y.year,
                    money(y.net_operating_income),
                    money(y.cash_flow),
                    money(y.property_value),
                    money(y.loan_balance),
                    money(y.equity)
                ));
            }
            report.push('\n');
            report.push_str(&format!("- Net sale proceeds: {}\n", money(p.net_sale_proceeds)));
            report.push_str(&format!("- IRR: {}\n", percent_or_na(p.irr)));
            report.push_str(&format!(
                "- NPV at {}: {}\n",
                percent(p.discount_rate_pct),
                money(p.npv)
            ));
            if let Some(m) = p.equity_multiple {
                report.push_str(&format!("- Equity multiple: {m:.2}x\n"));
            }
            report.push('\n');
        }

        // Warnings
        if !a.warnings.is_empty() {
            report.push_str("## Warnings\n\n");
            for warning in &a.warnings {
                report.push_str(&format!("- {warning}\n"));
            }
            report.push('\n');
        }

        if !inputs.notes.trim().is_empty() {
            report.push_str("## Notes\n\n");
            report.push_str(&escape_html(&inputs.notes));
            report.push('\n');
        }

        report
    }
}

// ============================================================================
// Tests
// ============================================================================
