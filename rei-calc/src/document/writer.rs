//! Markdown writer.

use std::fmt::Write;

use crate::analysis::DealInputs;
use crate::format::money;

pub(super) const TITLE: &str = "# Rental Property Analysis";

/// Render a deal as an editable markdown document.
pub fn to_markdown(deal: &DealInputs) -> String {
    let mut doc = Doc::default();
    doc.line(TITLE);
    doc.blank();
    doc.text("Name", &deal.name);
    doc.text("Address", &deal.address);

    let p = &deal.property;
    doc.section("Property");
    doc.money("Purchase Price", p.purchase_price);
    doc.money("Closing Costs", p.closing_costs);
    doc.money("Rehab Costs", p.rehab_costs);
    doc.money("After Repair Value", p.after_repair_value);

    let f = &deal.financing;
    doc.section("Financing");
    doc.percent("Down Payment", f.down_payment_pct);
    doc.percent("Interest Rate", f.interest_rate_pct);
    doc.count("Term (years)", f.term_years);

    let i = &deal.income;
    doc.section("Income");
    doc.money("Monthly Rent", i.monthly_rent);
    doc.money("Other Monthly Income", i.other_monthly_income);
    doc.percent("Vacancy Rate", i.vacancy_rate_pct);

    let e = &deal.expenses;
    doc.section("Expenses");
    doc.money("Property Tax (annual)", e.property_tax_annual);
    doc.money("Insurance (annual)", e.insurance_annual);
    doc.money("HOA (monthly)", e.hoa_monthly);
    doc.money("Utilities (monthly)", e.utilities_monthly);
    doc.money("Other (monthly)", e.other_monthly);
    doc.percent("Maintenance", e.maintenance_pct);
    doc.percent("Management", e.management_pct);
    doc.percent("CapEx", e.capex_pct);

    if let Some(t) = &deal.temporary_financing {
        doc.section("Temporary Financing");
        doc.money("Loan Amount", t.loan_amount);
        doc.percent("Interest Rate", t.interest_rate_pct);
        doc.percent("Points", t.points_pct);
        doc.count("Holding Months", t.holding_months);
        doc.percent("Refinance LTV", t.refinance_ltv_pct);
        doc.percent("Refinance Rate", t.refinance_rate_pct);
        doc.count("Refinance Term (years)", t.refinance_term_years);
        doc.money("Refinance Closing Costs", t.refinance_closing_costs);
        let date = t
            .purchase_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        doc.text("Purchase Date", &date);
    }

    if let Some(proj) = &deal.projection {
        doc.section("Projection");
        doc.count("Hold Years", proj.hold_years);
        doc.percent("Appreciation", proj.appreciation_pct);
        doc.percent("Rent Growth", proj.rent_growth_pct);
        doc.percent("Expense Growth", proj.expense_growth_pct);
        doc.percent("Selling Costs", proj.selling_costs_pct);
    }

    doc.section("Notes");
    if !deal.notes.is_empty() {
        doc.line(&deal.notes);
    }

    doc.finish()
}

#[derive(Default)]
struct Doc {
    out: String,
}

impl Doc {
    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn section(&mut self, title: &str) {
        let _ = write!(self.out, "\n## {title}\n\n");
    }

    fn text(&mut self, label: &str, value: &str) {
        // Field values are single-line.
        let value = value.replace(['\r', '\n'], " ");
        let _ = writeln!(self.out, "- {label}: {value}");
    }

    // Fall back to the exact value when the cents display would change it.
    fn money(&mut self, label: &str, value: f64) {
        let display = money(value);
        let exact = display.replace(['$', ','], "").parse::<f64>().ok() == Some(value);
        if exact {
            let _ = writeln!(self.out, "- {label}: {display}");
        } else {
            let _ = writeln!(self.out, "- {label}: ${value}");
        }
    }

    // Shortest exact representation, so rates survive a round trip.
    fn percent(&mut self, label: &str, value: f64) {
        let _ = writeln!(self.out, "- {label}: {value}%");
    }

    fn count(&mut self, label: &str, value: u32) {
        let _ = writeln!(self.out, "- {label}: {value}");
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brrrr::TemporaryFinancingInputs;

    #[test]
    fn test_sections_in_order() {
        let deal = DealInputs {
            name: "Elm Duplex".into(),
            temporary_financing: Some(TemporaryFinancingInputs::default()),
            ..DealInputs::default()
        };
        let md = to_markdown(&deal);

        assert!(md.starts_with(TITLE));
        assert!(md.contains("- Name: Elm Duplex\n"));
        let order = [
            "## Property",
            "## Financing",
            "## Income",
            "## Expenses",
            "## Temporary Financing",
            "## Notes",
        ];
        let positions: Vec<usize> = order.iter().map(|h| md.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!md.contains("## Projection"));
    }

    #[test]
    fn test_values_are_decorated() {
        let mut deal = DealInputs::default();
        deal.property.purchase_price = 185_000.0;
        deal.financing.interest_rate_pct = 6.875;
        let md = to_markdown(&deal);

        assert!(md.contains("- Purchase Price: $185,000.00\n"));
        assert!(md.contains("- Interest Rate: 6.875%\n"));
        assert!(md.contains("- Term (years): 30\n"));
    }

    #[test]
    fn test_money_keeps_exact_value() {
        let mut deal = DealInputs::default();
        deal.property.purchase_price = 1e20;
        deal.property.rehab_costs = 1_234.567;
        deal.income.monthly_rent = 1_450.5;
        let md = to_markdown(&deal);

        assert!(md.contains("- Purchase Price: $100000000000000000000.00\n"));
        assert!(md.contains("- Rehab Costs: $1234.567\n"));
        assert!(md.contains("- Monthly Rent: $1,450.50\n"));
    }

    #[test]
    fn test_text_fields_stay_on_one_line() {
        let deal = DealInputs {
            address: "12 Oak St\nUnit 2".into(),
            ..DealInputs::default()
        };
        assert!(to_markdown(&deal).contains("- Address: 12 Oak St Unit 2\n"));
    }
}
