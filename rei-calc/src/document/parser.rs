//! Tolerant markdown reader.
//!
//! Reads `- Label: value` lines under `## Section` headings. Labels are
//! matched case-insensitively ignoring punctuation, values may carry `$`,
//! `,` and `%` decorations, and anything unrecognized is skipped. Everything
//! after `## Notes` is taken verbatim as the notes.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{sanitize_fields, DocumentError};
use crate::analysis::DealInputs;
use crate::brrrr::TemporaryFinancingInputs;
use crate::projection::ProjectionInputs;

static SECTION_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^##\s+(.+?)\s*#*\s*$").unwrap());
static FIELD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*+]\s+([^:]+?)\s*:\s*(.*?)\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Property,
    Financing,
    Income,
    Expenses,
    TemporaryFinancing,
    Projection,
    Notes,
    Unknown,
}

impl Section {
    fn from_heading(heading: &str) -> Self {
        match normalize(heading).as_str() {
            "property" | "purchase" | "acquisition" => Self::Property,
            "financing" | "loan" | "mortgage" => Self::Financing,
            "income" => Self::Income,
            "expenses" | "operatingexpenses" => Self::Expenses,
            "temporaryfinancing" | "brrrr" | "hardmoney" => Self::TemporaryFinancing,
            "projection" | "holdprojection" => Self::Projection,
            "notes" => Self::Notes,
            _ => Self::Unknown,
        }
    }
}

/// One `- Label: value` line.
struct Field<'a> {
    line: usize,
    label: &'a str,
    value: &'a str,
}

impl Field<'_> {
    /// `None` when the value is blank.
    fn number(&self) -> Result<Option<f64>, DocumentError> {
        let cleaned: String = self
            .value
            .chars()
            .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return Ok(None);
        }
        cleaned
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| self.invalid_number())
    }

    fn whole(&self) -> Result<Option<u32>, DocumentError> {
        match self.number()? {
            None => Ok(None),
            Some(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Ok(Some(v as u32)),
            Some(_) => Err(self.invalid_number()),
        }
    }

    fn date(&self) -> Result<Option<NaiveDate>, DocumentError> {
        if self.value.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(self.value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| DocumentError::InvalidDate {
                line: self.line,
                value: self.value.to_string(),
            })
    }

    fn invalid_number(&self) -> DocumentError {
        DocumentError::InvalidNumber {
            line: self.line,
            label: self.label.to_string(),
            value: self.value.to_string(),
        }
    }
}

fn set(target: &mut f64, value: Option<f64>) {
    if let Some(v) = value {
        *target = v;
    }
}

fn set_whole(target: &mut u32, value: Option<u32>) {
    if let Some(v) = value {
        *target = v;
    }
}

/// Lowercase alphanumerics only: `Term (years)` -> `termyears`.
fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse a deal document.
pub fn from_markdown(text: &str) -> Result<DealInputs, DocumentError> {
    if text.trim().is_empty() {
        return Err(DocumentError::Empty);
    }

    let mut deal = DealInputs::default();
    let mut section = Section::Preamble;
    let mut notes: Vec<&str> = Vec::new();
    let mut skipped = 0usize;

    for (index, raw) in text.lines().enumerate() {
        if section == Section::Notes {
            notes.push(raw);
            continue;
        }

        let line = raw.trim();
        if let Some(caps) = SECTION_PATTERN.captures(line) {
            section = Section::from_heading(&caps[1]);
            match section {
                Section::TemporaryFinancing => {
                    deal.temporary_financing
                        .get_or_insert_with(TemporaryFinancingInputs::default);
                }
                Section::Projection => {
                    deal.projection.get_or_insert_with(ProjectionInputs::default);
                }
                Section::Unknown => {
                    tracing::debug!(line = index + 1, heading = &caps[1], "Skipping unknown section");
                }
                _ => {}
            }
            continue;
        }

        let Some(caps) = FIELD_PATTERN.captures(line) else {
            continue;
        };
        let (Some(label), Some(value)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let field = Field {
            line: index + 1,
            label: label.as_str(),
            value: value.as_str(),
        };
        if !apply_field(&mut deal, section, &normalize(field.label), &field)? {
            skipped += 1;
        }
    }

    deal.notes = notes.join("\n");
    sanitize_fields(&mut deal);

    if skipped > 0 {
        tracing::debug!(skipped, "Ignored unrecognized document fields");
    }
    Ok(deal)
}

/// Apply one field; `false` when the label is not recognized.
fn apply_field(
    deal: &mut DealInputs,
    section: Section,
    key: &str,
    field: &Field<'_>,
) -> Result<bool, DocumentError> {
    match section {
        Section::Preamble => match key {
            "name" | "deal" | "dealname" => deal.name = field.value.to_string(),
            "address" | "propertyaddress" => deal.address = field.value.to_string(),
            _ => return Ok(false),
        },
        Section::Property => {
            let p = &mut deal.property;
            match key {
                "purchaseprice" | "price" => set(&mut p.purchase_price, field.number()?),
                "closingcosts" => set(&mut p.closing_costs, field.number()?),
                "rehabcosts" | "rehab" | "repaircosts" => set(&mut p.rehab_costs, field.number()?),
                "afterrepairvalue" | "arv" => set(&mut p.after_repair_value, field.number()?),
                _ => return Ok(false),
            }
        }
        Section::Financing => {
            let f = &mut deal.financing;
            match key {
                "downpayment" | "downpaymentpct" => set(&mut f.down_payment_pct, field.number()?),
                "interestrate" | "rate" => set(&mut f.interest_rate_pct, field.number()?),
                "termyears" | "term" | "loanterm" => set_whole(&mut f.term_years, field.whole()?),
                _ => return Ok(false),
            }
        }
        Section::Income => {
            let i = &mut deal.income;
            match key {
                "monthlyrent" | "rent" => set(&mut i.monthly_rent, field.number()?),
                "othermonthlyincome" | "otherincome" => {
                    set(&mut i.other_monthly_income, field.number()?)
                }
                "vacancyrate" | "vacancy" => set(&mut i.vacancy_rate_pct, field.number()?),
                _ => return Ok(false),
            }
        }
        Section::Expenses => {
            let e = &mut deal.expenses;
            match key {
                "propertytaxannual" | "propertytax" | "taxes" => {
                    set(&mut e.property_tax_annual, field.number()?)
                }
                "insuranceannual" | "insurance" => set(&mut e.insurance_annual, field.number()?),
                "hoamonthly" | "hoa" => set(&mut e.hoa_monthly, field.number()?),
                "utilitiesmonthly" | "utilities" => set(&mut e.utilities_monthly, field.number()?),
                "othermonthly" | "other" => set(&mut e.other_monthly, field.number()?),
                "maintenance" => set(&mut e.maintenance_pct, field.number()?),
                "management" | "propertymanagement" => set(&mut e.management_pct, field.number()?),
                "capex" | "capitalexpenditures" => set(&mut e.capex_pct, field.number()?),
                _ => return Ok(false),
            }
        }
        Section::TemporaryFinancing => {
            let Some(t) = deal.temporary_financing.as_mut() else {
                return Ok(false);
            };
            match key {
                "loanamount" => set(&mut t.loan_amount, field.number()?),
                "interestrate" | "rate" => set(&mut t.interest_rate_pct, field.number()?),
                "points" => set(&mut t.points_pct, field.number()?),
                "holdingmonths" | "holdingperiod" => set_whole(&mut t.holding_months, field.whole()?),
                "refinanceltv" | "ltv" => set(&mut t.refinance_ltv_pct, field.number()?),
                "refinancerate" => set(&mut t.refinance_rate_pct, field.number()?),
                "refinancetermyears" | "refinanceterm" => {
                    set_whole(&mut t.refinance_term_years, field.whole()?)
                }
                "refinanceclosingcosts" => set(&mut t.refinance_closing_costs, field.number()?),
                "purchasedate" => t.purchase_date = field.date()?,
                _ => return Ok(false),
            }
        }
        Section::Projection => {
            let Some(p) = deal.projection.as_mut() else {
                return Ok(false);
            };
            match key {
                "holdyears" | "holdperiod" => set_whole(&mut p.hold_years, field.whole()?),
                "appreciation" => set(&mut p.appreciation_pct, field.number()?),
                "rentgrowth" => set(&mut p.rent_growth_pct, field.number()?),
                "expensegrowth" => set(&mut p.expense_growth_pct, field.number()?),
                "sellingcosts" => set(&mut p.selling_costs_pct, field.number()?),
                _ => return Ok(false),
            }
        }
        Section::Notes | Section::Unknown => return Ok(false),
    }
    Ok(true)
}
