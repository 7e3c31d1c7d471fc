//! Deal inputs and analysis result types.

use chrono::{DateTime, Utc};
use rei_common::config::CalculatorDefaults;
use rei_common::validation::{
    check_non_negative, check_percentage, check_range, ValidationError, Validator,
};
use rei_common::{Validate, ValidationResult};
use serde::{Deserialize, Serialize};

use crate::brrrr::{TemporaryFinancingAnalysis, TemporaryFinancingInputs};
use crate::finance::operating::{ExpenseInputs, ExpenseLine, IncomeInputs};
use crate::projection::{Projection, ProjectionInputs};

pub use crate::finance::mortgage::MAX_TERM_YEARS;

// ============================================================================
// Inputs
// ============================================================================

/// Acquisition inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyInputs {
    pub purchase_price: f64,
    /// Buyer closing costs at purchase
    pub closing_costs: f64,
    pub rehab_costs: f64,
    /// Estimated value after renovation (0 when unknown)
    pub after_repair_value: f64,
}

impl PropertyInputs {
    /// Purchase price plus closing and rehab.
    pub fn all_in_cost(&self) -> f64 {
        self.purchase_price + self.closing_costs + self.rehab_costs
    }
}

/// Conventional (long-term) financing inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancingInputs {
    pub down_payment_pct: f64,
    pub interest_rate_pct: f64,
    pub term_years: u32,
}

impl Default for FinancingInputs {
    fn default() -> Self {
        Self {
            down_payment_pct: 20.0,
            interest_rate_pct: 7.0,
            term_years: 30,
        }
    }
}

/// Everything the calculator form collects for one deal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealInputs {
    pub name: String,
    pub address: String,
    pub notes: String,
    pub property: PropertyInputs,
    pub financing: FinancingInputs,
    pub income: IncomeInputs,
    pub expenses: ExpenseInputs,
    /// Present when the deal is bought on short-term money and refinanced
    pub temporary_financing: Option<TemporaryFinancingInputs>,
    /// Present when a multi-year hold should be projected
    pub projection: Option<ProjectionInputs>,
}

impl DealInputs {
    /// Blank deal pre-filled with configured expense defaults.
    pub fn with_defaults(defaults: &CalculatorDefaults) -> Self {
        Self {
            income: IncomeInputs {
                vacancy_rate_pct: defaults.vacancy_rate_pct,
                ..IncomeInputs::default()
            },
            expenses: ExpenseInputs {
                maintenance_pct: defaults.maintenance_pct,
                management_pct: defaults.management_pct,
                capex_pct: defaults.capex_pct,
                ..ExpenseInputs::default()
            },
            projection: Some(ProjectionInputs {
                selling_costs_pct: defaults.selling_costs_pct,
                ..ProjectionInputs::default()
            }),
            ..Self::default()
        }
    }

    /// Whether this is a BRRRR deal.
    pub fn uses_temporary_financing(&self) -> bool {
        self.temporary_financing.is_some()
    }
}

// ============================================================================
// Validation
// ============================================================================

impl Validate for PropertyInputs {
    fn validate(&self) -> ValidationResult<()> {
        Validator::new()
            .check(check_non_negative("property.purchase_price", self.purchase_price))
            .check(check_non_negative("property.closing_costs", self.closing_costs))
            .check(check_non_negative("property.rehab_costs", self.rehab_costs))
            .check(check_non_negative(
                "property.after_repair_value",
                self.after_repair_value,
            ))
            .finish()
    }
}

impl Validate for FinancingInputs {
    fn validate(&self) -> ValidationResult<()> {
        let mut v = Validator::new();
        v.check(check_percentage("financing.down_payment_pct", self.down_payment_pct))
            .check(check_percentage("financing.interest_rate_pct", self.interest_rate_pct));
        if self.term_years > MAX_TERM_YEARS {
            v.check(Err(ValidationError::OutOfRange {
                field: "financing.term_years".into(),
                value: self.term_years as f64,
                min: 0.0,
                max: MAX_TERM_YEARS as f64,
            }));
        }
        v.finish()
    }
}

impl Validate for IncomeInputs {
    fn validate(&self) -> ValidationResult<()> {
        Validator::new()
            .check(check_non_negative("income.monthly_rent", self.monthly_rent))
            .check(check_non_negative(
                "income.other_monthly_income",
                self.other_monthly_income,
            ))
            .check(check_percentage("income.vacancy_rate_pct", self.vacancy_rate_pct))
            .finish()
    }
}

impl Validate for ExpenseInputs {
    fn validate(&self) -> ValidationResult<()> {
        Validator::new()
            .check(check_non_negative(
                "expenses.property_tax_annual",
                self.property_tax_annual,
            ))
            .check(check_non_negative("expenses.insurance_annual", self.insurance_annual))
            .check(check_non_negative("expenses.hoa_monthly", self.hoa_monthly))
            .check(check_non_negative("expenses.utilities_monthly", self.utilities_monthly))
            .check(check_non_negative("expenses.other_monthly", self.other_monthly))
            .check(check_percentage("expenses.maintenance_pct", self.maintenance_pct))
            .check(check_percentage("expenses.management_pct", self.management_pct))
            .check(check_percentage("expenses.capex_pct", self.capex_pct))
            .finish()
    }
}

impl Validate for TemporaryFinancingInputs {
    fn validate(&self) -> ValidationResult<()> {
        let mut v = Validator::new();
        v.check(check_non_negative(
            "temporary_financing.loan_amount",
            self.loan_amount,
        ))
        .check(check_percentage(
            "temporary_financing.interest_rate_pct",
            self.interest_rate_pct,
        ))
        .check(check_percentage("temporary_financing.points_pct", self.points_pct))
        // Above 100% is allowed and flagged as a warning by the analysis.
        .check(check_non_negative(
            "temporary_financing.refinance_ltv_pct",
            self.refinance_ltv_pct,
        ))
        .check(check_percentage(
            "temporary_financing.refinance_rate_pct",
            self.refinance_rate_pct,
        ))
        .check(check_non_negative(
            "temporary_financing.refinance_closing_costs",
            self.refinance_closing_costs,
        ));
        if self.refinance_term_years == 0 || self.refinance_term_years > MAX_TERM_YEARS {
            v.check(Err(ValidationError::OutOfRange {
                field: "temporary_financing.refinance_term_years".into(),
                value: self.refinance_term_years as f64,
                min: 1.0,
                max: MAX_TERM_YEARS as f64,
            }));
        }
        v.finish()
    }
}

impl Validate for ProjectionInputs {
    fn validate(&self) -> ValidationResult<()> {
        let mut v = Validator::new();
        v.check(check_range("projection.appreciation_pct", self.appreciation_pct, -100.0, 100.0))
            .check(check_range("projection.rent_growth_pct", self.rent_growth_pct, -100.0, 100.0))
            .check(check_range(
                "projection.expense_growth_pct",
                self.expense_growth_pct,
                -100.0,
                100.0,
            ))
            .check(check_percentage(
                "projection.selling_costs_pct",
                self.selling_costs_pct,
            ));
        if self.hold_years > MAX_TERM_YEARS {
            v.check(Err(ValidationError::OutOfRange {
                field: "projection.hold_years".into(),
                value: self.hold_years as f64,
                min: 0.0,
                max: MAX_TERM_YEARS as f64,
            }));
        }
        v.finish()
    }
}

impl Validate for DealInputs {
    fn validate(&self) -> ValidationResult<()> {
        let mut v = Validator::new();
        v.nested(self.property.validate())
            .nested(self.financing.validate())
            .nested(self.income.validate())
            .nested(self.expenses.validate());

        // A conventional loan needs a term to amortize over.
        if self.temporary_financing.is_none()
            && self.financing.down_payment_pct < 100.0
            && self.property.purchase_price > 0.0
            && self.financing.term_years == 0
        {
            v.check(Err(ValidationError::InvalidValue {
                field: "financing.term_years".into(),
                reason: "must be at least 1 when a loan is financed".into(),
            }));
        }

        if let Some(ref temporary) = self.temporary_financing {
            v.nested(temporary.validate());
        }
        if let Some(ref projection) = self.projection {
            v.nested(projection.validate());
        }
        v.finish()
    }
}

// ============================================================================
// Result
// ============================================================================

/// How the deal is financed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Down payment plus a long-term mortgage
    Conventional,
    /// Short-term loan, rehab, cash-out refinance
    Brrrr,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conventional => write!(f, "Conventional"),
            Self::Brrrr => write!(f, "BRRRR"),
        }
    }
}

/// Every derived metric for a deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealAnalysis {
    pub name: String,
    pub strategy: Strategy,

    // === Acquisition ===
    /// Purchase + closing + rehab
    pub all_in_cost: f64,
    /// Conventional down payment (None for BRRRR)
    pub down_payment: Option<f64>,
    /// Cash the investor puts in up front
    pub initial_cash_invested: f64,
    /// Cash still in the deal once stabilised (after any refinance)
    pub total_cash_invested: f64,

    // === Permanent loan ===
    pub loan_amount: f64,
    pub interest_rate_pct: f64,
    pub term_years: u32,
    pub monthly_payment: f64,

    // === Operations (monthly unless annual) ===
    pub gross_monthly_income: f64,
    pub vacancy_loss: f64,
    pub effective_gross_income: f64,
    pub monthly_operating_expenses: f64,
    pub expense_breakdown: Vec<ExpenseLine>,
    /// Annual NOI
    pub net_operating_income: f64,
    pub monthly_cash_flow: f64,
    pub annual_cash_flow: f64,

    // === Ratios ===
    /// Cap rate on purchase price (%)
    pub cap_rate: f64,
    /// Cap rate on ARV (%), when ARV is known
    pub cap_rate_on_arv: Option<f64>,
    /// Cash-on-cash ROI (%); None means no cash left in the deal
    pub cash_on_cash_roi: Option<f64>,
    pub debt_service_coverage: Option<f64>,
    pub gross_rent_multiplier: Option<f64>,
    pub break_even_occupancy: Option<f64>,
    pub meets_one_percent_rule: bool,

    // === Optional sections ===
    pub temporary_financing: Option<TemporaryFinancingAnalysis>,
    pub projection: Option<Projection>,

    /// Advisory warnings, financing first
    pub warnings: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}
