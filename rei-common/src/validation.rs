//! Validation primitives.
//!
//! Provides the `Validate` trait, a shared error type, and field checks used
//! by configuration and by deal inputs.

use thiserror::Error;

use crate::config::{CalculatorDefaults, Config, ObservabilityConfig};

/// Validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{}", join_messages(.0))]
    Multiple(Vec<ValidationError>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Field names this error refers to.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::MissingField { field }
            | Self::InvalidValue { field, .. }
            | Self::OutOfRange { field, .. } => vec![field.as_str()],
            Self::Multiple(errors) => errors.iter().flat_map(|e| e.fields()).collect(),
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable types.
pub trait Validate {
    /// Validate this value.
    fn validate(&self) -> ValidationResult<()>;
}

/// Collects field errors and folds them into a single result.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a check.
    pub fn check(&mut self, result: ValidationResult<()>) -> &mut Self {
        if let Err(e) = result {
            self.errors.push(e);
        }
        self
    }

    /// Record a nested validation, flattening its errors.
    pub fn nested(&mut self, result: ValidationResult<()>) -> &mut Self {
        match result {
            Ok(()) => {}
            Err(ValidationError::Multiple(errors)) => self.errors.extend(errors),
            Err(e) => self.errors.push(e),
        }
        self
    }

    /// One error stays as-is, several are wrapped in `Multiple`.
    pub fn finish(&mut self) -> ValidationResult<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ValidationError::Multiple(std::mem::take(&mut self.errors))),
        }
    }
}

/// Value must be a finite number.
pub fn check_finite(field: &str, value: f64) -> ValidationResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.into(),
            reason: "must be a finite number".into(),
        })
    }
}

/// Value must be a finite number greater than or equal to zero.
pub fn check_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.into(),
            reason: format!("must not be negative, got {value}"),
        });
    }
    Ok(())
}

/// Value must lie in `min..=max`.
pub fn check_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    check_finite(field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Value is a percentage in `0..=100`.
pub fn check_percentage(field: &str, value: f64) -> ValidationResult<()> {
    check_range(field, value, 0.0, 100.0)
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        let mut v = Validator::new();
        if !LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            v.check(Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of {}", LEVELS.join(", ")),
            }));
        }
        if self.log_format != "json" && self.log_format != "pretty" {
            v.check(Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: "must be \"json\" or \"pretty\"".into(),
            }));
        }
        v.finish()
    }
}

impl Validate for CalculatorDefaults {
    fn validate(&self) -> ValidationResult<()> {
        Validator::new()
            .check(check_percentage("calculator.vacancy_rate_pct", self.vacancy_rate_pct))
            .check(check_percentage("calculator.maintenance_pct", self.maintenance_pct))
            .check(check_percentage("calculator.management_pct", self.management_pct))
            .check(check_percentage("calculator.capex_pct", self.capex_pct))
            .check(check_percentage(
                "calculator.max_refinance_ltv_pct",
                self.max_refinance_ltv_pct,
            ))
            .check(check_percentage("calculator.max_points_pct", self.max_points_pct))
            .check(check_percentage("calculator.discount_rate_pct", self.discount_rate_pct))
            .check(check_percentage("calculator.selling_costs_pct", self.selling_costs_pct))
            .finish()
    }
}

impl Validate for Config {
    fn validate(&self) -> ValidationResult<()> {
        let mut v = Validator::new();
        if self.calculator_port() == 0 {
            v.check(Err(ValidationError::InvalidValue {
                field: "services.calculator.port".into(),
                reason: "must be between 1 and 65535".into(),
            }));
        }
        if self.network.bind.trim().is_empty() {
            v.check(Err(ValidationError::MissingField {
                field: "network.bind".into(),
            }));
        }
        v.nested(self.observability.validate())
            .nested(self.calculator.validate())
            .finish()
    }
}

impl Config {
    /// Load, apply environment overrides, and validate configuration.
    pub fn load_and_validate() -> anyhow::Result<Self> {
        let config = Self::load_with_env()?;
        config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(config)
    }
}
