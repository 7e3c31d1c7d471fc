//! Configuration management for the REI calculator.
//!
//! The service and the CLI share one configuration file at `~/.rei/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (REI_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `REI_BIND_ADDRESS` → network.bind
//! - `REI_CALC_PORT` → services.calculator.port
//! - `REI_LOG_LEVEL` → observability.log_level
//! - `REI_LOG_FORMAT` → observability.log_format
//! - `REI_DEALS_DIR` → storage.deals_dir

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default port for the calculator HTTP service.
pub const DEFAULT_CALCULATOR_PORT: u16 = 4450;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".rei"),
        |dirs| dirs.home_dir().join(".rei"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Network Configuration
// ============================================================================

/// Global network configuration.
///
/// Default is `127.0.0.1` (local only). Set to `0.0.0.0` to allow remote access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Bind address for the calculator service
    #[serde(default = "default_bind_address")]
    pub bind: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".into()
}

// ============================================================================
// Services Port Configuration
// ============================================================================

/// Service port configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServicesConfig {
    /// Calculator HTTP service
    #[serde(default)]
    pub calculator: ServicePortConfig,
}

/// Individual service port configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServicePortConfig {
    /// Port number for the service
    #[serde(default)]
    pub port: Option<u16>,
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Calculator Defaults
// ============================================================================

/// Defaults and advisory thresholds used by the deal calculator.
///
/// All values are percentages except `max_holding_months`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorDefaults {
    /// Vacancy allowance applied to gross income
    #[serde(default = "default_vacancy_rate")]
    pub vacancy_rate_pct: f64,

    /// Maintenance reserve as share of monthly rent
    #[serde(default = "default_maintenance")]
    pub maintenance_pct: f64,

    /// Property management fee as share of monthly rent
    #[serde(default = "default_management")]
    pub management_pct: f64,

    /// Capital expenditure reserve as share of monthly rent
    #[serde(default = "default_capex")]
    pub capex_pct: f64,

    /// Refinance LTV above which a warning is raised
    #[serde(default = "default_max_refinance_ltv")]
    pub max_refinance_ltv_pct: f64,

    /// Holding period above which a warning is raised
    #[serde(default = "default_max_holding_months")]
    pub max_holding_months: u32,

    /// Origination points above which a warning is raised
    #[serde(default = "default_max_points")]
    pub max_points_pct: f64,

    /// Discount rate for NPV
    #[serde(default = "default_discount_rate")]
    pub discount_rate_pct: f64,

    /// Selling costs assumed at the end of a projection
    #[serde(default = "default_selling_costs")]
    pub selling_costs_pct: f64,
}

impl Default for CalculatorDefaults {
    fn default() -> Self {
        Self {
            vacancy_rate_pct: default_vacancy_rate(),
            maintenance_pct: default_maintenance(),
            management_pct: default_management(),
            capex_pct: default_capex(),
            max_refinance_ltv_pct: default_max_refinance_ltv(),
            max_holding_months: default_max_holding_months(),
            max_points_pct: default_max_points(),
            discount_rate_pct: default_discount_rate(),
            selling_costs_pct: default_selling_costs(),
        }
    }
}

fn default_vacancy_rate() -> f64 {
    5.0
}
fn default_maintenance() -> f64 {
    5.0
}
fn default_management() -> f64 {
    8.0
}
fn default_capex() -> f64 {
    5.0
}
fn default_max_refinance_ltv() -> f64 {
    80.0
}
fn default_max_holding_months() -> u32 {
    12
}
fn default_max_points() -> f64 {
    5.0
}
fn default_discount_rate() -> f64 {
    8.0
}
fn default_selling_costs() -> f64 {
    6.0
}

// ============================================================================
// Storage Configuration
// ============================================================================

/// Where deal documents are written by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for saved deal documents (`~` is expanded)
    #[serde(default = "default_deals_dir")]
    pub deals_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            deals_dir: default_deals_dir(),
        }
    }
}

fn default_deals_dir() -> String {
    "~/.rei/deals".into()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// JSON Schema reference
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Network configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Service ports
    #[serde(default)]
    pub services: ServicesConfig,

    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Calculator defaults and warning thresholds
    #[serde(default)]
    pub calculator: CalculatorDefaults,

    /// Deal document storage
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("REI_BIND_ADDRESS") {
            self.network.bind = bind;
        }
        if let Some(port) = lookup("REI_CALC_PORT") {
            match port.parse() {
                Ok(p) => self.services.calculator.port = Some(p),
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid REI_CALC_PORT"),
            }
        }
        if let Some(level) = lookup("REI_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("REI_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Some(dir) = lookup("REI_DEALS_DIR") {
            self.storage.deals_dir = dir;
        }
    }

    /// Save configuration to a path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Bind address for the calculator service.
    pub fn bind_address(&self) -> &str {
        &self.network.bind
    }

    /// Effective calculator port.
    pub fn calculator_port(&self) -> u16 {
        self.services
            .calculator
            .port
            .unwrap_or(DEFAULT_CALCULATOR_PORT)
    }

    /// Deals directory with `~` and environment variables expanded.
    pub fn deals_dir(&self) -> PathBuf {
        match shellexpand::full(&self.storage.deals_dir) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to expand deals_dir, using it verbatim");
                PathBuf::from(&self.storage.deals_dir)
            }
        }
    }
}
