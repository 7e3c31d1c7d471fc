//! REI Common - Shared configuration, errors, and logging for the REI calculator.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Configuration validation and the `Validate` trait
//! - Error types and handling utilities
//! - Logging setup

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{
    CalculatorDefaults, Config, NetworkConfig, ObservabilityConfig, ServicesConfig, StorageConfig,
};
pub use error::{Error, Result, ResultExt};
pub use validation::{Validate, ValidationError, ValidationResult};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{CalculatorDefaults, Config};
    pub use crate::error::{Error, Result, ResultExt};
    pub use crate::logging::init_logging;
    pub use crate::validation::{Validate, ValidationError};
}
