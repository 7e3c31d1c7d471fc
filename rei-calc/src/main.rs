//! REI Calc - Real-estate investment calculator service.
//!
//! Serves deal analysis, mortgage, refinance and BRRRR calculations over HTTP.

use anyhow::Result;
use rei_calc::CalculatorService;
use rei_common::config::Config;
use rei_common::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Start timing immediately for cold-start measurement
    let startup_start = std::time::Instant::now();

    // Load configuration (file, then REI_* environment overrides)
    let config = Config::load_and_validate()?;

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("REI Calc v{}", env!("CARGO_PKG_VERSION"));

    let service = CalculatorService::new(config);

    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );

    service.start().await
}
