//! REI Calc Library
//!
//! Real-estate investment calculations for rental property deals: mortgage
//! payments, operating cash flow, cap rate, cash-on-cash ROI, and BRRRR
//! temporary financing followed by a cash-out refinance.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     rei-calc (Rust Service)                    │
//! │                            :4450                               │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐    │
//! │  │   finance    │──▶│    brrrr     │──▶│     analysis     │    │
//! │  │  (formulas)  │   │ (temp loans) │   │  (DealAnalyzer)  │    │
//! │  └──────────────┘   └──────────────┘   └──────────────────┘    │
//! │          document (markdown) · report · routes (HTTP)          │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Operating statement
//! - **Effective gross income**: scheduled rent plus other income, less vacancy
//! - **NOI**: effective gross income less operating expenses, before debt service
//! - **Cash flow**: NOI less principal and interest
//!
//! ## BRRRR
//! - Buy and rehab on a short-term loan
//! - Refinance against the after-repair value
//! - Whatever the refinance does not return stays in the deal

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod brrrr;
pub mod document;
pub mod error;
pub mod finance;
pub mod format;
pub mod projection;
pub mod report;
pub mod routes;
pub mod sanitize;

use anyhow::Result;
use axum::Router;
use rei_common::config::Config;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

pub use analysis::{DealAnalysis, DealAnalyzer, DealInputs, Strategy};
pub use error::CalcError;
pub use report::DealReport;
pub use routes::{build_router, CalculatorState};

/// Calculator HTTP service
pub struct CalculatorService {
    config: Config,
}

impl CalculatorService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Router with state and CORS applied.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        build_router(CalculatorState::new(self.config.calculator.clone())).layer(cors)
    }

    /// Bind `network.bind:services.calculator.port` and serve until Ctrl-C.
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr =
            format!("{}:{}", self.config.bind_address(), self.config.calculator_port()).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener.
    pub async fn serve(self, listener: tokio::net::TcpListener) -> Result<()> {
        let app = self.router();
        tracing::info!(address = %listener.local_addr()?, "Starting HTTP server");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
