//! HTTP API routes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::HeaderValue,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rei_common::config::CalculatorDefaults;
use rei_common::logging::generate_trace_id;
use rei_common::validation::{check_non_negative, check_percentage, ValidationError, Validator};
use rei_common::{Validate, ValidationResult};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::analysis::{DealAnalyzer, DealInputs, PropertyInputs, MAX_TERM_YEARS};
use crate::brrrr::{calculate_temporary_financing_analysis, TemporaryFinancingInputs};
use crate::document::{self, DocumentFormat};
use crate::error::CalcError;
use crate::finance::mortgage::{
    amortization_schedule, loan_summary, yearly_summary, AmortizationRow, AmortizationYear,
    LoanSummary,
};
use crate::finance::refinance::{calculate_cash_out_refinance, RefinanceInputs};
use crate::report::DealReport;

/// Response header carrying the request's trace ID.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Largest request body accepted.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state.
#[derive(Clone, Default)]
pub struct CalculatorState {
    pub analyzer: Arc<DealAnalyzer>,
}

impl CalculatorState {
    pub fn new(defaults: CalculatorDefaults) -> Self {
        Self {
            analyzer: Arc::new(DealAnalyzer::with_defaults(defaults)),
        }
    }
}

/// Build the application router.
pub fn build_router(state: CalculatorState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Calculations
        .route("/api/v1/analyze", post(analyze))
        .route("/api/v1/mortgage", post(mortgage))
        .route("/api/v1/refinance", post(refinance))
        .route("/api/v1/financing", post(financing))
        // Documents
        .route("/api/v1/report", post(report))
        .route("/api/v1/export", post(export))
        .route("/api/v1/import", post(import))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(middleware::from_fn(trace_requests))
        .with_state(state)
}

/// Tag each request with a trace ID and log its outcome.
async fn trace_requests(request: Request, next: Next) -> Response {
    let trace_id = generate_trace_id();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;

    tracing::info!(
        trace_id = %trace_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Request completed"
    );
    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}

/// Wrap a payload in the success envelope.
fn success<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "data": data
    }))
}

/// Turn a JSON body rejection into an enveloped error.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, CalcError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| CalcError::InvalidRequest(rejection.body_text()))
}

// ============ Health Check ============

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "rei-calc",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ============ Deal Analysis ============

async fn analyze(
    State(state): State<CalculatorState>,
    payload: Result<Json<DealInputs>, JsonRejection>,
) -> Result<impl IntoResponse, CalcError> {
    let mut deal = json_body(payload)?;
    document::sanitize_fields(&mut deal);
    let analysis = state.analyzer.analyze(&deal)?;
    if !analysis.warnings.is_empty() {
        tracing::warn!(
            deal = %deal.name,
            warnings = ?analysis.warnings,
            "Deal analyzed with warnings"
        );
    }
    Ok(success(analysis))
}

// ============ Mortgage ============

#[derive(Debug, Deserialize)]
struct MortgageRequest {
    principal: f64,
    interest_rate_pct: f64,
    term_years: u32,
    #[serde(default)]
    include_schedule: bool,
}

impl Validate for MortgageRequest {
    fn validate(&self) -> ValidationResult<()> {
        let mut v = Validator::new();
        v.check(check_non_negative("principal", self.principal))
            .check(check_percentage("interest_rate_pct", self.interest_rate_pct));
        if self.term_years == 0 || self.term_years > MAX_TERM_YEARS {
            v.check(Err(ValidationError::OutOfRange {
                field: "term_years".into(),
                value: self.term_years as f64,
                min: 1.0,
                max: MAX_TERM_YEARS as f64,
            }));
        }
        v.finish()
    }
}

#[derive(Debug, Serialize)]
struct MortgageResponse {
    #[serde(flatten)]
    summary: LoanSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<Vec<AmortizationRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    yearly: Option<Vec<AmortizationYear>>,
}

async fn mortgage(
    payload: Result<Json<MortgageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CalcError> {
    let request = json_body(payload)?;
    request.validate()?;

    let summary = loan_summary(request.principal, request.interest_rate_pct, request.term_years);
    let (schedule, yearly) = if request.include_schedule {
        let rows = amortization_schedule(
            request.principal,
            request.interest_rate_pct,
            request.term_years,
        );
        let years = yearly_summary(&rows);
        (Some(rows), Some(years))
    } else {
        (None, None)
    };

    Ok(success(MortgageResponse {
        summary,
        schedule,
        yearly,
    }))
}

// ============ Refinance ============

async fn refinance(
    payload: Result<Json<RefinanceInputs>, JsonRejection>,
) -> Result<impl IntoResponse, CalcError> {
    let inputs = json_body(payload)?;
    inputs.validate()?;
    Ok(success(calculate_cash_out_refinance(&inputs)))
}

// ============ Temporary Financing ============

#[derive(Debug, Deserialize)]
struct FinancingRequest {
    #[serde(default)]
    property: PropertyInputs,
    temporary_financing: TemporaryFinancingInputs,
}

async fn financing(
    State(state): State<CalculatorState>,
    payload: Result<Json<FinancingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CalcError> {
    let request = json_body(payload)?;
    let mut v = Validator::new();
    v.nested(request.property.validate())
        .nested(request.temporary_financing.validate());
    v.finish()?;

    let analysis = calculate_temporary_financing_analysis(
        &request.property,
        &request.temporary_financing,
        &state.analyzer.financing_limits(),
    );
    if !analysis.warnings.is_empty() {
        tracing::warn!(
            warnings = ?analysis.warning_messages(),
            "Temporary financing has warnings"
        );
    }
    Ok(success(analysis))
}

// ============ Documents ============

async fn report(
    State(state): State<CalculatorState>,
    payload: Result<Json<DealInputs>, JsonRejection>,
) -> Result<impl IntoResponse, CalcError> {
    let mut deal = json_body(payload)?;
    document::sanitize_fields(&mut deal);
    let analysis = state.analyzer.analyze(&deal)?;
    Ok(success(DealReport::generate(&deal, &analysis)))
}

#[derive(Debug, Serialize)]
struct ExportResponse {
    markdown: String,
}

async fn export(
    payload: Result<Json<DealInputs>, JsonRejection>,
) -> Result<impl IntoResponse, CalcError> {
    let mut deal = json_body(payload)?;
    document::sanitize_fields(&mut deal);
    let markdown = document::render(&deal, DocumentFormat::Markdown)?;
    Ok(success(ExportResponse { markdown }))
}

/// Body is the markdown document itself.
async fn import(body: String) -> Result<impl IntoResponse, CalcError> {
    let deal = document::parse(&body, DocumentFormat::Markdown)?;
    tracing::debug!(deal = %deal.name, "Deal imported");
    Ok(success(deal))
}
