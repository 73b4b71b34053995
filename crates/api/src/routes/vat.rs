//! VAT processing routes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{BytesRejection, JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use vatrec_core::import::{
    CsvTransactionLoader, NormalizedTransaction, WorkbookTransactionLoader, rows_from_normalized,
    rows_from_value,
};
use vatrec_core::vat::{ProcessingResult, TransactionRow};
use vatrec_shared::AppError;

use crate::AppState;
use crate::error::ApiError;

/// Creates the VAT routes (requires the API-key middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vat/process", post(process_transactions))
        .route("/vat/calculate-normalized", post(calculate_normalized))
        .route("/vat/upload", post(upload_csv))
        .route("/vat/upload-workbook", post(upload_workbook))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for `POST /vat/process`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    /// Row objects; anything other than a list is rejected.
    #[serde(default)]
    pub transactions: Value,
    /// Company name.
    #[serde(default)]
    pub company_name: String,
    /// Organization number.
    #[serde(default)]
    pub org_number: String,
    /// Reporting period, `YYYY-MM`.
    #[serde(default)]
    pub period: String,
}

/// Request body for `POST /vat/calculate-normalized`.
#[derive(Debug, Deserialize)]
pub struct NormalizedRequest {
    /// Normalized transactions.
    #[serde(default)]
    pub transactions: Vec<NormalizedTransaction>,
    /// Company name.
    #[serde(default)]
    pub company_name: String,
    /// Organization number.
    #[serde(default)]
    pub org_number: String,
    /// Reporting period, `YYYY-MM`.
    #[serde(default)]
    pub period: String,
}

/// Query parameters for `POST /vat/upload` and `POST /vat/upload-workbook`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    /// Company name.
    #[serde(default)]
    pub company_name: String,
    /// Organization number.
    #[serde(default)]
    pub org_number: String,
    /// Reporting period, `YYYY-MM`.
    #[serde(default)]
    pub period: String,
    /// Workbook sheet to read; the first sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Envelope for processing results.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    /// Mirrors `data.validation.isValid`.
    pub success: bool,
    /// The processing result.
    pub data: ProcessingResult,
}

impl IntoResponse for ProcessResponse {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn process_transactions(
    State(state): State<AppState>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<ProcessResponse, ApiError> {
    let Json(request) = body?;
    let rows = rows_from_value(&request.transactions)?;
    run(
        &state,
        rows,
        request.company_name,
        request.org_number,
        request.period,
    )
    .await
}

async fn calculate_normalized(
    State(state): State<AppState>,
    body: Result<Json<NormalizedRequest>, JsonRejection>,
) -> Result<ProcessResponse, ApiError> {
    let Json(request) = body?;
    let rows = rows_from_normalized(request.transactions);
    run(
        &state,
        rows,
        request.company_name,
        request.org_number,
        request.period,
    )
    .await
}

async fn upload_csv(
    State(state): State<AppState>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<ProcessResponse, ApiError> {
    let Query(query) = query?;
    let body = body?;
    let rows = CsvTransactionLoader::new().load(body.as_ref())?;
    run(&state, rows, query.company_name, query.org_number, query.period).await
}

async fn upload_workbook(
    State(state): State<AppState>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<ProcessResponse, ApiError> {
    let Query(query) = query?;
    let body = body?;
    let loader = match query.sheet {
        Some(sheet) => WorkbookTransactionLoader::new().with_sheet(sheet),
        None => WorkbookTransactionLoader::new(),
    };
    let rows = loader.load(body.as_ref())?;
    run(&state, rows, query.company_name, query.org_number, query.period).await
}

/// Enforces the row limit and processes off the async runtime.
async fn run(
    state: &AppState,
    rows: Vec<TransactionRow>,
    company_name: String,
    org_number: String,
    period: String,
) -> Result<ProcessResponse, ApiError> {
    if rows.len() > state.max_rows {
        return Err(AppError::PayloadTooLarge(format!(
            "Batch has {} rows; the limit is {}",
            rows.len(),
            state.max_rows
        ))
        .into());
    }

    let processor = state.processor.clone();
    let result = tokio::task::spawn_blocking(move || {
        processor.process(&rows, &company_name, &org_number, &period)
    })
    .await
    .map_err(|e| AppError::Internal(format!("VAT processing task failed: {e}")))?;

    info!(
        period = %result.period,
        is_valid = result.is_valid(),
        "VAT request completed"
    );

    Ok(ProcessResponse {
        success: result.is_valid(),
        data: result,
    })
}
