//! Company analysis endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use cld_common::{AnalysisPayload, CreateCompanyRequest};

use crate::db::CompanyRecord;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const UNKNOWN_TICKER_DETAIL: &str = "Company ticker not found in mock database.";

/// GET /api/company/:ticker
pub async fn get_company(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> ApiResult<Json<AnalysisPayload>> {
    let payload = state
        .db
        .read()
        .await
        .get(&ticker)
        .ok_or_else(|| ApiError::NotFound(UNKNOWN_TICKER_DETAIL.to_string()))?;

    tracing::debug!(ticker = %payload.ticker, "Company analysis served");
    Ok(Json(payload))
}

/// POST /api/company
///
/// Returns the existing record when the name or ticker is already known.
/// Otherwise waits `analysis_delay`, then stores and returns a new record
/// with no analysis content.
pub async fn create_company(
    State(state): State<AppState>,
    body: Result<Json<CreateCompanyRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisPayload>> {
    let Json(request) = body.map_err(|rejection| ApiError::Unprocessable(rejection.body_text()))?;

    let name = request.company_name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Unprocessable("company_name must not be empty".to_string()));
    }
    let ticker = request.ticker.as_deref().map(str::trim).filter(|t| !t.is_empty());

    if let Some(existing) = state.db.read().await.find(&name, ticker) {
        tracing::info!(name = %name, ticker = %existing.ticker, "Company already known");
        return Ok(Json(existing));
    }

    tracing::info!(
        name = %name,
        delay_ms = state.analysis_delay.as_millis() as u64,
        "Analyzing company"
    );
    tokio::time::sleep(state.analysis_delay).await;

    let mut db = state.db.write().await;
    // Another request may have added it while this one was "analyzing"
    if let Some(existing) = db.find(&name, ticker) {
        return Ok(Json(existing));
    }

    let assigned = db.assign_ticker(&name, ticker);
    let payload = db.insert(assigned, CompanyRecord::scanned(name));
    tracing::info!(name = %payload.name, ticker = %payload.ticker, "Company added");
    Ok(Json(payload))
}
