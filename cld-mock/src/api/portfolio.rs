//! Portfolio listing

use axum::{extract::State, Json};
use cld_common::PortfolioEntry;

use crate::AppState;

/// GET /api/portfolio
///
/// Every company in the database, in database order.
pub async fn get_portfolio(State(state): State<AppState>) -> Json<Vec<PortfolioEntry>> {
    let entries = state.db.read().await.portfolio();
    tracing::debug!(entries = entries.len(), "Portfolio listed");
    Json(entries)
}
