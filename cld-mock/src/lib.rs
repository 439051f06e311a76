//! cld-mock library - stand-in analysis backend
//!
//! Serves the portfolio listing, company analysis and company creation
//! endpoints over an in-memory JSON company database.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod error;

pub use db::{CompanyDb, CompanyRecord};
pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<RwLock<CompanyDb>>,
    /// Simulated analysis time for `POST /api/company`
    pub analysis_delay: Duration,
}

impl AppState {
    pub fn new(db: CompanyDb, analysis_delay: Duration) -> Self {
        Self {
            db: Arc::new(RwLock::new(db)),
            analysis_delay,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/portfolio", get(api::get_portfolio))
        .route("/api/company", post(api::create_company))
        .route("/api/company/:ticker", get(api::get_company));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
