//! HTTP API handlers for cld-mock

pub mod company;
pub mod health;
pub mod portfolio;

pub use company::{create_company, get_company};
pub use health::health_routes;
pub use portfolio::get_portfolio;
