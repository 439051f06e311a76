//! # CLD Common Library
//!
//! Shared code for the Corporate Lie Detector crates including:
//! - Organization, portfolio and analysis data model
//! - HTTP wire types for the analysis backend contract
//! - Event types (CldEvent enum) and the EventBus
//! - Configuration loading (CLI → ENV → TOML → default)

pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use error::{Error, Result};
pub use models::{
    AnalysisPayload, Citation, CreateCompanyRequest, ErrorDetail, OrganizationDetail,
    OrganizationRef, PortfolioEntry,
};
