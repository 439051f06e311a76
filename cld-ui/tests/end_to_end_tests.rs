//! End-to-end tests: real HTTP client against the cld-mock router
//!
//! Each test binds the mock backend to an ephemeral 127.0.0.1 port. Timers
//! run in real time here (short intervals); paused-clock timer tests live
//! next to the workflow code.

use std::sync::Arc;
use std::time::Duration;

use cld_common::events::{CldEvent, OnboardingPhase};
use cld_common::{CreateCompanyRequest, PortfolioEntry};
use cld_mock::{build_router, AppState, CompanyDb};
use cld_ui::{
    AppContext, Backend, ClientConfig, ClientError, Directory, HttpBackend, OnboardingSettings,
    ValidationError,
};

const SEEDED_DB: &str = r#"{
    "BETA": {
        "name": "Beta Industries",
        "scanned": true,
        "promise": {"ghg_emissions": "1000t", "revenue": 1200000},
        "truth": {"ghg_emissions": true},
        "metric_sources": {"ghg_emissions": [{"url": "https://x", "description": "report"}]}
    }
}"#;

/// Test helper: Serve the mock backend; returns its `/api` base URL
async fn spawn_backend(db_json: &str, analysis_delay: Duration) -> String {
    let db = CompanyDb::from_json_str(db_json).expect("Mock database should parse");
    let app = build_router(AppState::new(db, analysis_delay));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api", addr)
}

fn fast_config() -> ClientConfig {
    ClientConfig {
        onboarding: OnboardingSettings {
            progress_interval: Duration::from_millis(20),
            max_step: 5,
            settle_delay: Duration::from_millis(10),
        },
        ..ClientConfig::default()
    }
}

fn context(base_url: &str) -> AppContext {
    let config = fast_config();
    let backend =
        HttpBackend::new(base_url, Duration::from_secs(5), Duration::from_secs(10)).unwrap();
    AppContext::new(config, Arc::new(backend), Directory::builtin().unwrap())
}

/// TC-E2E-001: Onboarding a new organization lands it in the portfolio
#[tokio::test]
async fn test_onboard_new_company() {
    let base_url = spawn_backend("{}", Duration::ZERO).await;
    let ctx = context(&base_url);

    let entry = ctx.onboarding.submit("Acme Co", None).await.unwrap();
    assert_eq!(entry, PortfolioEntry::new("Acme Co", "ACME"));

    assert_eq!(ctx.portfolio.list().await, vec![PortfolioEntry::new("Acme Co", "ACME")]);
    assert_eq!(ctx.onboarding.phase().await, OnboardingPhase::Idle);
    assert!(ctx.onboarding.current_job().await.is_none());
}

/// TC-E2E-002: Progress advances while the backend is busy and completes on success
#[tokio::test]
async fn test_progress_during_slow_analysis() {
    let base_url = spawn_backend("{}", Duration::from_millis(300)).await;
    let ctx = context(&base_url);
    let mut events = ctx.event_bus.subscribe();

    ctx.onboarding.submit("Gamma Holdings", None).await.unwrap();

    let mut steps = Vec::new();
    let mut phases = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            CldEvent::OnboardingProgress { step, .. } => steps.push(step),
            CldEvent::OnboardingStateChanged { new_state, .. } => phases.push(new_state),
            _ => {}
        }
    }

    assert_eq!(steps.first(), Some(&0));
    assert_eq!(steps.last(), Some(&5));
    assert!(steps.windows(2).all(|w| w[0] <= w[1]), "steps not monotonic: {:?}", steps);
    assert!(steps.contains(&4), "300ms at 20ms per step should reach the waiting cap");
    assert_eq!(steps.iter().filter(|s| **s == 5).count(), 1);
    assert_eq!(
        phases,
        vec![
            OnboardingPhase::Submitting,
            OnboardingPhase::Progressing,
            OnboardingPhase::Succeeded,
            OnboardingPhase::Idle,
        ]
    );
}

/// TC-E2E-003: Already-listed organization is refused client-side
#[tokio::test]
async fn test_duplicate_refused_after_refresh() {
    let base_url = spawn_backend(SEEDED_DB, Duration::ZERO).await;
    let ctx = context(&base_url);
    assert_eq!(ctx.portfolio.refresh().await.unwrap(), 1);

    let err = ctx.onboarding.submit("beta industries", None).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Validation(ValidationError::AlreadyInPortfolio {
            name: "Beta Industries".to_string()
        })
    );
    assert_eq!(ctx.onboarding.phase().await, OnboardingPhase::Failed);
    assert_eq!(ctx.backend.list_portfolio().await.unwrap().len(), 1);
}

/// TC-E2E-004: Unknown ticker is NotFound carrying the backend's detail
#[tokio::test]
async fn test_unknown_ticker_not_found() {
    let base_url = spawn_backend(SEEDED_DB, Duration::ZERO).await;
    let ctx = context(&base_url);

    let err = ctx.backend.fetch_company("NOPE").await.unwrap_err();
    assert_eq!(
        err,
        ClientError::NotFound("Company ticker not found in mock database.".to_string())
    );
}

/// TC-E2E-005: Detail panel keeps the previous analysis when a fetch fails
#[tokio::test]
async fn test_detail_fetch_failure_keeps_previous() {
    let base_url = spawn_backend(SEEDED_DB, Duration::ZERO).await;
    let ctx = context(&base_url);

    let view = ctx.detail.load("beta").await.unwrap();
    assert_eq!(view.ticker, "BETA");
    assert_eq!(view.truths[0].display_label, "Ghg Emissions");
    assert_eq!(view.truths[0].verified, Some(true));
    assert_eq!(view.truths[0].citations[0].url, "https://x");
    assert_eq!(view.metrics.len(), 2);

    let before = ctx.detail.current().await;
    assert!(matches!(
        ctx.detail.load("NOPE").await,
        Err(ClientError::NotFound(_))
    ));
    assert_eq!(ctx.detail.current().await, before);
    assert_eq!(ctx.detail.view().await, Some(view));
}

/// TC-E2E-006: Backend validation failure surfaces its detail message
#[tokio::test]
async fn test_backend_detail_message() {
    let base_url = spawn_backend("{}", Duration::ZERO).await;
    let ctx = context(&base_url);

    let request = CreateCompanyRequest {
        company_name: "   ".to_string(),
        ticker: None,
    };
    let err = ctx.backend.create_company(&request).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Backend("company_name must not be empty".to_string())
    );
}

/// TC-E2E-007: Unreachable backend fails the job and leaves the portfolio alone
#[tokio::test]
async fn test_unreachable_backend_fails_job() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let ctx = context(&format!("http://{}/api", addr));
    let err = ctx.onboarding.submit("Acme Co", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "{:?}", err);

    let job = ctx.onboarding.current_job().await.unwrap();
    assert_eq!(job.state, OnboardingPhase::Failed);
    assert_eq!(job.step, 0);
    assert_eq!(job.error, Some(err.to_string()));
    assert!(ctx.portfolio.is_empty().await);
}

/// TC-E2E-008: Blank name is refused locally; a supplied ticker is kept
#[tokio::test]
async fn test_blank_name_then_supplied_ticker() {
    let base_url = spawn_backend("{}", Duration::ZERO).await;
    let ctx = context(&base_url);

    assert!(matches!(
        ctx.onboarding.submit("", None).await,
        Err(ClientError::Validation(ValidationError::EmptyName))
    ));
    assert_eq!(ctx.onboarding.phase().await, OnboardingPhase::Idle);

    ctx.onboarding.submit("Acme Co", Some("acm")).await.unwrap();
    assert_eq!(ctx.portfolio.list().await, vec![PortfolioEntry::new("Acme Co", "ACM")]);
}
