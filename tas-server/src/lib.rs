//! tas-server library - Text Analysis Service
//!
//! Accepts typed content envelopes over HTTP, dispatches them to the
//! registered content processor and returns the analysis result or a
//! structured error.

use axum::{extract::DefaultBodyLimit, Router};
use std::sync::Arc;
use tas_common::config::ServiceConfig;
use tas_common::ServiceMetrics;
use tower_http::trace::TraceLayer;

pub mod analysis;
pub mod api;
pub mod error;
pub mod extraction;
pub mod models;

use analysis::analyser::HtmlAnalyser;
use analysis::ContentAnalyser;
use api::{ErrorHandlerChain, Instrumentation, MetricNames};
use extraction::DefaultHtmlAnalyser;

/// Application state shared across HTTP handlers
///
/// Everything here is built once at startup and only read afterwards,
/// except the metrics, which are atomic.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub analyser: Arc<ContentAnalyser>,
    pub error_handler: Arc<ErrorHandlerChain>,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    /// State using the built-in analyser
    pub fn new(config: ServiceConfig) -> tas_common::Result<Self> {
        let analyser = Arc::new(DefaultHtmlAnalyser::from_config(&config)?);
        Ok(Self::with_analyser(config, analyser))
    }

    /// State with a caller-supplied analysis engine
    pub fn with_analyser(config: ServiceConfig, analyser: Arc<dyn HtmlAnalyser>) -> Self {
        let content_analyser = ContentAnalyser::standard(&config, analyser);
        Self::with_content_analyser(config, content_analyser)
    }

    /// State with a fully custom processor registry
    pub fn with_content_analyser(config: ServiceConfig, analyser: ContentAnalyser) -> Self {
        Self {
            config: Arc::new(config),
            analyser: Arc::new(analyser),
            error_handler: Arc::new(ErrorHandlerChain::standard()),
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let names = MetricNames::with_prefix(&state.config.metrics_prefix);
    state.metrics.register_counters(names.counters());
    let instrumentation = Instrumentation::new(state.metrics.clone(), names);

    // The validator enforces the configured body limit itself
    let process = api::instrumented(post(api::process_content), instrumentation)
        .layer(DefaultBodyLimit::disable());

    Router::new()
        .route(api::v1::PROCESS_PATH, process)
        .route("/service/health", get(api::health))
        .route("/service/information", get(api::information))
        .route("/service/metrics", get(api::service::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
