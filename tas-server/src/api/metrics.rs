//! Request instrumentation
//!
//! [`instrumented`] wraps one route so that every call records
//! `<prefix>.request` before the handler runs and, once it returns, exactly
//! one of `<prefix>.success` / `<prefix>.error` plus the `<prefix>.execution`
//! timing. The response is passed through untouched.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use std::sync::Arc;
use std::time::Instant;
use tas_common::MetricsSink;
use tracing::debug;

/// Metric names for one instrumented route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricNames {
    pub request: String,
    pub error: String,
    pub success: String,
    pub execution: String,
}

impl MetricNames {
    /// `<prefix>.request`, `<prefix>.error`, `<prefix>.success`, `<prefix>.execution`
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            request: format!("{}.request", prefix),
            error: format!("{}.error", prefix),
            success: format!("{}.success", prefix),
            execution: format!("{}.execution", prefix),
        }
    }

    pub fn counters(&self) -> [&str; 3] {
        [&self.request, &self.error, &self.success].map(String::as_str)
    }
}

/// Sink and names handed to the middleware
#[derive(Clone)]
pub struct Instrumentation {
    pub sink: Arc<dyn MetricsSink>,
    pub names: Arc<MetricNames>,
}

impl Instrumentation {
    pub fn new(sink: Arc<dyn MetricsSink>, names: MetricNames) -> Self {
        Self {
            sink,
            names: Arc::new(names),
        }
    }
}

/// Wrap `route` with request/success/error/execution metrics
pub fn instrumented<S>(route: MethodRouter<S>, instrumentation: Instrumentation) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.layer(middleware::from_fn_with_state(instrumentation, capture_metrics))
}

/// Middleware body; 4xx and 5xx responses count as errors
pub async fn capture_metrics(
    State(instrumentation): State<Instrumentation>,
    request: Request,
    next: Next,
) -> Response {
    let Instrumentation { sink, names } = instrumentation;

    sink.increment(&names.request);
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let outcome = if status.is_client_error() || status.is_server_error() {
        &names.error
    } else {
        &names.success
    };
    sink.increment(outcome);

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    sink.timing(&names.execution, elapsed_ms);
    debug!(status = status.as_u16(), elapsed_ms, metric = %outcome, "request metrics recorded");

    response
}
