//! `POST /api/v1/process`
//!
//! Glues the pipeline together: validate the body, dispatch by content type
//! under the analysis deadline, then serialize the result or hand the error
//! to the error handler chain.

use super::v1;
use crate::error::Result;
use crate::models::AnalysisResult;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, Instrument};
use uuid::Uuid;

pub async fn process_content(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("process", %request_id);
    let started = Instant::now();
    info!(parent: &span, bytes = body.len(), "processing content");

    match run_pipeline(&state, &body).instrument(span.clone()).await {
        Ok(result) => {
            info!(
                parent: &span,
                execution_ms = started.elapsed().as_millis() as u64,
                "content processing request executed"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => {
            info!(
                parent: &span,
                kind = ?e.kind(),
                client_error = e.is_client_error(),
                "content processing request failed"
            );
            span.in_scope(|| state.error_handler.handle(&e)).into_response()
        }
    }
}

async fn run_pipeline(state: &AppState, body: &[u8]) -> Result<AnalysisResult> {
    let envelope = v1::validate_request_body(body, state.config.max_body_size)?;
    info!(content_type = %envelope.content_type, "dispatching content");

    Arc::clone(&state.analyser)
        .analyse_with_deadline(envelope, state.config.analysis_timeout)
        .await
}
