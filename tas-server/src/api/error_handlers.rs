//! Error handler chain
//!
//! The only place a [`ServiceError`] becomes an HTTP response. Handlers are
//! looked up by [`ErrorKind`]; a kind without a handler gets the generic
//! processing error.

use crate::error::{error_codes, truncate_detail, ErrorKind, ServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{error, warn};

const INVALID_REQUEST_BODY: &str = "Invalid request body";
const PROCESSING_ERROR: &str = "Processing error";
const FAILED_TO_PROCESS: &str = "Failed to process content";

/// Transport error shape: `{title, description, code}` with a status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: StatusCode,
    pub title: String,
    pub description: String,
    pub code: u32,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, title: &str, description: impl Into<String>, code: u32) -> Self {
        Self {
            status,
            title: title.to_string(),
            description: description.into(),
            code,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Builds the response for one error kind
pub type ErrorHandler = fn(&ServiceError) -> ErrorResponse;

/// Kind → handler table, immutable once built
pub struct ErrorHandlerChain {
    handlers: HashMap<ErrorKind, ErrorHandler>,
}

impl ErrorHandlerChain {
    pub fn new(handlers: HashMap<ErrorKind, ErrorHandler>) -> Self {
        Self { handlers }
    }

    /// Handlers for the process endpoint
    ///
    /// `Unknown` deliberately has no entry and takes the fallback path.
    pub fn standard() -> Self {
        let handlers: [(ErrorKind, ErrorHandler); 8] = [
            (ErrorKind::EmptyRequestBody, handle_empty_request_body),
            (ErrorKind::RequestBodyTooLarge, handle_request_body_too_large),
            (ErrorKind::UndecodableRequestBody, handle_undecodable_request_body),
            (ErrorKind::SchemaViolation, handle_schema_violation),
            (ErrorKind::UnsupportedContentType, handle_unsupported_content_type),
            (ErrorKind::InvalidHtmlContent, handle_invalid_html_content),
            (ErrorKind::HtmlContentProcessing, handle_html_content_processing),
            (ErrorKind::AnalysisTimeout, handle_analysis_timeout),
        ];
        Self::new(handlers.into_iter().collect())
    }

    pub fn handles(&self, kind: ErrorKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn handle(&self, error: &ServiceError) -> ErrorResponse {
        match self.handlers.get(&error.kind()) {
            Some(handler) => handler(error),
            None => handle_unknown(error),
        }
    }
}

impl Default for ErrorHandlerChain {
    fn default() -> Self {
        Self::standard()
    }
}

fn handle_empty_request_body(_error: &ServiceError) -> ErrorResponse {
    warn!("rejected empty request body");
    ErrorResponse::new(
        StatusCode::BAD_REQUEST,
        "Empty request body",
        "The contents of a web page must be provided",
        error_codes::EMPTY_REQUEST_BODY,
    )
}

fn handle_request_body_too_large(error: &ServiceError) -> ErrorResponse {
    warn!(error = %error, "rejected oversized request body");
    let description = match error {
        ServiceError::RequestBodyTooLarge { limit, .. } => {
            format!("The request body must not exceed {} bytes", limit)
        }
        _ => "The request body is too large".to_string(),
    };
    ErrorResponse::new(
        StatusCode::PAYLOAD_TOO_LARGE,
        "Request body too large",
        description,
        error_codes::REQUEST_BODY_TOO_LARGE,
    )
}

fn handle_undecodable_request_body(error: &ServiceError) -> ErrorResponse {
    warn!(error = %truncate_detail(error), "rejected undecodable request body");
    ErrorResponse::new(
        StatusCode::BAD_REQUEST,
        INVALID_REQUEST_BODY,
        "The contents of the request body could not be decoded",
        error_codes::INVALID_REQUEST_BODY,
    )
}

fn handle_schema_violation(error: &ServiceError) -> ErrorResponse {
    warn!(error = %truncate_detail(error), "rejected request body not matching the schema");
    ErrorResponse::new(
        StatusCode::BAD_REQUEST,
        INVALID_REQUEST_BODY,
        "The contents of the request are not in the appropriate format",
        error_codes::REQUEST_SCHEMA_VIOLATION,
    )
}

fn handle_unsupported_content_type(error: &ServiceError) -> ErrorResponse {
    let content_type = match error {
        ServiceError::UnsupportedContentType { content_type } => content_type.as_str(),
        _ => "",
    };
    warn!(content_type = %truncate_detail(content_type), "rejected unsupported content type");
    ErrorResponse::new(
        StatusCode::BAD_REQUEST,
        INVALID_REQUEST_BODY,
        format!("The content type \"{}\" is not supported", truncate_detail(content_type)),
        error_codes::UNSUPPORTED_CONTENT_TYPE,
    )
}

fn handle_invalid_html_content(error: &ServiceError) -> ErrorResponse {
    warn!(error = %truncate_detail(error), "invalid html content");
    ErrorResponse::new(
        StatusCode::BAD_REQUEST,
        INVALID_REQUEST_BODY,
        "The html analysis request contained invalid data",
        error_codes::INVALID_HTML_CONTENT,
    )
}

fn handle_html_content_processing(error: &ServiceError) -> ErrorResponse {
    warn!(error = %truncate_detail(error), "failed to extract content");
    ErrorResponse::new(
        StatusCode::NOT_FOUND,
        PROCESSING_ERROR,
        FAILED_TO_PROCESS,
        error_codes::HTML_CONTENT_PROCESSING_ERROR,
    )
}

fn handle_analysis_timeout(error: &ServiceError) -> ErrorResponse {
    warn!(error = %error, "content analysis timed out");
    ErrorResponse::new(
        StatusCode::GATEWAY_TIMEOUT,
        "Processing timeout",
        "The content could not be processed in time",
        error_codes::ANALYSIS_TIMEOUT,
    )
}

fn handle_unknown(error: &ServiceError) -> ErrorResponse {
    error!(error = %truncate_detail(error), "failed to process content");
    ErrorResponse::new(
        StatusCode::NOT_FOUND,
        PROCESSING_ERROR,
        FAILED_TO_PROCESS,
        error_codes::PROCESSING_ERROR,
    )
}
