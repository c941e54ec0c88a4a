//! Error taxonomy for the analysis pipeline
//!
//! Every failure a request can hit is one variant of [`ServiceError`].
//! Variants are created where the failure happens and travel unmodified to
//! the HTTP boundary, where `api::error_handlers` turns them into responses.

use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Stable error codes returned to clients
///
/// Append-only: never renumber or reuse a code.
pub mod error_codes {
    /// Generic processing failure (unknown errors)
    pub const PROCESSING_ERROR: u32 = 1000;
    pub const EMPTY_REQUEST_BODY: u32 = 1001;
    pub const HTML_CONTENT_PROCESSING_ERROR: u32 = 1002;
    pub const INVALID_HTML_CONTENT: u32 = 1003;
    /// Body is not decodable JSON
    pub const INVALID_REQUEST_BODY: u32 = 1004;
    pub const UNSUPPORTED_CONTENT_TYPE: u32 = 1005;
    pub const REQUEST_SCHEMA_VIOLATION: u32 = 1006;
    pub const REQUEST_BODY_TOO_LARGE: u32 = 1007;
    pub const ANALYSIS_TIMEOUT: u32 = 1008;
}

/// Field path → reason
pub type FieldErrors = BTreeMap<String, String>;

/// Tag identifying a [`ServiceError`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyRequestBody,
    RequestBodyTooLarge,
    UndecodableRequestBody,
    SchemaViolation,
    UnsupportedContentType,
    InvalidHtmlContent,
    HtmlContentProcessing,
    AnalysisTimeout,
    Unknown,
}

/// Request pipeline error
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// Request body had no bytes
    #[error("Empty request body")]
    EmptyRequestBody,

    /// Request body exceeded the configured admission limit
    #[error("Request body of {size} bytes exceeds the {limit} byte limit")]
    RequestBodyTooLarge { size: usize, limit: usize },

    /// Request body is not UTF-8 JSON
    #[error("Request body could not be decoded: {0}")]
    UndecodableRequestBody(String),

    /// Request body is JSON but not a valid envelope
    #[error("Request body violates the envelope schema: {0:?}")]
    SchemaViolation(FieldErrors),

    /// No processor is registered for the content type
    #[error("Unsupported content type: {content_type}")]
    UnsupportedContentType { content_type: String },

    /// HTML content failed shape validation
    #[error("Invalid HTML content: {errors:?}")]
    InvalidHtmlContent { errors: FieldErrors },

    /// Extraction failed for reasons not attributable to the input shape
    #[error("HTML content processing failed: {0}")]
    HtmlContentProcessing(String),

    /// Analysis did not finish within the configured deadline
    #[error("Content analysis exceeded {0:?}")]
    AnalysisTimeout(Duration),

    /// Anything else
    #[error("Unexpected failure: {0}")]
    Unknown(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::EmptyRequestBody => ErrorKind::EmptyRequestBody,
            ServiceError::RequestBodyTooLarge { .. } => ErrorKind::RequestBodyTooLarge,
            ServiceError::UndecodableRequestBody(_) => ErrorKind::UndecodableRequestBody,
            ServiceError::SchemaViolation(_) => ErrorKind::SchemaViolation,
            ServiceError::UnsupportedContentType { .. } => ErrorKind::UnsupportedContentType,
            ServiceError::InvalidHtmlContent { .. } => ErrorKind::InvalidHtmlContent,
            ServiceError::HtmlContentProcessing(_) => ErrorKind::HtmlContentProcessing,
            ServiceError::AnalysisTimeout(_) => ErrorKind::AnalysisTimeout,
            ServiceError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// True when the failure is caused by the request rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::EmptyRequestBody
                | ErrorKind::RequestBodyTooLarge
                | ErrorKind::UndecodableRequestBody
                | ErrorKind::SchemaViolation
                | ErrorKind::UnsupportedContentType
                | ErrorKind::InvalidHtmlContent
        )
    }
}

/// Result type for the analysis pipeline
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Longest error detail written to the log
pub const MAX_LOGGED_DETAIL: usize = 256;

/// Error detail cut to [`MAX_LOGGED_DETAIL`] chars for logging
pub fn truncate_detail(detail: impl std::fmt::Display) -> String {
    let detail = detail.to_string();
    match detail.char_indices().nth(MAX_LOGGED_DETAIL) {
        Some((end, _)) => format!("{}...", &detail[..end]),
        None => detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_error_codes_are_distinct() {
        let codes = [
            error_codes::PROCESSING_ERROR,
            error_codes::EMPTY_REQUEST_BODY,
            error_codes::HTML_CONTENT_PROCESSING_ERROR,
            error_codes::INVALID_HTML_CONTENT,
            error_codes::INVALID_REQUEST_BODY,
            error_codes::UNSUPPORTED_CONTENT_TYPE,
            error_codes::REQUEST_SCHEMA_VIOLATION,
            error_codes::REQUEST_BODY_TOO_LARGE,
            error_codes::ANALYSIS_TIMEOUT,
        ];
        let unique: HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_kind_matches_variant() {
        let error = ServiceError::UnsupportedContentType {
            content_type: "text/plain".to_string(),
        };
        assert_eq!(error.kind(), ErrorKind::UnsupportedContentType);
        assert!(error.is_client_error());

        let error = ServiceError::HtmlContentProcessing("boom".to_string());
        assert_eq!(error.kind(), ErrorKind::HtmlContentProcessing);
        assert!(!error.is_client_error());
    }

    #[test]
    fn test_truncate_detail() {
        let long = "x".repeat(1000);
        assert_eq!(truncate_detail(&long).len(), MAX_LOGGED_DETAIL + 3);
        assert_eq!(truncate_detail("short"), "short");

        // Multi-byte text is cut on a char boundary
        let accented = "é".repeat(300);
        let cut = truncate_detail(&accented);
        assert_eq!(cut.chars().count(), MAX_LOGGED_DETAIL + 3);
        assert!(cut.ends_with("é..."));
    }
}
