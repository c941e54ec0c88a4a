//! API version 1 wire contract
//!
//! The envelope schema for `POST /api/v1/process`: a JSON object with a
//! non-empty string `content_type` and an object-valued `content`. An
//! incompatible change to this shape belongs in a new version module mounted
//! under a new path, never in place.

use crate::error::{truncate_detail, FieldErrors, Result, ServiceError};
use crate::models::Envelope;
use serde_json::Value;
use tracing::warn;
use validator::Validate;

/// Process endpoint path
pub const PROCESS_PATH: &str = "/api/v1/process";

const MISSING_FIELD: &str = "Missing data for required field.";

/// JSON type each envelope field must have
const ENVELOPE_FIELDS: &[(&str, JsonType)] = &[
    ("content_type", JsonType::String),
    ("content", JsonType::Object),
];

#[derive(Debug, Clone, Copy)]
enum JsonType {
    String,
    Object,
}

impl JsonType {
    fn matches(self, value: &Value) -> bool {
        match self {
            JsonType::String => value.is_string(),
            JsonType::Object => value.is_object(),
        }
    }

    fn reason(self) -> &'static str {
        match self {
            JsonType::String => "Not a valid string.",
            JsonType::Object => "Not a valid object.",
        }
    }
}

/// Validate a raw request body into an [`Envelope`]
///
/// Checks run in order and stop at the first failure: size limit, empty
/// body, JSON decoding, envelope schema.
pub fn validate_request_body(raw_body: &[u8], max_body_size: Option<usize>) -> Result<Envelope> {
    if let Some(limit) = max_body_size {
        if raw_body.len() > limit {
            warn!(size = raw_body.len(), limit, "request body too large");
            return Err(ServiceError::RequestBodyTooLarge {
                size: raw_body.len(),
                limit,
            });
        }
    }

    if raw_body.is_empty() {
        warn!("empty request body");
        return Err(ServiceError::EmptyRequestBody);
    }

    let body: Value = std::str::from_utf8(raw_body)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(text).map_err(|e| e.to_string()))
        .map_err(|e| {
            warn!(error = %truncate_detail(&e), "failed to decode request body");
            ServiceError::UndecodableRequestBody(e)
        })?;

    validate_envelope(body)
}

/// Check a decoded body against the v1 envelope schema
pub fn validate_envelope(body: Value) -> Result<Envelope> {
    let Value::Object(fields) = &body else {
        let mut errors = FieldErrors::new();
        errors.insert("_schema".to_string(), "Invalid input type.".to_string());
        return Err(schema_violation(errors));
    };

    let errors: FieldErrors = ENVELOPE_FIELDS
        .iter()
        .filter_map(|(name, expected)| match fields.get(*name) {
            None | Some(Value::Null) => Some((name.to_string(), MISSING_FIELD.to_string())),
            Some(value) if !expected.matches(value) => {
                Some((name.to_string(), expected.reason().to_string()))
            }
            Some(_) => None,
        })
        .collect();
    if !errors.is_empty() {
        return Err(schema_violation(errors));
    }

    let envelope: Envelope = serde_json::from_value(body).map_err(|e| {
        let mut errors = FieldErrors::new();
        errors.insert("_schema".to_string(), e.to_string());
        schema_violation(errors)
    })?;

    if let Err(validation) = envelope.validate() {
        let errors = validation
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect::<Vec<_>>()
                    .join("; ");
                (field.to_string(), reason)
            })
            .collect();
        return Err(schema_violation(errors));
    }

    Ok(envelope)
}

fn schema_violation(errors: FieldErrors) -> ServiceError {
    warn!(errors = ?errors, "invalid processing request body");
    ServiceError::SchemaViolation(errors)
}
