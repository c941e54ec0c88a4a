//! Wire types
//!
//! The request envelope (API v1) and the analysis result returned on success.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use validator::Validate;

/// Top-level request object for `POST /api/v1/process`
///
/// Schema (v1): an object with a non-empty string `content_type` and an
/// object-valued `content`. Both are required. Changing this shape
/// incompatibly requires a new API version path.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
pub struct Envelope {
    #[validate(length(min = 1, message = "content_type must not be empty"))]
    pub content_type: String,
    pub content: Map<String, Value>,
}

/// Successful analysis response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub content: ContentSection,
    pub social: SocialSection,
}

/// Extracted document content
///
/// Any facet may be `null` when extraction found nothing; fields are never
/// omitted from the serialized object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub text: Option<String>,
    pub title: Option<String>,
    pub html: Option<String>,
    pub keywords: Option<BTreeMap<String, f64>>,
    pub summary: Option<String>,
    pub readability_scores: Option<Map<String, Value>>,
    pub statistics: Option<Map<String, Value>>,
    pub named_entities: Option<BTreeMap<String, Vec<String>>>,
    pub top_image: Option<String>,
    pub images: Option<Vec<String>>,
    pub movies: Option<Vec<String>>,
}

/// Social metadata embedded in the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialSection {
    pub opengraph: Option<BTreeMap<String, String>>,
    pub twitter: Option<BTreeMap<String, String>>,
}
