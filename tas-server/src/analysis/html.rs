//! HTML content processor
//!
//! Validates the `content` object of an `html` envelope, runs the
//! [`HtmlAnalyser`] once and normalizes its output into an [`AnalysisResult`].
//! Everything after validation runs behind a single catch-all boundary: an
//! analyser error or panic always surfaces as
//! [`ServiceError::HtmlContentProcessing`].

use super::analyser::{HtmlAnalyser, Metric, PageAnalysis, WebPage};
use super::ContentProcessor;
use crate::error::{truncate_detail, FieldErrors, Result, ServiceError};
use crate::models::{AnalysisResult, ContentSection, SocialSection};
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};
use url::Url;
use validator::Validate;

/// OpenGraph key the extractor uses for its own bookkeeping
pub const OPENGRAPH_URL_KEY: &str = "_url";

const MISSING_FIELD: &str = "Missing data for required field.";

/// Shape of an HTML `content` object
#[derive(Debug, Deserialize, Validate)]
struct WebPagePayload {
    #[validate(required(message = "Missing data for required field."), url(message = "Not a valid URL."))]
    url: Option<String>,
    #[validate(required(message = "Missing data for required field."))]
    html: Option<String>,
    #[validate(required(message = "Missing data for required field."))]
    headers: Option<BTreeMap<String, String>>,
}

/// Processor for `html` content
pub struct HtmlContentProcessor {
    analyser: Arc<dyn HtmlAnalyser>,
}

impl HtmlContentProcessor {
    pub fn new(analyser: Arc<dyn HtmlAnalyser>) -> Self {
        Self { analyser }
    }
}

impl ContentProcessor for HtmlContentProcessor {
    fn name(&self) -> &'static str {
        "html"
    }

    fn process_content(&self, content: Map<String, Value>) -> Result<AnalysisResult> {
        let page = parse_web_page(content)?;
        debug!(url = %page.url, html_bytes = page.html.len(), "analysing html content");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.analyser.analyse(&page).map(build_result)
        }));

        match outcome {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                let detail = format!("{:#}", e);
                error!(url = %page.url, error = %truncate_detail(&detail), "failed to extract content");
                Err(ServiceError::HtmlContentProcessing(detail))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(url = %page.url, panic = %truncate_detail(&message), "content analyser panicked");
                Err(ServiceError::HtmlContentProcessing(format!(
                    "analyser panicked: {}",
                    message
                )))
            }
        }
    }
}

/// Validate an HTML `content` object into a [`WebPage`]
pub fn parse_web_page(content: Map<String, Value>) -> Result<WebPage> {
    let payload: WebPagePayload = serde_json::from_value(Value::Object(content)).map_err(|e| {
        let mut errors = FieldErrors::new();
        errors.insert("content".to_string(), e.to_string());
        ServiceError::InvalidHtmlContent { errors }
    })?;

    if let Err(validation) = payload.validate() {
        let errors = validation
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                (field.to_string(), reason)
            })
            .collect();
        return Err(ServiceError::InvalidHtmlContent { errors });
    }

    let (Some(url), Some(html), Some(headers)) = (payload.url, payload.html, payload.headers)
    else {
        let mut errors = FieldErrors::new();
        errors.insert("content".to_string(), MISSING_FIELD.to_string());
        return Err(ServiceError::InvalidHtmlContent { errors });
    };

    let url = Url::parse(&url).map_err(|e| {
        let mut errors = FieldErrors::new();
        errors.insert("url".to_string(), e.to_string());
        ServiceError::InvalidHtmlContent { errors }
    })?;

    Ok(WebPage { url, html, headers })
}

/// Convert analyser output into the response envelope
pub fn build_result(analysis: PageAnalysis) -> AnalysisResult {
    AnalysisResult {
        content: ContentSection {
            text: analysis.text,
            title: analysis.title,
            html: analysis.html,
            keywords: analysis.keywords.map(normalize_keywords),
            summary: analysis.summary,
            readability_scores: analysis.readability_scores.map(normalize_metrics),
            statistics: analysis.statistics.map(normalize_metrics),
            named_entities: analysis.named_entities.map(|entities| {
                entities
                    .into_iter()
                    .map(|(tag, names)| (tag, names.into_iter().collect()))
                    .collect()
            }),
            top_image: analysis.top_image,
            images: analysis.images,
            movies: analysis.movies,
        },
        social: SocialSection {
            opengraph: strip_opengraph_bookkeeping(analysis.opengraph),
            twitter: analysis.twitter,
        },
    }
}

/// Convert metrics to plain JSON numbers
///
/// Counts stay integers, reals become floats, non-finite reals become `null`.
pub fn normalize_metrics(metrics: BTreeMap<String, Metric>) -> Map<String, Value> {
    metrics
        .into_iter()
        .map(|(name, metric)| {
            let value = match metric {
                Metric::Count(n) => Value::from(n),
                Metric::Real(x) => Number::from_f64(x).map(Value::Number).unwrap_or(Value::Null),
                Metric::Label(label) => Value::String(label),
            };
            (name, value)
        })
        .collect()
}

/// Keyword phrase → score, first score wins, non-finite scores dropped
pub fn normalize_keywords(keywords: Vec<(String, f64)>) -> BTreeMap<String, f64> {
    let mut normalized = BTreeMap::new();
    for (phrase, score) in keywords {
        if phrase.is_empty() || !score.is_finite() {
            continue;
        }
        normalized.entry(phrase).or_insert(score);
    }
    normalized
}

/// Remove the `_url` bookkeeping key
///
/// An object left empty stays an empty object; only `None` maps to `None`.
pub fn strip_opengraph_bookkeeping(
    opengraph: Option<BTreeMap<String, String>>,
) -> Option<BTreeMap<String, String>> {
    opengraph.map(|mut properties| {
        properties.remove(OPENGRAPH_URL_KEY);
        properties
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
