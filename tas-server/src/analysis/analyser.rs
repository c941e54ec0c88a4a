//! Text analysis capability consumed by the HTML processor
//!
//! [`HtmlAnalyser`] is the seam between the request pipeline and the engine
//! that actually reads the document. The pipeline only depends on this trait
//! and on the [`PageAnalysis`] aggregate it returns.

use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// A captured web page, validated
#[derive(Debug, Clone, PartialEq)]
pub struct WebPage {
    pub url: Url,
    pub html: String,
    pub headers: BTreeMap<String, String>,
}

/// A numeric or textual measurement as produced by an analyser
///
/// Analysers are free to pick the representation; the processor converts
/// every value to a plain JSON number or string before serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    Count(u64),
    Real(f64),
    Label(String),
}

/// Aggregate output of one analysis
///
/// Each facet is independently optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageAnalysis {
    pub text: Option<String>,
    pub html: Option<String>,
    pub title: Option<String>,
    /// Keyword phrase and score, best first
    pub keywords: Option<Vec<(String, f64)>>,
    pub summary: Option<String>,
    pub readability_scores: Option<BTreeMap<String, Metric>>,
    pub statistics: Option<BTreeMap<String, Metric>>,
    pub named_entities: Option<BTreeMap<String, BTreeSet<String>>>,
    /// OpenGraph properties, possibly including the `_url` bookkeeping key
    pub opengraph: Option<BTreeMap<String, String>>,
    pub twitter: Option<BTreeMap<String, String>>,
    pub top_image: Option<String>,
    pub images: Option<Vec<String>>,
    pub movies: Option<Vec<String>>,
}

/// Extracts text, keywords, statistics and social metadata from a page
///
/// Called once per request from a blocking worker thread. Implementations
/// must be deterministic for a fixed input and configuration.
pub trait HtmlAnalyser: Send + Sync {
    fn analyse(&self, page: &WebPage) -> anyhow::Result<PageAnalysis>;
}
