//! Built-in text analysis engine
//!
//! [`DefaultHtmlAnalyser`] implements [`HtmlAnalyser`] with deterministic
//! heuristics: readability main-content extraction, RAKE keywords,
//! readability formulas, an extractive summary and pattern-based entity
//! tagging. It exists so the service runs standalone; a stronger engine only
//! needs to implement the same trait.

pub mod document;
pub mod entities;
pub mod keywords;
pub mod readability;
pub mod summary;
pub mod text;

use crate::analysis::analyser::{HtmlAnalyser, PageAnalysis, WebPage};
use document::Document;
use keywords::{Rake, STOP_LISTS};
use readability::TextStats;
use tas_common::config::ServiceConfig;
use tas_common::{Error, Result};
use tracing::debug;

/// Deterministic HTML analyser
#[derive(Debug, Clone)]
pub struct DefaultHtmlAnalyser {
    rake: Rake,
    summary_sentences: usize,
}

impl DefaultHtmlAnalyser {
    /// Fails when `keyword_stop_list` names no known stop list
    pub fn new(keyword_stop_list: &str, summary_sentences: usize) -> Result<Self> {
        let rake = Rake::new(keyword_stop_list).ok_or_else(|| {
            Error::Config(format!(
                "Unknown keyword stop list: {} (available: {})",
                keyword_stop_list,
                STOP_LISTS.join(", ")
            ))
        })?;

        Ok(Self {
            rake,
            summary_sentences,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(&config.keyword_stop_list, config.summary_sentences)
    }
}

impl HtmlAnalyser for DefaultHtmlAnalyser {
    fn analyse(&self, page: &WebPage) -> anyhow::Result<PageAnalysis> {
        let document = Document::parse(&page.html, &page.url);

        let text = document.text();
        let opengraph = document.opengraph();
        let twitter = document.twitter_card();
        let images = document.images();
        let top_image = document.top_image(opengraph.as_ref(), twitter.as_ref(), &images);
        let movies = document.movies();

        let mut analysis = PageAnalysis {
            title: document.title(),
            html: document.content_html(),
            top_image,
            images: Some(images),
            movies: Some(movies),
            opengraph,
            twitter,
            ..Default::default()
        };

        if let Some(text) = &text {
            let keywords = self.rake.run(text);
            let stats = TextStats::compute(text);
            debug!(
                url = %page.url,
                chars = text.len(),
                keywords = keywords.len(),
                "extracted page text"
            );

            analysis.keywords = Some(keywords);
            analysis.summary = summary::summarize(&self.rake, text, self.summary_sentences);
            analysis.readability_scores = stats.as_ref().map(TextStats::readability_scores);
            analysis.statistics = stats.as_ref().map(TextStats::statistics);
            analysis.named_entities = entities::extract(text);
        }
        analysis.text = text;

        Ok(analysis)
    }
}
