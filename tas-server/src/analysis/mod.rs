//! Content analysis dispatch
//!
//! [`ContentAnalyser`] maps a request's `content_type` to the one registered
//! [`ContentProcessor`] that handles it. The registry is built once at
//! startup and is read-only afterwards.

pub mod analyser;
pub mod html;

use crate::error::{truncate_detail, Result, ServiceError};
use crate::models::{AnalysisResult, Envelope};
use analyser::HtmlAnalyser;
use html::HtmlContentProcessor;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tas_common::config::{ContentTypeMatching, ServiceConfig};
use tracing::{debug, error, warn};

/// Exact-match registry key for HTML content
pub const HTML_CONTENT_TYPE: &str = "html";

/// Prefix-match registry key for HTML content
pub const HTML_MIME_PREFIX: &str = "text/html";

/// Turns the `content` object of one content type into an analysis result
///
/// Processors are stateless with respect to requests and are called from
/// blocking worker threads.
pub trait ContentProcessor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn process_content(&self, content: Map<String, Value>) -> Result<AnalysisResult>;
}

/// Content type registry and dispatcher
pub struct ContentAnalyser {
    matching: ContentTypeMatching,
    /// Lowercased key → processor, longest key first
    processors: Vec<(String, Arc<dyn ContentProcessor>)>,
}

impl ContentAnalyser {
    pub fn builder(matching: ContentTypeMatching) -> ContentAnalyserBuilder {
        ContentAnalyserBuilder {
            matching,
            processors: Vec::new(),
        }
    }

    /// Registry with the HTML processor under the key for `config`'s discipline
    pub fn standard(config: &ServiceConfig, analyser: Arc<dyn HtmlAnalyser>) -> Self {
        let key = match config.content_type_matching {
            ContentTypeMatching::Exact => HTML_CONTENT_TYPE,
            ContentTypeMatching::Prefix => HTML_MIME_PREFIX,
        };
        Self::builder(config.content_type_matching)
            .register(key, Arc::new(HtmlContentProcessor::new(analyser)))
            .build()
    }

    pub fn matching(&self) -> ContentTypeMatching {
        self.matching
    }

    /// Registered keys, in match order
    pub fn content_types(&self) -> Vec<&str> {
        self.processors.iter().map(|(key, _)| key.as_str()).collect()
    }

    /// Find the processor for `content_type`
    pub fn select(&self, content_type: &str) -> Result<Arc<dyn ContentProcessor>> {
        let wanted = content_type.trim().to_ascii_lowercase();

        let found = self.processors.iter().find(|(key, _)| match self.matching {
            ContentTypeMatching::Exact => wanted == *key,
            ContentTypeMatching::Prefix => wanted.starts_with(key.as_str()),
        });

        match found {
            Some((key, processor)) => {
                debug!(content_type = %content_type, key = %key, processor = processor.name(), "selected processor");
                Ok(Arc::clone(processor))
            }
            None => {
                warn!(content_type = %content_type, "unsupported content type");
                Err(ServiceError::UnsupportedContentType {
                    content_type: content_type.to_string(),
                })
            }
        }
    }

    /// Dispatch `envelope` to its processor on the calling thread
    pub fn analyse(&self, envelope: Envelope) -> Result<AnalysisResult> {
        let processor = self.select(&envelope.content_type)?;
        processor.process_content(envelope.content)
    }

    /// Dispatch `envelope` on a blocking worker, bounded by `timeout`
    ///
    /// Processor selection happens before the worker is spawned so that an
    /// unsupported type never costs a thread. A worker that misses the
    /// deadline is detached and keeps running until it returns.
    pub async fn analyse_with_deadline(
        self: Arc<Self>,
        envelope: Envelope,
        timeout: Duration,
    ) -> Result<AnalysisResult> {
        let processor = self.select(&envelope.content_type)?;
        let Envelope { content, .. } = envelope;

        let task = tokio::task::spawn_blocking(move || processor.process_content(content));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) if join_error.is_panic() => {
                error!(error = %truncate_detail(&join_error), "analysis worker panicked");
                Err(ServiceError::HtmlContentProcessing(format!(
                    "analysis worker panicked: {}",
                    join_error
                )))
            }
            Ok(Err(join_error)) => Err(ServiceError::Unknown(format!(
                "analysis worker failed: {}",
                join_error
            ))),
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "content analysis timed out");
                Err(ServiceError::AnalysisTimeout(timeout))
            }
        }
    }
}

/// Builder for [`ContentAnalyser`]
pub struct ContentAnalyserBuilder {
    matching: ContentTypeMatching,
    processors: Vec<(String, Arc<dyn ContentProcessor>)>,
}

impl ContentAnalyserBuilder {
    /// Register `processor` under `key`
    ///
    /// Keys are case-insensitive. Registering a key twice replaces the
    /// earlier processor.
    pub fn register(mut self, key: &str, processor: Arc<dyn ContentProcessor>) -> Self {
        let key = key.trim().to_ascii_lowercase();
        self.processors.retain(|(existing, _)| *existing != key);
        self.processors.push((key, processor));
        self
    }

    pub fn build(mut self) -> ContentAnalyser {
        // Longest prefix wins under prefix matching
        self.processors
            .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        ContentAnalyser {
            matching: self.matching,
            processors: self.processors,
        }
    }
}
