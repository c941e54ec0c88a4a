//! # TAS Common Library
//!
//! Shared code for the text analysis service crates including:
//! - Bootstrap configuration loading (CLI > ENV > TOML > defaults)
//! - Logging configuration and `tracing` subscriber installation
//! - Process-wide metrics sink
//! - Common error types

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{Error, Result};
pub use metrics::{MetricsSink, ServiceMetrics};
