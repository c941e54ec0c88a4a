//! HTTP API handlers for tas

pub mod error_handlers;
pub mod metrics;
pub mod process;
pub mod service;
pub mod v1;

pub use error_handlers::{ErrorHandlerChain, ErrorResponse};
pub use metrics::{instrumented, Instrumentation, MetricNames};
pub use process::process_content;
pub use service::{health, information};
