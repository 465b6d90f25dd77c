//! Utility modules for common functionality.
//!
//! - http: HTTP client utilities (i.e. creation retryable HTTP clients)
//! - logging: Logging setup and structured error context
//! - parsing: Parsing utilities
//! - tests: Test utilities

pub mod http;
pub mod logging;
pub mod parsing;
pub mod tests;

pub use http::*;
pub use parsing::*;
