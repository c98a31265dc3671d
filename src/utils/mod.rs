//! Utility modules shared across the access core
//!
//! - **error**: Error taxonomy and the crate-wide `Result` alias
//! - **json**: Dot-path access into JSON documents
//! - **logging**: Tracing bootstrap and log sanitization

pub mod error;
pub mod json;
pub mod logging;

pub use error::{CoreError, Result};
