//! Error Handling utilities
//!
//! This module provides the crate error type and its HTTP-facing classification.

pub mod error;

pub use error::*;
