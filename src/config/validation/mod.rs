//! Configuration validation
//!
//! The validation is organized into several submodules:
//! - `trait_def`: Core Validate trait definition
//! - `storage_validators`: Storage and cache validators
//! - `access_validators`: Tenancy, RBAC and context isolation validators
//! - `tests`: Test suite for all validators

mod access_validators;
mod storage_validators;
mod trait_def;

pub use trait_def::Validate;
