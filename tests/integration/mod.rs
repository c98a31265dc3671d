//! Integration tests
//!
//! Every test builds its own `AccessCore` over in-memory SQLite.

mod config_validation_tests;
mod permission_tests;
mod request_flow_tests;
mod settings_tests;
mod tenancy_tests;
