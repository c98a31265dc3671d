//! Settings cascade
//!
//! Effective configuration values come from the first level that sets them:
//! Outlet, Business Unit, Organization, Platform, then System.

pub mod path;
pub mod resolver;
pub mod store;
pub mod types;

pub use path::SettingKey;
pub use resolver::SettingsCascadeResolver;
pub use store::SettingsStore;
pub use types::{ResolvedSetting, SINGLETON_OWNER, SettingsContext, SettingsLevel};
