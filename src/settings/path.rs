//! Dot-separated setting keys

use crate::utils::error::{CoreError, Result};
use crate::utils::json::{lookup_present, set_path};
use serde_json::Value;
use std::fmt;

/// A validated key such as `payment.cashOnDelivery`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SettingKey(String);

impl SettingKey {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(CoreError::validation(format!("invalid setting key '{}'", raw)));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value at this key. `null` counts as absent; `false`, `0` and `""` do not.
    pub fn lookup<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        lookup_present(document, &self.0)
    }

    /// Write `value` at this key, creating intermediate objects
    pub fn assign(&self, document: &mut Value, value: Value) {
        set_path(document, &self.0, value);
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
