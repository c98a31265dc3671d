//! Access configuration validators

use super::trait_def::Validate;
use crate::config::models::*;

impl Validate for TenancyConfig {
    fn validate(&self) -> Result<(), String> {
        if self.min_host_labels < 2 {
            return Err("Subdomain extraction needs at least 2 host labels".to_string());
        }

        if self.dedicated_max_connections == 0 {
            return Err("Dedicated max connections must be greater than 0".to_string());
        }

        if self.reserved_subdomains.iter().any(|s| s.contains('.')) {
            return Err("Reserved subdomains must be single labels".to_string());
        }

        Ok(())
    }
}

impl Validate for RbacConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_inheritance_depth == 0 {
            return Err("Max inheritance depth must be greater than 0".to_string());
        }

        if self.max_inheritance_depth > 64 {
            return Err("Max inheritance depth should not exceed 64".to_string());
        }

        let blank = |names: &[String]| names.iter().any(|n| n.trim().is_empty());
        if blank(&self.super_admin_roles) || blank(&self.extra_resources) || blank(&self.extra_actions) {
            return Err("Role, resource and action names cannot be blank".to_string());
        }

        Ok(())
    }
}

impl Validate for ContextConfig {
    fn validate(&self) -> Result<(), String> {
        for (name, collection) in &self.collections {
            if name.trim().is_empty() {
                return Err("Collection names cannot be blank".to_string());
            }

            if let Some(primary) = collection.primary {
                if !collection.has(primary) {
                    return Err(format!(
                        "Collection {} declares primary field {} it does not expose",
                        name,
                        primary.document_key()
                    ));
                }
            }

            if collection.columns.values().any(|c| c.trim().is_empty()) {
                return Err(format!("Collection {} has a blank column override", name));
            }
        }

        Ok(())
    }
}
