//! Administrator-facing role, group and permission management
//!
//! Writes are validated before they land: condition values must fit their
//! operators and role inheritance must stay acyclic. Every accepted write bumps
//! the cache version of its entity type.

use super::conditions::validate_condition;
use super::graph::{RoleSource, find_cycle};
use super::types::{Permission, PermissionGroup, Role};
use crate::core::cache::{CacheVersions, EntityType};
use crate::utils::error::{CoreError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info};

pub struct RoleRegistry {
    roles: DashMap<String, Role>,
    groups: DashMap<String, PermissionGroup>,
    versions: Arc<CacheVersions>,
    /// Serializes check-then-insert for role writes
    write_lock: Mutex<()>,
}

fn validate_permission(permission: &Permission) -> Result<()> {
    if permission.id.trim().is_empty()
        || permission.resource.trim().is_empty()
        || permission.action.trim().is_empty()
    {
        return Err(CoreError::validation(
            "permission id, resource and action are required",
        ));
    }
    permission.conditions.iter().try_for_each(validate_condition)
}

fn validate_group(group: &PermissionGroup) -> Result<()> {
    group.permissions.iter().try_for_each(validate_permission)
}

impl RoleRegistry {
    pub fn new(versions: Arc<CacheVersions>) -> Self {
        Self {
            roles: DashMap::new(),
            groups: DashMap::new(),
            versions,
            write_lock: Mutex::new(()),
        }
    }

    pub fn versions(&self) -> &Arc<CacheVersions> {
        &self.versions
    }

    /// Create or replace a role
    pub async fn upsert_role(&self, role: Role) -> Result<()> {
        if role.id.trim().is_empty() {
            return Err(CoreError::validation("role id is required"));
        }
        role.permissions.iter().try_for_each(validate_permission)?;
        role.permission_groups.iter().try_for_each(validate_group)?;

        {
            let _guard = self.write_lock.lock();
            let cycle = find_cycle(&role.id, |id| {
                if id == role.id {
                    role.inherited_roles.clone()
                } else {
                    self.roles
                        .get(id)
                        .map(|r| r.inherited_roles.clone())
                        .unwrap_or_default()
                }
            });
            if let Some(cycle) = cycle {
                let path = cycle.join(" -> ");
                error!("Rejected role {}: inheritance cycle {}", role.id, path);
                return Err(CoreError::invalid_config(format!(
                    "role inheritance cycle: {}",
                    path
                )));
            }
            self.roles.insert(role.id.clone(), role.clone());
        }

        let version = self.versions.bump(EntityType::Role).await;
        info!("Stored role {} (role version {})", role.id, version);
        Ok(())
    }

    pub async fn delete_role(&self, role_id: &str) -> Result<Role> {
        let (_, role) = self
            .roles
            .remove(role_id)
            .ok_or_else(|| CoreError::not_found(format!("role {}", role_id)))?;
        self.versions.bump(EntityType::Role).await;
        info!("Deleted role {}", role_id);
        Ok(role)
    }

    pub fn get_role(&self, role_id: &str) -> Option<Role> {
        self.roles.get(role_id).map(|r| r.clone())
    }

    pub fn list_roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = self.roles.iter().map(|r| r.value().clone()).collect();
        roles.sort_by(|a, b| a.id.cmp(&b.id));
        roles
    }

    /// Create or replace a group; roles embedding it pick up the new version
    pub async fn upsert_group(&self, group: PermissionGroup) -> Result<()> {
        validate_group(&group)?;

        for mut role in self.roles.iter_mut() {
            for embedded in role.permission_groups.iter_mut() {
                if embedded.id == group.id {
                    *embedded = group.clone();
                }
            }
        }
        self.groups.insert(group.id.clone(), group.clone());

        self.versions.bump(EntityType::PermissionGroup).await;
        info!("Stored permission group {}", group.id);
        Ok(())
    }

    pub async fn delete_group(&self, group_id: &str) -> Result<PermissionGroup> {
        let (_, group) = self
            .groups
            .remove(group_id)
            .ok_or_else(|| CoreError::not_found(format!("permission group {}", group_id)))?;
        for mut role in self.roles.iter_mut() {
            role.permission_groups.retain(|g| g.id != group_id);
        }
        self.versions.bump(EntityType::PermissionGroup).await;
        Ok(group)
    }

    pub fn get_group(&self, group_id: &str) -> Option<PermissionGroup> {
        self.groups.get(group_id).map(|g| g.clone())
    }

    /// Replace a permission everywhere it is embedded, returning how many
    /// copies were updated
    pub async fn update_permission(&self, permission: Permission) -> Result<usize> {
        validate_permission(&permission)?;

        let mut updated = 0;
        let mut replace = |list: &mut Vec<Permission>| {
            for existing in list.iter_mut().filter(|p| p.id == permission.id) {
                *existing = permission.clone();
                updated += 1;
            }
        };

        for mut role in self.roles.iter_mut() {
            let role = role.value_mut();
            replace(&mut role.permissions);
            for group in role.permission_groups.iter_mut() {
                replace(&mut group.permissions);
            }
        }
        for mut group in self.groups.iter_mut() {
            replace(&mut group.value_mut().permissions);
        }

        self.versions.bump(EntityType::Permission).await;
        Ok(updated)
    }
}

#[async_trait]
impl RoleSource for RoleRegistry {
    async fn load_role(&self, role_id: &str) -> Result<Option<Role>> {
        Ok(self.get_role(role_id))
    }
}
