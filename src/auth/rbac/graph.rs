//! Effective permission set collection
//!
//! Roles form a DAG through `inherited_roles`. Traversal keeps a visited set
//! and the current path, so a cycle is reported as a diagnostic instead of
//! looping, and diamonds are expanded once.

use super::types::{
    Diagnostic, DiagnosticKind, GrantSource, Permission, PermissionResolver, Role,
};
use crate::auth::Actor;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Loads roles referenced through `inherited_roles`
#[async_trait]
pub trait RoleSource: Send + Sync {
    async fn load_role(&self, role_id: &str) -> Result<Option<Role>>;
}

/// One permission reachable by the actor
#[derive(Debug, Clone, PartialEq)]
pub struct EffectivePermission {
    pub permission: Permission,
    pub source: GrantSource,
    /// Resolver of the role or group that contributed this permission
    pub source_resolver: Option<PermissionResolver>,
    /// Position in definition order
    pub order: usize,
}

impl EffectivePermission {
    /// The permission's own resolver wins over its source's
    pub fn resolver(&self) -> Option<&PermissionResolver> {
        self.permission
            .resolver
            .as_ref()
            .or(self.source_resolver.as_ref())
    }

    pub fn priority(&self) -> i32 {
        self.resolver().map(|r| r.priority).unwrap_or(0)
    }
}

/// Everything the actor can reach, in definition order
#[derive(Debug, Clone, Default)]
pub struct EffectiveSet {
    pub entries: Vec<EffectivePermission>,
    pub diagnostics: Vec<Diagnostic>,
    /// Resolvers by role or group id, for `inherit_from` lookups
    pub resolvers: HashMap<String, PermissionResolver>,
}

impl EffectiveSet {
    fn push(&mut self, permission: &Permission, source: GrantSource, resolver: Option<&PermissionResolver>) {
        let order = self.entries.len();
        self.entries.push(EffectivePermission {
            permission: permission.clone(),
            source,
            source_resolver: resolver.cloned(),
            order,
        });
    }

    fn add_role(&mut self, role: &Role) {
        if let Some(resolver) = &role.resolver {
            self.resolvers.insert(role.id.clone(), resolver.clone());
        }
        for permission in &role.permissions {
            self.push(
                permission,
                GrantSource::Role {
                    role_id: role.id.clone(),
                },
                role.resolver.as_ref(),
            );
        }
        for group in role.permission_groups.iter().filter(|g| g.is_active) {
            if let Some(resolver) = &group.resolver {
                self.resolvers.insert(group.id.clone(), resolver.clone());
            }
            for permission in &group.permissions {
                self.push(
                    permission,
                    GrantSource::Group {
                        role_id: role.id.clone(),
                        group_id: group.id.clone(),
                    },
                    group.resolver.as_ref(),
                );
            }
        }
    }

    pub fn has_config_error(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_config_error)
    }

    /// Entries granting `(resource, action)`
    pub fn matching<'a>(
        &'a self,
        resource: &'a str,
        action: &'a str,
    ) -> impl Iterator<Item = &'a EffectivePermission> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.permission.matches(resource, action))
    }
}

struct Frame {
    role: Role,
    depth: usize,
    path: Vec<String>,
}

/// Collect direct grants, role permissions, group permissions and everything
/// reachable through inheritance.
pub async fn collect_effective(
    actor: &Actor,
    source: &dyn RoleSource,
    max_depth: usize,
) -> Result<EffectiveSet> {
    let mut set = EffectiveSet::default();

    for permission in &actor.direct_permissions {
        set.push(permission, GrantSource::Direct, None);
    }

    // A role counts as expanded once its own inheritance list has been walked.
    // Pending frames are not expanded, so a back-edge to a queued sibling
    // still reaches the path check.
    let mut expanded: HashSet<String> = HashSet::new();

    for root in actor.roles.iter().filter(|r| r.is_active) {
        let mut stack = vec![Frame {
            role: root.clone(),
            depth: 0,
            path: Vec::new(),
        }];

        while let Some(frame) = stack.pop() {
            if !expanded.insert(frame.role.id.clone()) {
                continue;
            }
            set.add_role(&frame.role);

            let mut path = frame.path;
            path.push(frame.role.id.clone());

            let mut children = Vec::new();
            for parent_id in &frame.role.inherited_roles {
                if path.contains(parent_id) {
                    let cycle = format!("{} -> {}", path.join(" -> "), parent_id);
                    warn!("Role inheritance cycle detected: {}", cycle);
                    set.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::InheritanceCycle,
                        format!("inheritance cycle: {}", cycle),
                    ));
                    continue;
                }
                if expanded.contains(parent_id) {
                    continue;
                }
                if frame.depth + 1 > max_depth {
                    set.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::DepthExceeded,
                        format!(
                            "inheritance from {} to {} exceeds depth {}",
                            frame.role.id, parent_id, max_depth
                        ),
                    ));
                    continue;
                }

                match source.load_role(parent_id).await? {
                    Some(parent) if parent.is_active => children.push(Frame {
                        role: parent,
                        depth: frame.depth + 1,
                        path: path.clone(),
                    }),
                    Some(_) => debug!("Skipping inactive inherited role {}", parent_id),
                    None => set.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::MissingRole,
                        format!("role {} inherits unknown role {}", frame.role.id, parent_id),
                    )),
                }
            }

            // Reverse so the first declared parent is expanded first
            stack.extend(children.into_iter().rev());
        }
    }

    debug!(
        "Collected {} effective permissions for actor {}",
        set.entries.len(),
        actor.id
    );
    Ok(set)
}

/// Find a cycle reachable from `start` in a role graph given as an adjacency
/// lookup. Returns the offending path.
pub fn find_cycle<F>(start: &str, parents_of: F) -> Option<Vec<String>>
where
    F: Fn(&str) -> Vec<String>,
{
    fn visit<F>(
        node: &str,
        parents_of: &F,
        path: &mut Vec<String>,
        done: &mut HashSet<String>,
    ) -> Option<Vec<String>>
    where
        F: Fn(&str) -> Vec<String>,
    {
        if let Some(pos) = path.iter().position(|p| p == node) {
            let mut cycle = path[pos..].to_vec();
            cycle.push(node.to_string());
            return Some(cycle);
        }
        if done.contains(node) {
            return None;
        }

        path.push(node.to_string());
        for parent in parents_of(node) {
            if let Some(cycle) = visit(&parent, parents_of, path, done) {
                return Some(cycle);
            }
        }
        path.pop();
        done.insert(node.to_string());
        None
    }

    visit(start, &parents_of, &mut Vec::new(), &mut HashSet::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::rbac::types::PermissionGroup;
    use dashmap::DashMap;

    #[derive(Default)]
    struct MapSource(DashMap<String, Role>);

    impl MapSource {
        fn with(self, role: Role) -> Self {
            self.0.insert(role.id.clone(), role);
            self
        }
    }

    #[async_trait]
    impl RoleSource for MapSource {
        async fn load_role(&self, role_id: &str) -> Result<Option<Role>> {
            Ok(self.0.get(role_id).map(|r| r.clone()))
        }
    }

    #[tokio::test]
    async fn test_collects_all_sources_in_order() {
        let base = Role::new("base", "Base").with_permission(Permission::new("p3", "report", "read"));
        let source = MapSource::default().with(base);

        let manager = Role::new("manager", "Manager")
            .with_permission(Permission::new("p1", "product", "read"))
            .with_group(
                PermissionGroup::new("g1", "Catalog")
                    .with_permission(Permission::new("p2", "product", "update")),
            )
            .inherits("base");
        let actor = Actor::new("u1")
            .with_permission(Permission::new("p0", "order", "read"))
            .with_role(manager);

        let set = collect_effective(&actor, &source, 10).await.unwrap();
        let ids: Vec<_> = set.entries.iter().map(|e| e.permission.id.as_str()).collect();
        assert_eq!(ids, vec!["p0", "p1", "p2", "p3"]);
        assert!(set.diagnostics.is_empty());
        assert_eq!(
            set.entries[2].source,
            GrantSource::Group {
                role_id: "manager".to_string(),
                group_id: "g1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_cycle_terminates_with_diagnostic() {
        let r1 = Role::new("r1", "R1").inherits("r2");
        let r2 = Role::new("r2", "R2").inherits("r1");
        let source = MapSource::default().with(r1.clone()).with(r2);

        let actor = Actor::new("u1").with_role(r1);
        let set = collect_effective(&actor, &source, 10).await.unwrap();

        assert!(set.has_config_error());
        assert_eq!(set.diagnostics[0].kind, DiagnosticKind::InheritanceCycle);
    }

    #[tokio::test]
    async fn test_cycle_between_siblings_is_detected() {
        let b = Role::new("b", "B").inherits("c");
        let c = Role::new("c", "C").inherits("b");
        let source = MapSource::default().with(b).with(c);

        let a = Role::new("a", "A").inherits("b").inherits("c");
        let actor = Actor::new("u1").with_role(a);
        let set = collect_effective(&actor, &source, 10).await.unwrap();

        assert!(set.has_config_error());
        assert!(set
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::InheritanceCycle && d.message.contains("b -> c -> b")));
    }

    #[tokio::test]
    async fn test_diamond_is_not_a_cycle() {
        let root = Role::new("root", "Root").with_permission(Permission::new("p", "order", "read"));
        let left = Role::new("left", "Left").inherits("root");
        let right = Role::new("right", "Right").inherits("root");
        let source = MapSource::default()
            .with(root)
            .with(left.clone())
            .with(right.clone());

        let actor = Actor::new("u1").with_role(left).with_role(right);
        let set = collect_effective(&actor, &source, 10).await.unwrap();

        assert!(!set.has_config_error());
        assert_eq!(set.entries.len(), 1);
    }

    #[tokio::test]
    async fn test_depth_bound() {
        let source = MapSource::default()
            .with(Role::new("a", "A").inherits("b"))
            .with(Role::new("b", "B").inherits("c"))
            .with(Role::new("c", "C").with_permission(Permission::new("p", "order", "read")));

        let actor = Actor::new("u1").with_role(Role::new("a", "A").inherits("b"));
        let set = collect_effective(&actor, &source, 1).await.unwrap();

        assert!(set.entries.is_empty());
        assert_eq!(set.diagnostics[0].kind, DiagnosticKind::DepthExceeded);
        assert!(!set.has_config_error());
    }

    #[test]
    fn test_find_cycle() {
        let graph = |id: &str| -> Vec<String> {
            match id {
                "a" => vec!["b".to_string()],
                "b" => vec!["c".to_string()],
                "c" => vec!["a".to_string()],
                _ => vec![],
            }
        };
        assert_eq!(
            find_cycle("a", graph),
            Some(vec!["a".into(), "b".into(), "c".into(), "a".into()])
        );

        let acyclic = |id: &str| -> Vec<String> {
            match id {
                "a" => vec!["b".to_string(), "c".to_string()],
                "b" => vec!["c".to_string()],
                _ => vec![],
            }
        };
        assert_eq!(find_cycle("a", acyclic), None);
    }
}
