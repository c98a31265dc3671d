//! RBAC type definitions

use crate::auth::ResourceAttributes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

fn default_active() -> bool {
    true
}

/// Whether a matching permission grants or withholds access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

/// Condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    #[serde(alias = "not_in", alias = "nin")]
    NotIn,
    Contains,
    #[serde(alias = "starts_with")]
    StartsWith,
    #[serde(alias = "ends_with")]
    EndsWith,
    Between,
    Regex,
    Like,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Eq => "eq",
            ConditionOperator::Neq => "neq",
            ConditionOperator::Gt => "gt",
            ConditionOperator::Gte => "gte",
            ConditionOperator::Lt => "lt",
            ConditionOperator::Lte => "lte",
            ConditionOperator::In => "in",
            ConditionOperator::NotIn => "not-in",
            ConditionOperator::Contains => "contains",
            ConditionOperator::StartsWith => "starts-with",
            ConditionOperator::EndsWith => "ends-with",
            ConditionOperator::Between => "between",
            ConditionOperator::Regex => "regex",
            ConditionOperator::Like => "like",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single predicate over the evaluation context. All conditions of a
/// permission must hold for it to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dot path into the context, e.g. `resource.category`
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}

/// Granularity a permission applies at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeKind {
    #[default]
    Global,
    Company,
    #[serde(alias = "business-unit")]
    Business,
    Outlet,
    Department,
    Branch,
    Vendor,
    Region,
    #[serde(rename = "self", alias = "own")]
    SelfOwned,
}

impl ScopeKind {
    /// Narrowest first: self < outlet < department/branch < business < company < global.
    /// Vendor and region sit with department and branch.
    pub fn specificity(&self) -> u8 {
        match self {
            ScopeKind::SelfOwned => 0,
            ScopeKind::Outlet => 1,
            ScopeKind::Department | ScopeKind::Branch | ScopeKind::Vendor | ScopeKind::Region => 2,
            ScopeKind::Business => 3,
            ScopeKind::Company => 4,
            ScopeKind::Global => 5,
        }
    }
}

/// Conflict resolution strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    #[default]
    FirstMatch,
    MostSpecific,
    PriorityBased,
    Cumulative,
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionStrategy::FirstMatch => "first-match",
            ResolutionStrategy::MostSpecific => "most-specific",
            ResolutionStrategy::PriorityBased => "priority-based",
            ResolutionStrategy::Cumulative => "cumulative",
        };
        f.write_str(name)
    }
}

/// Resolution settings attached to a role, group or permission
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResolver {
    /// `None` inherits the strategy of the first `inherit_from` source that has one
    #[serde(default)]
    pub strategy: Option<ResolutionStrategy>,
    #[serde(default)]
    pub priority: i32,
    /// Role or group ids to inherit a strategy from
    #[serde(default)]
    pub inherit_from: Vec<String>,
    /// Candidates under an overriding resolver shadow all others
    #[serde(default, rename = "override")]
    pub override_others: bool,
    /// Applied to candidates still tied after the strategy ran
    #[serde(default)]
    pub fallback: Option<ResolutionStrategy>,
}

impl PermissionResolver {
    pub fn new(strategy: ResolutionStrategy) -> Self {
        Self {
            strategy: Some(strategy),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Permission definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    pub resource: String,
    pub action: String,
    #[serde(default)]
    pub scope: ScopeKind,
    #[serde(default)]
    pub effect: Effect,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub resolver: Option<PermissionResolver>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Permission {
    pub fn new(id: impl Into<String>, resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource: resource.into(),
            action: action.into(),
            scope: ScopeKind::Global,
            effect: Effect::Allow,
            attributes: Vec::new(),
            conditions: Vec::new(),
            resolver: None,
            is_active: true,
        }
    }

    pub fn with_scope(mut self, scope: ScopeKind) -> Self {
        self.scope = scope;
        self
    }

    pub fn deny(mut self) -> Self {
        self.effect = Effect::Deny;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_resolver(mut self, resolver: PermissionResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn matches(&self, resource: &str, action: &str) -> bool {
        self.is_active && self.resource == resource && self.action == action
    }
}

/// Named bundle of permissions with its own resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub resolver: Option<PermissionResolver>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl PermissionGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            permissions: Vec::new(),
            resolver: None,
            is_active: true,
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn with_resolver(mut self, resolver: PermissionResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

/// Role definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub permission_groups: Vec<PermissionGroup>,
    /// Ids of roles whose permissions this role inherits
    #[serde(default)]
    pub inherited_roles: Vec<String>,
    #[serde(default)]
    pub hierarchy_level: u32,
    #[serde(default)]
    pub is_system_role: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub resolver: Option<PermissionResolver>,
}

impl Role {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            permissions: Vec::new(),
            permission_groups: Vec::new(),
            inherited_roles: Vec::new(),
            hierarchy_level: 0,
            is_system_role: false,
            is_active: true,
            resolver: None,
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn with_group(mut self, group: PermissionGroup) -> Self {
        self.permission_groups.push(group);
        self
    }

    pub fn inherits(mut self, role_id: impl Into<String>) -> Self {
        self.inherited_roles.push(role_id.into());
        self
    }

    pub fn with_resolver(mut self, resolver: PermissionResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

/// Context ids the request is operating within
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_unit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
}

/// Request environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// `HH:MM`, compared lexicographically
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<String>,
}

/// Runtime description of what is being acted on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionContext {
    #[serde(default)]
    pub resource: Option<ResourceAttributes>,
    #[serde(default)]
    pub scope: Option<ScopeContext>,
    #[serde(default)]
    pub environment: Option<EnvironmentContext>,
}

impl PermissionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, resource: ResourceAttributes) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_scope(mut self, scope: ScopeContext) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_environment(mut self, environment: EnvironmentContext) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn scope_ref(&self) -> Option<&ScopeContext> {
        self.scope.as_ref()
    }

    pub fn resource_ref(&self) -> Option<&ResourceAttributes> {
        self.resource.as_ref()
    }

    /// JSON document conditions are evaluated against
    pub fn projection(&self, user: Value) -> Value {
        let mut root = Map::new();
        root.insert("user".to_string(), user);
        root.insert(
            "resource".to_string(),
            serde_json::to_value(&self.resource).unwrap_or(Value::Null),
        );
        root.insert(
            "scope".to_string(),
            serde_json::to_value(&self.scope).unwrap_or(Value::Null),
        );
        root.insert(
            "environment".to_string(),
            serde_json::to_value(&self.environment).unwrap_or(Value::Null),
        );
        Value::Object(root)
    }
}

/// Where an effective permission came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrantSource {
    Direct,
    Role { role_id: String },
    Group { role_id: String, group_id: String },
}

impl fmt::Display for GrantSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantSource::Direct => write!(f, "direct grant"),
            GrantSource::Role { role_id } => write!(f, "role {}", role_id),
            GrantSource::Group { role_id, group_id } => {
                write!(f, "group {} via role {}", group_id, role_id)
            }
        }
    }
}

/// What decided the outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "strategy", rename_all = "snake_case")]
pub enum ResolvedBy {
    SuperAdmin,
    Catalog,
    DefaultDeny,
    ConfigError,
    Strategy(ResolutionStrategy),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    InheritanceCycle,
    DepthExceeded,
    MissingRole,
}

/// A problem found in the permission graph while evaluating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Cycles make the graph untrustworthy; other problems only shrink it
    pub fn is_config_error(&self) -> bool {
        matches!(self.kind, DiagnosticKind::InheritanceCycle)
    }
}

/// Permission check result.
///
/// `trace` and `diagnostics` are for logs and operators, never for end users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub winning_permission: Option<Permission>,
    pub reason: String,
    pub resolved_by: ResolvedBy,
    #[serde(default)]
    pub trace: Vec<String>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl Decision {
    pub fn deny(reason: impl Into<String>, resolved_by: ResolvedBy) -> Self {
        Self {
            allowed: false,
            winning_permission: None,
            reason: reason.into(),
            resolved_by,
            trace: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn super_admin() -> Self {
        Self {
            allowed: true,
            winning_permission: None,
            reason: "super admin bypass".to_string(),
            resolved_by: ResolvedBy::SuperAdmin,
            trace: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn has_config_error(&self) -> bool {
        self.resolved_by == ResolvedBy::ConfigError
            || self.diagnostics.iter().any(Diagnostic::is_config_error)
    }
}
