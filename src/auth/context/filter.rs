//! Mandatory query filter derived from the actor's memberships

use super::types::ContextField;
use crate::utils::json::as_key;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::Condition;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashSet};

/// Constraint on one context field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldConstraint {
    Eq(String),
    /// An empty set matches nothing
    In(Vec<String>),
}

impl FieldConstraint {
    pub fn from_ids(mut ids: Vec<String>) -> Self {
        let mut seen = HashSet::new();
        ids.retain(|id| seen.insert(id.clone()));
        if ids.len() == 1 {
            FieldConstraint::Eq(ids.remove(0))
        } else {
            FieldConstraint::In(ids)
        }
    }

    pub fn allows(&self, value: &str) -> bool {
        match self {
            FieldConstraint::Eq(id) => id == value,
            FieldConstraint::In(ids) => ids.iter().any(|id| id == value),
        }
    }
}

/// Filter every read must carry.
///
/// Unrestricted filters come only from super admins or collections without
/// context fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryFilter {
    unrestricted: bool,
    clauses: BTreeMap<ContextField, FieldConstraint>,
    columns: BTreeMap<ContextField, String>,
}

impl QueryFilter {
    pub fn unrestricted() -> Self {
        Self {
            unrestricted: true,
            ..Default::default()
        }
    }

    pub(crate) fn restricted() -> Self {
        Self::default()
    }

    pub(crate) fn constrain(&mut self, field: ContextField, column: String, constraint: FieldConstraint) {
        self.clauses.insert(field, constraint);
        self.columns.insert(field, column);
    }

    pub fn is_unrestricted(&self) -> bool {
        self.unrestricted
    }

    pub fn constraint(&self, field: ContextField) -> Option<&FieldConstraint> {
        self.clauses.get(&field)
    }

    /// Mongo-style document: `{"businessUnit": "BU1"}` or
    /// `{"businessUnit": {"$in": ["BU1", "BU2"]}}`
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        for (field, constraint) in &self.clauses {
            let value = match constraint {
                FieldConstraint::Eq(id) => json!(id),
                FieldConstraint::In(ids) => json!({ "$in": ids }),
            };
            doc.insert(field.document_key().to_string(), value);
        }
        Value::Object(doc)
    }

    /// SQL condition over the configured column names
    pub fn to_condition(&self) -> Condition {
        let mut condition = Condition::all();
        for (field, constraint) in &self.clauses {
            let column = self
                .columns
                .get(field)
                .cloned()
                .unwrap_or_else(|| field.column_name().to_string());
            condition = match constraint {
                FieldConstraint::Eq(id) => condition.add(Expr::col(Alias::new(column)).eq(id.as_str())),
                // `IN ()` is not portable; an empty set is a contradiction
                FieldConstraint::In(ids) if ids.is_empty() => condition.add(Expr::val(1).eq(0)),
                FieldConstraint::In(ids) => condition.add(
                    Expr::col(Alias::new(column)).is_in(ids.iter().map(String::as_str)),
                ),
            };
        }
        condition
    }

    /// Check an in-memory record. A missing context field never matches.
    pub fn matches(&self, record: &Value) -> bool {
        if self.unrestricted {
            return true;
        }
        self.clauses.iter().all(|(field, constraint)| {
            record
                .get(field.document_key())
                .and_then(as_key)
                .is_some_and(|value| constraint.allows(&value))
        })
    }

    /// Merge into a caller-supplied filter document; mandatory clauses win
    pub fn inject(&self, caller: Value) -> Value {
        let mut merged = match caller {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Value::Object(mandatory) = self.to_document() {
            merged.extend(mandatory);
        }
        Value::Object(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Query, SqliteQueryBuilder};

    fn filter(field: ContextField, ids: &[&str]) -> QueryFilter {
        let mut filter = QueryFilter::restricted();
        filter.constrain(
            field,
            field.column_name().to_string(),
            FieldConstraint::from_ids(ids.iter().map(|s| s.to_string()).collect()),
        );
        filter
    }

    #[test]
    fn test_single_membership_document() {
        let filter = filter(ContextField::BusinessUnit, &["BU1"]);
        assert_eq!(filter.to_document(), json!({"businessUnit": "BU1"}));
    }

    #[test]
    fn test_multiple_memberships_document() {
        let filter = filter(ContextField::BusinessUnit, &["BU1", "BU2"]);
        assert_eq!(
            filter.to_document(),
            json!({"businessUnit": {"$in": ["BU1", "BU2"]}})
        );
    }

    #[test]
    fn test_empty_membership_matches_nothing() {
        let filter = filter(ContextField::Outlet, &[]);
        assert!(!filter.matches(&json!({"outlet": "O1"})));
        assert_eq!(filter.to_document(), json!({"outlet": {"$in": []}}));
    }

    #[test]
    fn test_matches_records() {
        let filter = filter(ContextField::BusinessUnit, &["BU1", "BU2"]);
        assert!(filter.matches(&json!({"businessUnit": "BU2"})));
        assert!(filter.matches(&json!({"businessUnit": {"id": "BU1", "name": "Jakarta"}})));
        assert!(!filter.matches(&json!({"businessUnit": "BU3"})));
        assert!(!filter.matches(&json!({"name": "no context"})));
        assert!(QueryFilter::unrestricted().matches(&json!({})));
    }

    #[test]
    fn test_inject_overrides_caller() {
        let filter = filter(ContextField::BusinessUnit, &["BU1"]);
        let merged = filter.inject(json!({"status": "active", "businessUnit": "BU9"}));
        assert_eq!(merged, json!({"status": "active", "businessUnit": "BU1"}));
    }

    #[test]
    fn test_to_condition_sql() {
        let filter = filter(ContextField::BusinessUnit, &["BU1", "BU2"]);
        let sql = Query::select()
            .column(Alias::new("id"))
            .from(Alias::new("product"))
            .cond_where(filter.to_condition())
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains(r#""business_unit" IN ('BU1', 'BU2')"#), "{}", sql);

        let unrestricted = Query::select()
            .column(Alias::new("id"))
            .from(Alias::new("product"))
            .cond_where(QueryFilter::unrestricted().to_condition())
            .to_string(SqliteQueryBuilder);
        assert!(!unrestricted.contains("WHERE"));
    }
}
