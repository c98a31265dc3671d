//! Actor to context bindings
//!
//! Shape rules are enforced when an assignment is created or updated:
//!
//! | scope    | company | business unit | outlet |
//! |----------|---------|---------------|--------|
//! | GLOBAL   | -       | -             | -      |
//! | COMPANY  | yes     | -             | -      |
//! | BUSINESS | yes     | yes           | -      |
//! | OUTLET   | yes     | yes           | yes    |

use crate::auth::ContextRef;
use crate::utils::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentScope {
    Global,
    Company,
    Business,
    Outlet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[default]
    Active,
    Suspended,
    Revoked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeAssignment {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub user: String,
    pub role: String,
    pub scope: AssignmentScope,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub business_unit: Option<String>,
    #[serde(default)]
    pub outlet: Option<String>,
    #[serde(default)]
    pub restricted_modules: Vec<String>,
    #[serde(default)]
    pub status: AssignmentStatus,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ScopeAssignment {
    pub fn new(user: impl Into<String>, role: impl Into<String>, scope: AssignmentScope) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: user.into(),
            role: role.into(),
            scope,
            company: None,
            business_unit: None,
            outlet: None,
            restricted_modules: Vec::new(),
            status: AssignmentStatus::Active,
            is_primary: false,
            expires_at: None,
        }
    }

    pub fn company(mut self, id: impl Into<String>) -> Self {
        self.company = Some(id.into());
        self
    }

    pub fn business_unit(mut self, id: impl Into<String>) -> Self {
        self.business_unit = Some(id.into());
        self
    }

    pub fn outlet(mut self, id: impl Into<String>) -> Self {
        self.outlet = Some(id.into());
        self
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Check the scope/field shape
    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() || self.role.trim().is_empty() {
            return Err(CoreError::validation("assignment requires user and role"));
        }

        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        let (company, business_unit, outlet) = (
            present(&self.company),
            present(&self.business_unit),
            present(&self.outlet),
        );

        let expected = match self.scope {
            AssignmentScope::Global => (false, false, false),
            AssignmentScope::Company => (true, false, false),
            AssignmentScope::Business => (true, true, false),
            AssignmentScope::Outlet => (true, true, true),
        };

        if (company, business_unit, outlet) != expected {
            return Err(CoreError::validation(format!(
                "{:?} assignment requires company={}, businessUnit={}, outlet={}",
                self.scope, expected.0, expected.1, expected.2
            )));
        }
        Ok(())
    }

    pub fn is_effective(&self, now: DateTime<Utc>) -> bool {
        self.status == AssignmentStatus::Active && self.expires_at.is_none_or(|at| at > now)
    }

    fn tuple(&self) -> (&str, &str, Option<&str>, Option<&str>, Option<&str>) {
        (
            &self.user,
            &self.role,
            self.company.as_deref(),
            self.business_unit.as_deref(),
            self.outlet.as_deref(),
        )
    }
}

/// Memberships an actor derives from its effective assignments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Memberships {
    pub companies: Vec<ContextRef>,
    pub business_units: Vec<ContextRef>,
    pub outlets: Vec<ContextRef>,
    pub roles: Vec<String>,
    pub restricted_modules: Vec<String>,
    /// At least one GLOBAL assignment is effective
    pub global: bool,
}

impl Memberships {
    fn add(list: &mut Vec<ContextRef>, id: &Option<String>) {
        if let Some(id) = id {
            if !list.iter().any(|m| &m.id == id) {
                list.push(ContextRef::new(id.clone()));
            }
        }
    }

    /// Copy the membership lists onto an actor
    pub fn apply_to(&self, actor: &mut crate::auth::Actor) {
        actor.companies = self.companies.clone();
        actor.business_units = self.business_units.clone();
        actor.outlets = self.outlets.clone();
    }
}

#[derive(Debug, Default)]
pub struct AssignmentRegistry {
    assignments: RwLock<Vec<ScopeAssignment>>,
}

impl AssignmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(existing: &[ScopeAssignment], candidate: &ScopeAssignment) -> Result<()> {
        let duplicate = existing.iter().any(|a| {
            a.id != candidate.id
                && a.status != AssignmentStatus::Revoked
                && a.tuple() == candidate.tuple()
        });
        if duplicate {
            return Err(CoreError::Conflict(format!(
                "user {} already holds role {} in this context",
                candidate.user, candidate.role
            )));
        }
        Ok(())
    }

    fn demote_other_primaries(existing: &mut [ScopeAssignment], keep: &ScopeAssignment) {
        if keep.is_primary {
            for other in existing
                .iter_mut()
                .filter(|a| a.user == keep.user && a.id != keep.id)
            {
                other.is_primary = false;
            }
        }
    }

    pub fn create(&self, assignment: ScopeAssignment) -> Result<Uuid> {
        assignment.validate()?;

        let mut assignments = self.assignments.write();
        Self::check_unique(&assignments, &assignment)?;
        Self::demote_other_primaries(&mut assignments, &assignment);

        let id = assignment.id;
        info!(
            "Assigned role {} to user {} at {:?} scope",
            assignment.role, assignment.user, assignment.scope
        );
        assignments.push(assignment);
        Ok(id)
    }

    pub fn update(&self, assignment: ScopeAssignment) -> Result<()> {
        assignment.validate()?;

        let mut assignments = self.assignments.write();
        let index = assignments
            .iter()
            .position(|a| a.id == assignment.id)
            .ok_or_else(|| CoreError::not_found(format!("assignment {}", assignment.id)))?;

        Self::check_unique(&assignments, &assignment)?;
        Self::demote_other_primaries(&mut assignments, &assignment);
        assignments[index] = assignment;
        Ok(())
    }

    pub fn revoke(&self, id: Uuid) -> Result<()> {
        let mut assignments = self.assignments.write();
        let assignment = assignments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| CoreError::not_found(format!("assignment {}", id)))?;
        assignment.status = AssignmentStatus::Revoked;
        assignment.is_primary = false;
        info!("Revoked assignment {} for user {}", id, assignment.user);
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<ScopeAssignment> {
        self.assignments.read().iter().find(|a| a.id == id).cloned()
    }

    /// Assignments in force for `user` at `now`
    pub fn effective_for(&self, user: &str, now: DateTime<Utc>) -> Vec<ScopeAssignment> {
        self.assignments
            .read()
            .iter()
            .filter(|a| a.user == user && a.is_effective(now))
            .cloned()
            .collect()
    }

    pub fn primary_for(&self, user: &str, now: DateTime<Utc>) -> Option<ScopeAssignment> {
        self.effective_for(user, now).into_iter().find(|a| a.is_primary)
    }

    pub fn memberships(&self, user: &str, now: DateTime<Utc>) -> Memberships {
        let mut memberships = Memberships::default();
        for assignment in self.effective_for(user, now) {
            if !memberships.roles.contains(&assignment.role) {
                memberships.roles.push(assignment.role.clone());
            }
            for module in &assignment.restricted_modules {
                if !memberships.restricted_modules.contains(module) {
                    memberships.restricted_modules.push(module.clone());
                }
            }
            if assignment.scope == AssignmentScope::Global {
                memberships.global = true;
            }
            Memberships::add(&mut memberships.companies, &assignment.company);
            Memberships::add(&mut memberships.business_units, &assignment.business_unit);
            Memberships::add(&mut memberships.outlets, &assignment.outlet);
        }
        memberships
    }
}
