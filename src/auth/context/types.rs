//! Context field and target types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A level of the company → business unit → outlet boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextField {
    Company,
    BusinessUnit,
    Outlet,
}

impl ContextField {
    pub const ALL: [ContextField; 3] = [
        ContextField::Company,
        ContextField::BusinessUnit,
        ContextField::Outlet,
    ];

    /// Field name in documents and payloads
    pub fn document_key(&self) -> &'static str {
        match self {
            ContextField::Company => "company",
            ContextField::BusinessUnit => "businessUnit",
            ContextField::Outlet => "outlet",
        }
    }

    /// Default column name in relational tables
    pub fn column_name(&self) -> &'static str {
        match self {
            ContextField::Company => "company",
            ContextField::BusinessUnit => "business_unit",
            ContextField::Outlet => "outlet",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContextField::Company => "Company",
            ContextField::BusinessUnit => "Business Unit",
            ContextField::Outlet => "Outlet",
        }
    }

    /// Header naming an explicit target at this level
    pub fn header_name(&self) -> &'static str {
        match self {
            ContextField::Company => "x-company-id",
            ContextField::BusinessUnit => "x-business-unit-id",
            ContextField::Outlet => "x-outlet-id",
        }
    }
}

impl fmt::Display for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.document_key())
    }
}

/// Context the caller explicitly named (path parameter, header or query)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetContext {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub business_unit: Option<String>,
    #[serde(default)]
    pub outlet: Option<String>,
}

impl TargetContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn business_unit(id: impl Into<String>) -> Self {
        Self {
            business_unit: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn outlet(id: impl Into<String>) -> Self {
        Self {
            outlet: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn company(id: impl Into<String>) -> Self {
        Self {
            company: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn get(&self, field: ContextField) -> Option<&str> {
        let value = match field {
            ContextField::Company => &self.company,
            ContextField::BusinessUnit => &self.business_unit,
            ContextField::Outlet => &self.outlet,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        ContextField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Read `x-company-id`, `x-business-unit-id` and `x-outlet-id`
    /// (case-insensitive header names)
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut target = Self::default();
        for (name, value) in headers {
            let name = name.to_ascii_lowercase();
            let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            for field in ContextField::ALL {
                if name == field.header_name() {
                    match field {
                        ContextField::Company => target.company = value.clone(),
                        ContextField::BusinessUnit => target.business_unit = value.clone(),
                        ContextField::Outlet => target.outlet = value.clone(),
                    }
                }
            }
        }
        target
    }
}
