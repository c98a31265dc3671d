//! Error handling for the access core
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for the access core
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for the access core
#[derive(Error, Debug)]
pub enum CoreError {
    /// No actor context at all
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// The evaluator or a guard returned deny
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed condition/operator pairing or cyclic role inheritance
    #[error("Invalid permission configuration: {0}")]
    InvalidPermissionConfig(String),

    /// No active tenant matched the request hints
    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    /// A dedicated tenant connection could not be established
    #[error("Connection unavailable: {0}")]
    ConnectionUnavailable(String),

    /// Write payload or fetch target outside of the actor's scope
    #[error("Context Security Error: {0}")]
    ContextViolation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Redis errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidPermissionConfig(message.into())
    }

    pub fn context_violation(message: impl Into<String>) -> Self {
        Self::ContextViolation(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP-equivalent status code for request middleware
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::Unauthenticated(_) => 401,
            CoreError::Forbidden(_)
            | CoreError::ContextViolation(_)
            | CoreError::InvalidPermissionConfig(_) => 403,
            CoreError::TenantNotFound(_) | CoreError::NotFound(_) => 404,
            CoreError::Conflict(_) => 409,
            CoreError::Validation(_) => 422,
            CoreError::ConnectionUnavailable(_) | CoreError::Timeout(_) => 503,
            CoreError::Config(_)
            | CoreError::Database(_)
            | CoreError::Redis(_)
            | CoreError::Serialization(_)
            | CoreError::Yaml(_)
            | CoreError::Io(_)
            | CoreError::Cache(_)
            | CoreError::Internal(_) => 500,
        }
    }

    /// Stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::Unauthenticated(_) => "UNAUTHENTICATED",
            CoreError::Forbidden(_) => "FORBIDDEN",
            CoreError::InvalidPermissionConfig(_) => "FORBIDDEN",
            CoreError::TenantNotFound(_) => "TENANT_NOT_FOUND",
            CoreError::ConnectionUnavailable(_) => "SERVICE_UNAVAILABLE",
            CoreError::ContextViolation(_) => "CONTEXT_VIOLATION",
            CoreError::Config(_) => "CONFIG_ERROR",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::Database(_) => "DATABASE_ERROR",
            CoreError::Redis(_) | CoreError::Cache(_) => "CACHE_ERROR",
            CoreError::Serialization(_) | CoreError::Yaml(_) => "SERIALIZATION_ERROR",
            CoreError::Io(_) => "IO_ERROR",
            CoreError::Timeout(_) => "TIMEOUT",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the end user.
    ///
    /// Permission configuration problems are reported as a plain denial and
    /// storage failures are masked; internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            CoreError::Unauthenticated(_) => "Authentication required".to_string(),
            CoreError::Forbidden(reason) => reason.clone(),
            CoreError::InvalidPermissionConfig(_) => "Access denied".to_string(),
            CoreError::ContextViolation(_) | CoreError::Validation(_) => self.to_string(),
            CoreError::TenantNotFound(_) => "Organization not found".to_string(),
            CoreError::NotFound(_) | CoreError::Conflict(_) => self.to_string(),
            CoreError::ConnectionUnavailable(_) | CoreError::Timeout(_) => {
                "Service temporarily unavailable".to_string()
            }
            CoreError::Database(_) => "Database operation failed".to_string(),
            CoreError::Redis(_) | CoreError::Cache(_) => "Cache operation failed".to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    /// Whether the request carrying this error must be denied outright
    pub fn is_fail_closed(&self) -> bool {
        matches!(
            self,
            CoreError::Unauthenticated(_)
                | CoreError::Forbidden(_)
                | CoreError::InvalidPermissionConfig(_)
                | CoreError::ContextViolation(_)
        )
    }
}
