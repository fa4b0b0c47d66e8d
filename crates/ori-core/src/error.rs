//! # AppError
//!
//! Centralized error handling for Oriana.
//! Maps domain-specific failures to actionable error types.

use std::collections::BTreeMap;

use thiserror::Error;

/// Field name → human readable reason.
pub type FieldErrors = BTreeMap<String, String>;

/// The primary error type for all ori-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// Creation (or an update clearing `title`) without a required field.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingRequiredField(Vec<String>),

    /// `mediaType` outside the closed set.
    #[error("invalid mediaType: {0}")]
    InvalidMediaType(String),

    /// One or more fields carry a value of the wrong type or outside its domain.
    #[error("validation error: {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
    InvalidFieldValue(FieldErrors),

    /// Resource not found (e.g., MediaItem, UserProfile)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Caller is authenticated but does not own the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Missing or rejected bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure failure (e.g., DB down, identity provider unreachable)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a single-field `InvalidFieldValue`.
    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), reason.into());
        AppError::InvalidFieldValue(errors)
    }

    /// Per-field detail, when the error carries any.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            AppError::InvalidFieldValue(errors) => Some(errors.clone()),
            AppError::MissingRequiredField(fields) => Some(
                fields
                    .iter()
                    .map(|f| (f.clone(), "is required".to_string()))
                    .collect(),
            ),
            AppError::InvalidMediaType(value) => {
                let mut errors = FieldErrors::new();
                errors.insert("mediaType".into(), format!("unknown media type '{value}'"));
                Some(errors)
            }
            _ => None,
        }
    }
}

/// A specialized Result type for Oriana logic.
pub type Result<T> = std::result::Result<T, AppError>;
