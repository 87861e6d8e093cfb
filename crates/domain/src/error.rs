//! Error taxonomy for group operations.

use thiserror::Error;

/// Failures reported by a group store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The store could not be reached or the query failed.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by the membership lifecycle and content services.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GroupError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Expired(String),

    #[error(transparent)]
    Store(StoreError),
}

impl GroupError {
    pub fn validation(msg: impl Into<String>) -> Self {
        GroupError::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        GroupError::PermissionDenied(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        GroupError::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        GroupError::NotFound(msg.into())
    }

    /// Machine readable error code used in API envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            GroupError::Validation(_) => "validation_error",
            GroupError::PermissionDenied(_) => "forbidden",
            GroupError::Conflict(_) => "conflict",
            GroupError::NotFound(_) => "not_found",
            GroupError::Expired(_) => "invitation_expired",
            GroupError::Store(_) => "internal_error",
        }
    }
}

impl From<StoreError> for GroupError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(detail) => GroupError::Conflict(detail),
            other => GroupError::Store(other),
        }
    }
}

impl From<validator::ValidationErrors> for GroupError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
            })
            .collect();
        GroupError::Validation(messages.join("; "))
    }
}
