//! Error types for FleetDB core.

use crate::types::DriverId;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in FleetDB core operations.
///
/// Variants fall into two classes: validation failures, raised before
/// any index is touched, and not-found conditions for unknown or
/// tombstoned ids. Queries that match nothing are never errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// An active driver already uses this id.
    #[error("duplicate driver id: {id}")]
    DuplicateId {
        /// The conflicting id.
        id: DriverId,
    },

    /// The id belonged to a deleted driver and may not be reused.
    #[error("driver id {id} is retired and cannot be reused")]
    IdRetired {
        /// The retired id.
        id: DriverId,
    },

    /// A record field failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// No active driver has this id.
    #[error("driver not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: DriverId,
    },

    /// Registry configuration is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates a field validation error.
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(id: DriverId) -> Self {
        Self::NotFound { id }
    }

    /// Returns true for failures raised while validating a mutation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateId { .. }
                | Self::IdRetired { .. }
                | Self::InvalidField { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Returns true if the error reports an unknown or deleted id.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
