//! Catalog error types for status admin operations.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during catalog admin operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Status definition not found.
    #[error("Status definition {0} not found")]
    NotFound(Uuid),

    /// A definition with the same machine key already exists.
    #[error("A status with value '{0}' already exists")]
    DuplicateValue(String),

    /// Another definition already occupies the requested position.
    #[error("A status with sort order {0} already exists")]
    DuplicateSortOrder(i32),

    /// An end-state definition was given without a subtype.
    #[error("End-state statuses must specify an end state type")]
    MissingEndStateType,

    /// An end-state subtype that is not done/cancelled/pending.
    #[error("Invalid end state type: {0}")]
    InvalidEndStateType(String),

    /// The status is still referenced by orders and cannot be deleted.
    #[error("Status '{value}' is in use by {count} order(s)")]
    StatusInUse {
        /// The machine key of the status.
        value: String,
        /// How many orders currently hold the status.
        count: u64,
    },

    /// The default status cannot be deleted.
    #[error("The default status cannot be deleted")]
    CannotDeleteDefault,

    /// A reorder sequence that is not a permutation of the catalog.
    #[error("Reorder sequence has {given} id(s) but the catalog has {expected}")]
    IncompleteReorder {
        /// Number of definitions in the catalog.
        expected: usize,
        /// Number of ids supplied.
        given: usize,
    },

    /// The same id appears twice in a reorder sequence.
    #[error("Status definition {0} appears more than once in the reorder sequence")]
    DuplicateReorderId(Uuid),
}

impl CatalogError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::DuplicateValue(_) | Self::DuplicateSortOrder(_) => 409,
            Self::MissingEndStateType
            | Self::InvalidEndStateType(_)
            | Self::IncompleteReorder { .. }
            | Self::DuplicateReorderId(_) => 400,
            Self::StatusInUse { .. } | Self::CannotDeleteDefault => 422,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "STATUS_NOT_FOUND",
            Self::DuplicateValue(_) => "DUPLICATE_VALUE",
            Self::DuplicateSortOrder(_) => "DUPLICATE_SORT_ORDER",
            Self::MissingEndStateType => "MISSING_END_STATE_TYPE",
            Self::InvalidEndStateType(_) => "INVALID_END_STATE_TYPE",
            Self::StatusInUse { .. } => "STATUS_IN_USE",
            Self::CannotDeleteDefault => "CANNOT_DELETE_DEFAULT",
            Self::IncompleteReorder { .. } => "INCOMPLETE_REORDER",
            Self::DuplicateReorderId(_) => "DUPLICATE_REORDER_ID",
        }
    }
}
