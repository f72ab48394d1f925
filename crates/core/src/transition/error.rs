//! Transition error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while requesting or completing a status transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The target status value names no definition in the catalog.
    #[error("unknown status: {0}")]
    UnknownStatus(String),

    /// A cancellation was submitted without a reason.
    #[error("cancellation requires a reason")]
    MissingCancellationReason,

    /// A pending transition was submitted without a resume date.
    #[error("pending requires an expected resume date")]
    MissingResumeDate,

    /// The expected resume date is in the past.
    #[error("expected resume date {date} is in the past")]
    InvalidResumeDate {
        /// The rejected date.
        date: NaiveDate,
    },

    /// The submitted input answers a different request than the target
    /// status calls for.
    #[error("input does not match the requested transition")]
    InputMismatch,

    /// The accepted resolution no longer matches the order's payment
    /// state; the transition must be requested again.
    #[error("resolution is stale; request the transition again")]
    StaleResolution,
}

impl TransitionError {
    /// Maps the error to an HTTP status code.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownStatus(_) => 404,
            Self::MissingCancellationReason | Self::MissingResumeDate | Self::InputMismatch => 400,
            Self::InvalidResumeDate { .. } => 422,
            Self::StaleResolution => 409,
        }
    }

    /// Returns a stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownStatus(_) => "UNKNOWN_STATUS",
            Self::MissingCancellationReason => "MISSING_CANCELLATION_REASON",
            Self::MissingResumeDate => "MISSING_RESUME_DATE",
            Self::InvalidResumeDate { .. } => "INVALID_RESUME_DATE",
            Self::InputMismatch => "INPUT_MISMATCH",
            Self::StaleResolution => "STALE_RESOLUTION",
        }
    }
}
