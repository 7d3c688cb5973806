use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Timed out waiting for the bookings page to load")]
    ClassificationTimeout,

    #[error("Login failed at step '{step}': {reason}")]
    LoginStepFailure { step: &'static str, reason: String },

    #[error("Date {target} is more than {max_days} days after {today}")]
    DateOutOfRange {
        target: NaiveDate,
        today: NaiveDate,
        max_days: i64,
    },

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Booking submission failed at step '{step}': {reason}")]
    SubmissionFailure { step: &'static str, reason: String },

    #[error("Context cancelled")]
    ContextCancelled,

    #[error("Context deadline exceeded")]
    DeadlineExceeded,

    #[error("No probe completed within {0:?}")]
    RaceTimeout(Duration),

    #[error("Invalid date '{0}', expected format 'Feb 18, 2025'")]
    InvalidDate(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BookingError {
    /// Stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClassificationTimeout => "classification_timeout",
            Self::LoginStepFailure { .. } => "login_step_failure",
            Self::DateOutOfRange { .. } => "date_out_of_range",
            Self::LocationNotFound(_) => "location_not_found",
            Self::SubmissionFailure { .. } => "submission_failure",
            Self::ContextCancelled => "context_cancelled",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::RaceTimeout(_) => "race_timeout",
            Self::InvalidDate(_) => "invalid_date",
            Self::Browser(_) => "browser",
            Self::Api(_) => "api",
            Self::Config(_) => "config",
        }
    }

    /// True for errors produced by an expired or cancelled scope.
    pub fn is_scope_error(&self) -> bool {
        matches!(self, Self::ContextCancelled | Self::DeadlineExceeded)
    }

    /// Attribute a failure to a login step. Cancellation passes through untouched.
    pub fn at_login_step(self, step: &'static str) -> Self {
        match self {
            Self::ContextCancelled | Self::LoginStepFailure { .. } => self,
            other => Self::LoginStepFailure {
                step,
                reason: other.to_string(),
            },
        }
    }

    /// Attribute a failure to a submission step. Cancellation passes through untouched.
    pub fn at_submission_step(self, step: &'static str) -> Self {
        match self {
            Self::ContextCancelled | Self::SubmissionFailure { .. } => self,
            other => Self::SubmissionFailure {
                step,
                reason: other.to_string(),
            },
        }
    }
}

impl From<chromiumoxide::error::CdpError> for BookingError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BookingError::Browser(err.to_string())
    }
}

impl From<reqwest::Error> for BookingError {
    fn from(err: reqwest::Error) -> Self {
        BookingError::Api(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
