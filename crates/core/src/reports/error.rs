//! Report error types.

use chrono::NaiveDate;
use tally_shared::{AppError, MoneyError};
use thiserror::Error;

use crate::definition::DefinitionError;
use crate::document::DocumentError;
use crate::period::PeriodError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Money arithmetic failed (currency mismatch or overflow).
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Start date is after end date.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// A metadata filter key contains disallowed characters.
    #[error("Invalid metadata filter key: {key}")]
    MalformedFilterValue {
        /// The offending key.
        key: String,
    },

    /// Invalid report definition.
    #[error("Invalid report definition: {0}")]
    Definition(DefinitionError),

    /// Period generation failed.
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// Malformed document content.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Report kind not recognised.
    #[error("Unknown report: {0}")]
    UnknownReport(String),

    /// A parameter has an unusable value.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The data source failed.
    #[error("Data source error: {0}")]
    DataSource(String),
}

impl From<DefinitionError> for ReportError {
    fn from(err: DefinitionError) -> Self {
        match err {
            DefinitionError::MalformedFilterValue { key } => Self::MalformedFilterValue { key },
            other => Self::Definition(other),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Money(money) => money.into(),
            ReportError::MalformedFilterValue { .. }
            | ReportError::InvalidDateRange { .. }
            | ReportError::InvalidParameter { .. } => Self::Validation(err.to_string()),
            ReportError::UnknownReport(_) => Self::NotFound(err.to_string()),
            ReportError::DataSource(_) => Self::Database(err.to_string()),
            ReportError::Definition(_) | ReportError::Period(_) | ReportError::Document(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}
