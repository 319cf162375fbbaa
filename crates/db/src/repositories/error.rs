//! Repository error types.

use sea_orm::DbErr;
use tally_core::ReportError;
use tally_shared::AppError;
use tally_shared::types::{TaxRateId, TenantId};
use thiserror::Error;

/// Errors raised while reading report data.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No company row for the tenant.
    #[error("Tenant not found: {0}")]
    TenantNotFound(TenantId),

    /// No tax rate row for the id.
    #[error("Tax rate not found: {0}")]
    TaxRateNotFound(TaxRateId),

    /// A stored value could not be interpreted.
    #[error("Invalid data in {column}: {reason}")]
    InvalidData {
        /// Column holding the value.
        column: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    pub(crate) fn invalid(column: &'static str, reason: impl ToString) -> Self {
        Self::InvalidData {
            column,
            reason: reason.to_string(),
        }
    }
}

impl From<RepositoryError> for ReportError {
    fn from(err: RepositoryError) -> Self {
        Self::DataSource(err.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::TenantNotFound(_) | RepositoryError::TaxRateNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            RepositoryError::InvalidData { .. } => Self::Internal(err.to_string()),
            RepositoryError::Database(_) => Self::Database(err.to_string()),
        }
    }
}
