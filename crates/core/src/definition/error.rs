//! Report definition errors.

use thiserror::Error;

/// Rejected change to a [`super::ReportDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The field is already part of the definition.
    #[error("Field already present: {0}")]
    DuplicateField(String),

    /// The field is not in the object's catalog, or not selected.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A metadata filter key contains disallowed characters.
    #[error("Invalid metadata key '{key}': only letters, digits, '_' and '-' are allowed (max 40)")]
    MalformedFilterValue {
        /// The offending key.
        key: String,
    },

    /// Grouping by an aggregated column.
    #[error("Cannot group by aggregated field: {0}")]
    AggregateGroupField(String),
}
