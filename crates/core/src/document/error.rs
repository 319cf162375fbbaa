//! Document error types.

use thiserror::Error;

/// Malformed document input. These are configuration errors in a report,
/// reported to the caller rather than panicking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A table row does not match the header width.
    #[error("Table row has {got} columns, header has {expected}")]
    ColumnCountMismatch {
        /// Header width.
        expected: usize,
        /// Row width.
        got: usize,
    },

    /// A chart series does not match the number of labels.
    #[error("Chart series '{series}' has {got} points, expected {expected}")]
    SeriesLengthMismatch {
        /// Series name.
        series: String,
        /// Number of labels.
        expected: usize,
        /// Number of points.
        got: usize,
    },
}
