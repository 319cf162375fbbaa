//! Period error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while building reporting periods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// The range start is after its end.
    #[error("Invalid period range: start {start} is after end {end}")]
    InvertedRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Stepping to the next calendar unit left chrono's supported range.
    #[error("Date out of supported range after {0}")]
    OutOfRange(NaiveDate),
}
