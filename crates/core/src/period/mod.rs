//! Calendar period bucketing.
//!
//! Splits an inclusive date range into an ordered, gap-free sequence of
//! weekly or monthly [`ReportingPeriod`]s, each carrying zero-initialised
//! named accumulators that the classifier fills in a single pass.

pub mod bucketizer;
pub mod error;

pub use bucketizer::{Bucketizer, Granularity, ReportingPeriod, next_unit_start, unit_start};
pub use error::PeriodError;
