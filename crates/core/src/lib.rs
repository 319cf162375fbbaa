//! Report engine for Tally.
//!
//! This crate contains pure report logic with ZERO web or database dependencies.
//! Data arrives through the [`reports::ReportDataSource`] trait; everything
//! else (periods, classification, metrics, documents) is computed here.
//!
//! # Modules
//!
//! - `period` - Weekly and monthly period sequences
//! - `classify` - Single-pass, forward-only event classification
//! - `metrics` - Guarded ratios, the MRR bridge, aging buckets
//! - `document` - Report document model handed to renderers
//! - `definition` - Typed, validated report definitions
//! - `lookup` - Per-generation lookup cache
//! - `reports` - The report family and its service

pub mod classify;
pub mod definition;
pub mod document;
pub mod lookup;
pub mod metrics;
pub mod period;
pub mod reports;

pub use document::ReportDocument;
pub use reports::{
    Report, ReportDataSource, ReportError, ReportKind, ReportParameters, ReportService,
};
