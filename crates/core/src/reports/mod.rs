//! The report family.
//!
//! Every report follows the same pipeline: resolve parameters, fetch rows
//! from a [`ReportDataSource`], classify them into periods, derive metrics
//! and assemble a [`crate::document::ReportDocument`].
//!
//! - Subscription analytics: MRR movements, lifetime value, net revenue
//!   retention, churn, subscriber count
//! - Receivables: cash flow forecast, A/R aging, collections efficiency,
//!   reconciliation
//! - Summaries: tax, payments, invoices

pub mod ar_aging;
pub mod cash_flow;
pub mod collections;
pub mod error;
pub mod invoice_summary;
pub mod lifetime_value;
pub mod mrr_movements;
pub mod net_revenue_retention;
pub mod payment_summary;
pub mod reconciliation;
pub mod report;
pub mod service;
pub mod source;
pub mod subscriber_count;
pub mod subscription_churn;
pub mod tax_summary;
pub mod types;

mod subscription;

#[cfg(test)]
mod fake;
#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use report::Report;
pub use service::ReportService;
pub use source::{
    ArActivity, DefinitionRow, ExpectedPayment, MrrMovement, OpenInvoice, PaymentRow,
    ReportDataSource, TaxLine,
};
pub use types::*;
