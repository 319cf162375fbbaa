//! The capability every report implements, plus helpers shared by reports.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tally_shared::{Currency, Money, TenantContext};

use super::error::ReportError;
use super::source::ReportDataSource;
use super::types::{DateRange, ReportKind, ReportParameters};
use crate::document::{Cell, ReportDocument};

/// A report that can be generated for one tenant.
#[async_trait]
pub trait Report: Send + Sync {
    /// Kind of report.
    fn kind(&self) -> ReportKind;

    /// Fetches, classifies, aggregates and assembles the report.
    ///
    /// Parameter validation happens before the first fetch.
    async fn generate(
        &self,
        ctx: &TenantContext,
        params: &ReportParameters,
        source: &dyn ReportDataSource,
    ) -> Result<ReportDocument, ReportError>;
}

/// Empty document for `kind` carrying the resolved parameters.
pub(crate) fn new_document(
    kind: ReportKind,
    ctx: &TenantContext,
    currency: Currency,
    range: DateRange,
) -> ReportDocument {
    ReportDocument::new(
        kind.title(),
        &format!("{}-{}", kind.as_str().replace('_', "-"), range.end),
    )
    .with_parameter("currency", currency)
    .with_parameter("start", ctx.format_date(range.start))
    .with_parameter("end", ctx.format_date(range.end))
}

/// Money cell from an amount in major units.
pub(crate) fn money_cell(currency: Currency, amount: Decimal) -> Result<Cell, ReportError> {
    Ok(Cell::Money(Money::from_amount(currency, amount)?))
}
