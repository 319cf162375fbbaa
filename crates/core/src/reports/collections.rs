//! Days sales outstanding and collections efficiency.

use async_trait::async_trait;
use tally_shared::TenantContext;

use super::error::ReportError;
use super::report::{Report, new_document};
use super::source::ReportDataSource;
use super::types::{DefaultRange, ReportKind, ReportParameters};
use crate::document::{Cell, Group, KeyValueGroup, ReportDocument, Section};
use crate::metrics::{collections_efficiency, days_sales_outstanding};

/// Outstanding balance at the end of the range against what was invoiced in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionsEfficiencyReport;

#[async_trait]
impl Report for CollectionsEfficiencyReport {
    fn kind(&self) -> ReportKind {
        ReportKind::CollectionsEfficiency
    }

    async fn generate(
        &self,
        ctx: &TenantContext,
        params: &ReportParameters,
        source: &dyn ReportDataSource,
    ) -> Result<ReportDocument, ReportError> {
        let range = params.date_range(DefaultRange::LastYear, ctx.today());
        let scope = params.scope(ctx, range)?;

        let outstanding = source.ar_balance(&scope, range.end).await?;
        let activity = source.ar_activity(&scope).await?;

        let dso = days_sales_outstanding(
            outstanding.to_decimal(),
            activity.invoiced.to_decimal(),
            range.days(),
        );
        let efficiency = collections_efficiency(
            outstanding.to_decimal(),
            activity.invoiced.to_decimal(),
        );

        let metrics = KeyValueGroup::new()
            .with("Days in Period", range.days())
            .with("Total Invoiced", activity.invoiced)
            .with("Payments Received", activity.paid)
            .with("Outstanding Balance", outstanding)
            .with("Days Sales Outstanding", Cell::Decimal(dso))
            .with("Collections Efficiency", Cell::Percent(efficiency));

        Ok(new_document(self.kind(), ctx, scope.currency, range)
            .with_section(Section::new("Collections").with_group(Group::KeyValue(metrics))))
    }
}
