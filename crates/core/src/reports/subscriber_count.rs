//! Running subscriber count by month.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tally_shared::TenantContext;

use super::error::ReportError;
use super::report::{Report, new_document};
use super::source::ReportDataSource;
use super::subscription;
use super::types::{ReportKind, ReportParameters};
use crate::document::{Cell, ChartGroup, ChartType, Group, ReportDocument, Section, TableGroup};

/// New, reactivated and lost subscribers with the cumulative total.
///
/// Totals run oldest to newest; the table is shown newest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriberCountReport;

#[async_trait]
impl Report for SubscriberCountReport {
    fn kind(&self) -> ReportKind {
        ReportKind::SubscriberCount
    }

    async fn generate(
        &self,
        ctx: &TenantContext,
        params: &ReportParameters,
        source: &dyn ReportDataSource,
    ) -> Result<ReportDocument, ReportError> {
        let data = subscription::load(ctx, params, source).await?;

        let mut table = TableGroup::new(&[
            "Month",
            "New",
            "Reactivated",
            "Lost",
            "Net Change",
            "Subscribers",
        ]);
        for month in data.bridge.newest_first() {
            table.push_row(vec![
                Cell::from(month.label.as_str()),
                Cell::Integer(month.new_customers),
                Cell::Integer(month.reactivated_customers),
                Cell::Integer(month.lost_customers),
                Cell::Integer(month.net_change()),
                Cell::Integer(month.customers),
            ])?;
        }

        let months = data.bridge.months();
        let mut chart = ChartGroup::new(
            ChartType::Bar,
            months.iter().map(|m| m.label.clone()).collect(),
        );
        chart.push_series(
            "Subscribers",
            months.iter().map(|m| Decimal::from(m.customers)).collect(),
        )?;

        Ok(new_document(self.kind(), ctx, data.currency, data.range).with_section(
            Section::new("Subscribers")
                .with_group(Group::Chart(chart))
                .with_group(Group::Table(table)),
        ))
    }
}
