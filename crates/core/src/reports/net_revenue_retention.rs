//! Net revenue retention by month.

use async_trait::async_trait;
use tally_shared::TenantContext;

use super::error::ReportError;
use super::report::{Report, new_document};
use super::source::ReportDataSource;
use super::subscription;
use super::types::{ReportKind, ReportParameters};
use crate::document::{
    Cell, ChartGroup, ChartType, Group, ReportDocument, Section, TableGroup, money_or_blank,
};

/// Previous MRR, each retention movement and NRR per month.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetRevenueRetentionReport;

#[async_trait]
impl Report for NetRevenueRetentionReport {
    fn kind(&self) -> ReportKind {
        ReportKind::NetRevenueRetention
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
            "Previous MRR",
            "Expansion",
            "Reactivation",
            "Contraction",
            "Lost",
            "NRR",
        ]);
        for month in data.bridge.newest_first() {
            table.push_row(vec![
                Cell::from(month.label.as_str()),
                Cell::Money(month.previous_mrr),
                money_or_blank(month.expansion),
                money_or_blank(month.reactivation),
                money_or_blank(month.contraction),
                money_or_blank(month.lost),
                Cell::Percent(month.net_revenue_retention()),
            ])?;
        }

        let months = data.bridge.months();
        let mut chart = ChartGroup::new(
            ChartType::Line,
            months.iter().map(|m| m.label.clone()).collect(),
        );
        chart.push_series(
            "NRR %",
            months.iter().map(|m| m.net_revenue_retention()).collect(),
        )?;

        Ok(new_document(self.kind(), ctx, data.currency, data.range).with_section(
            Section::new("Net Revenue Retention")
                .with_group(Group::Chart(chart))
                .with_group(Group::Table(table)),
        ))
    }
}
