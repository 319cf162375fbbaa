//! Monthly MRR bridge.

use async_trait::async_trait;
use tally_shared::{Money, TenantContext};

use super::error::ReportError;
use super::report::{Report, new_document};
use super::source::ReportDataSource;
use super::subscription;
use super::types::{ReportKind, ReportParameters};
use crate::document::{
    Cell, ChartGroup, ChartType, Group, ReportDocument, Section, TableGroup, money_or_blank,
};

/// Starting MRR, each movement and ending MRR per month.
#[derive(Debug, Clone, Copy, Default)]
pub struct MrrMovementsReport;

#[async_trait]
impl Report for MrrMovementsReport {
    fn kind(&self) -> ReportKind {
        ReportKind::MrrMovements
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
            "Starting MRR",
            "New",
            "Expansion",
            "Reactivation",
            "Contraction",
            "Lost",
            "Ending MRR",
        ]);
        let mut totals = [Money::zero(data.currency); 5];
        for month in data.bridge.months() {
            let movements = [
                month.new,
                month.expansion,
                month.reactivation,
                month.contraction,
                month.lost,
            ];
            for (total, amount) in totals.iter_mut().zip(&movements) {
                *total = total.add(amount)?;
            }
        }

        for month in data.bridge.newest_first() {
            table.push_row(vec![
                Cell::from(month.label.as_str()),
                Cell::Money(month.previous_mrr),
                money_or_blank(month.new),
                money_or_blank(month.expansion),
                money_or_blank(month.reactivation),
                money_or_blank(month.contraction),
                money_or_blank(month.lost),
                Cell::Money(month.mrr),
            ])?;
        }

        let months = data.bridge.months();
        if let (Some(first), Some(last)) = (months.first(), months.last()) {
            let mut footer = vec![Cell::from("Total"), Cell::Money(first.previous_mrr)];
            footer.extend(totals.into_iter().map(Cell::Money));
            footer.push(Cell::Money(last.mrr));
            table.set_footer(footer)?;
        }

        let mut chart = ChartGroup::new(
            ChartType::Line,
            months.iter().map(|m| m.label.clone()).collect(),
        );
        chart.push_series("MRR", months.iter().map(|m| m.mrr.to_decimal()).collect())?;

        Ok(new_document(self.kind(), ctx, data.currency, data.range).with_section(
            Section::new("MRR Movements")
                .with_group(Group::Chart(chart))
                .with_group(Group::Table(table)),
        ))
    }
}
