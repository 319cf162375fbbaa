//! Customer lifetime value by month.

use async_trait::async_trait;
use tally_shared::TenantContext;

use super::error::ReportError;
use super::report::{Report, money_cell, new_document};
use super::source::ReportDataSource;
use super::subscription;
use super::types::{ReportKind, ReportParameters};
use crate::document::{Cell, Group, KeyValueGroup, ReportDocument, Section, TableGroup};
use crate::metrics::ratios::as_percent;

/// MRR, customers, user churn, ARPU and LTV per month, newest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifetimeValueReport;

#[async_trait]
impl Report for LifetimeValueReport {
    fn kind(&self) -> ReportKind {
        ReportKind::LifetimeValue
    }

    async fn generate(
        &self,
        ctx: &TenantContext,
        params: &ReportParameters,
        source: &dyn ReportDataSource,
    ) -> Result<ReportDocument, ReportError> {
        let data = subscription::load(ctx, params, source).await?;
        let currency = data.currency;

        let mut table =
            TableGroup::new(&["Month", "MRR", "Customers", "User Churn", "ARPU", "LTV"]);
        for month in data.bridge.newest_first() {
            table.push_row(vec![
                Cell::from(month.label.as_str()),
                Cell::Money(month.mrr),
                Cell::Integer(month.customers),
                Cell::Percent(as_percent(month.user_churn())),
                money_cell(currency, month.arpu())?,
                money_cell(currency, month.lifetime_value())?,
            ])?;
        }

        let mut doc = new_document(self.kind(), ctx, currency, data.range);
        if let Some(latest) = data.bridge.months().last() {
            doc = doc.with_section(Section::new("Summary").with_group(Group::KeyValue(
                KeyValueGroup::new()
                    .with("Current MRR", latest.mrr)
                    .with("Active Customers", latest.customers)
                    .with("ARPU", money_cell(currency, latest.arpu())?)
                    .with("Lifetime Value", money_cell(currency, latest.lifetime_value())?),
            )));
        }

        Ok(doc.with_section(Section::new("Monthly Lifetime Value").with_group(Group::Table(table))))
    }
}
