//! User and revenue churn by month.

use async_trait::async_trait;
use tally_shared::TenantContext;

use super::error::ReportError;
use super::report::{Report, new_document};
use super::source::ReportDataSource;
use super::subscription;
use super::types::{ReportKind, ReportParameters};
use crate::document::{Cell, Group, ReportDocument, Section, TableGroup, money_or_blank};
use crate::metrics::ratios::as_percent;

/// Lost customers, user churn, lost MRR and revenue churn per month.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriptionChurnReport;

#[async_trait]
impl Report for SubscriptionChurnReport {
    fn kind(&self) -> ReportKind {
        ReportKind::SubscriptionChurn
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
            "Starting Customers",
            "Customers Lost",
            "User Churn",
            "Lost MRR",
            "Revenue Churn",
        ]);
        for month in data.bridge.newest_first() {
            table.push_row(vec![
                Cell::from(month.label.as_str()),
                Cell::Integer(month.previous_customers),
                Cell::Integer(month.net_lost_customers()),
                Cell::Percent(as_percent(month.user_churn())),
                money_or_blank(month.lost),
                Cell::Percent(as_percent(month.revenue_churn())),
            ])?;
        }

        Ok(new_document(self.kind(), ctx, data.currency, data.range)
            .with_section(Section::new("Churn").with_group(Group::Table(table))))
    }
}
