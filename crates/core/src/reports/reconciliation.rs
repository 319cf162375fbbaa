//! A/R roll-forward reconciled against the ledger.

use async_trait::async_trait;
use tally_shared::{Money, TenantContext};
use tracing::info;

use super::error::ReportError;
use super::report::{Report, new_document};
use super::source::ReportDataSource;
use super::types::{DefaultRange, ReportKind, ReportParameters};
use crate::document::{
    FinancialReportGroup, FinancialRow, Group, KeyValueGroup, ReportDocument, Section,
};

/// Opening A/R plus activity gives the closing A/R, which is compared to
/// the ledger's own closing balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationReport;

#[async_trait]
impl Report for ReconciliationReport {
    fn kind(&self) -> ReportKind {
        ReportKind::Reconciliation
    }

    async fn generate(
        &self,
        ctx: &TenantContext,
        params: &ReportParameters,
        source: &dyn ReportDataSource,
    ) -> Result<ReportDocument, ReportError> {
        let range = params.date_range(DefaultRange::AllTime, ctx.today());
        let scope = params.scope(ctx, range)?;
        let currency = scope.currency;

        if !source.has_ledger(ctx.id).await? {
            info!("Tenant has no A/R ledger");
            let kind = self.kind();
            return Ok(ReportDocument::no_data(kind.title(), kind.as_str()));
        }

        let opening = match range.start.pred_opt() {
            Some(day_before) => source.ar_balance(&scope, day_before).await?,
            None => Money::zero(currency),
        };
        let activity = source.ar_activity(&scope).await?;
        let net = activity.net()?;
        let closing = opening.add(&net)?;
        let ledger = source.ledger_balance(&scope, range.end).await?;
        let difference = ledger.subtract(&closing)?;

        let statement = FinancialReportGroup {
            rows: vec![
                FinancialRow::value("Opening A/R Balance", opening),
                FinancialRow::parent(
                    "Activity",
                    vec![
                        FinancialRow::value("Invoiced", activity.invoiced),
                        FinancialRow::value("Payments", activity.paid),
                        FinancialRow::value("Credit Notes", activity.credit_notes),
                        FinancialRow::value("Bad Debt", activity.bad_debt),
                        FinancialRow::value("Voided", activity.voided),
                    ],
                    net,
                ),
                FinancialRow::value("Closing A/R Balance", closing),
            ],
        };

        let status = if difference.is_zero() { "Reconciled" } else { "Out of Balance" };
        let check = KeyValueGroup::new()
            .with("Ledger Balance", ledger)
            .with("Calculated Balance", closing)
            .with("Difference", difference)
            .with("Status", status);

        Ok(new_document(self.kind(), ctx, currency, range).with_section(
            Section::new("A/R Reconciliation")
                .with_group(Group::FinancialReport(statement))
                .with_group(Group::KeyValue(check)),
        ))
    }
}
