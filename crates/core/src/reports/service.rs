//! Report generation service.

use tally_shared::TenantContext;
use tally_shared::config::ReportsConfig;
use tracing::{Instrument, info, info_span, warn};

use super::ar_aging::ArAgingReport;
use super::cash_flow::CashFlowReport;
use super::collections::CollectionsEfficiencyReport;
use super::error::ReportError;
use super::invoice_summary::InvoiceSummaryReport;
use super::lifetime_value::LifetimeValueReport;
use super::mrr_movements::MrrMovementsReport;
use super::net_revenue_retention::NetRevenueRetentionReport;
use super::payment_summary::PaymentSummaryReport;
use super::reconciliation::ReconciliationReport;
use super::report::Report;
use super::source::ReportDataSource;
use super::subscriber_count::SubscriberCountReport;
use super::subscription_churn::SubscriptionChurnReport;
use super::tax_summary::TaxSummaryReport;
use super::types::{ReportKind, ReportParameters};
use crate::document::ReportDocument;

/// Dispatches report generation by kind.
#[derive(Debug, Clone, Default)]
pub struct ReportService {
    config: ReportsConfig,
}

impl ReportService {
    /// Creates a service with the given report settings.
    #[must_use]
    pub fn new(config: ReportsConfig) -> Self {
        Self { config }
    }

    /// The report implementing `kind`.
    #[must_use]
    pub fn report(&self, kind: ReportKind) -> Box<dyn Report> {
        match kind {
            ReportKind::CashFlow => Box::new(CashFlowReport::new(self.config.forecast_days)),
            ReportKind::LifetimeValue => Box::new(LifetimeValueReport),
            ReportKind::NetRevenueRetention => Box::new(NetRevenueRetentionReport),
            ReportKind::SubscriptionChurn => Box::new(SubscriptionChurnReport),
            ReportKind::SubscriberCount => Box::new(SubscriberCountReport),
            ReportKind::MrrMovements => Box::new(MrrMovementsReport),
            ReportKind::TaxSummary => Box::new(TaxSummaryReport),
            ReportKind::PaymentSummary => Box::new(PaymentSummaryReport),
            ReportKind::ArAging => Box::new(ArAgingReport::new(self.config.aging_buckets.clone())),
            ReportKind::CollectionsEfficiency => Box::new(CollectionsEfficiencyReport),
            ReportKind::Reconciliation => Box::new(ReconciliationReport),
            ReportKind::InvoiceSummary => Box::new(InvoiceSummaryReport),
        }
    }

    /// Generates one report for one tenant.
    ///
    /// Metadata filters are validated before the data source is touched.
    pub async fn generate(
        &self,
        ctx: &TenantContext,
        kind: ReportKind,
        params: &ReportParameters,
        source: &dyn ReportDataSource,
    ) -> Result<ReportDocument, ReportError> {
        let span = info_span!("generate_report", tenant_id = %ctx.id, report = %kind);

        async move {
            params.metadata_filters()?;

            match self.report(kind).generate(ctx, params, source).await {
                Ok(doc) => {
                    info!(
                        sections = doc.sections.len(),
                        no_data = doc.is_no_data(),
                        "Report generated"
                    );
                    Ok(doc)
                }
                Err(err) => {
                    warn!(error = %err, "Report generation failed");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}
