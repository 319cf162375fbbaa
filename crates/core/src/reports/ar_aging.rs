//! A/R aging by customer.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tally_shared::{Money, TenantContext};

use super::error::ReportError;
use super::report::{Report, new_document};
use super::source::ReportDataSource;
use super::types::{DateRange, ReportKind, ReportParameters};
use crate::document::{Cell, Group, ReportDocument, Section, TableGroup, money_or_blank};
use crate::metrics::{aging_buckets, bucket_index};

/// Open balances per customer across aging buckets as of a date.
#[derive(Debug, Clone)]
pub struct ArAgingReport {
    bounds: Vec<u32>,
}

impl ArAgingReport {
    /// Uses `bounds` (days past due) as bucket upper limits.
    #[must_use]
    pub fn new(bounds: Vec<u32>) -> Self {
        Self { bounds }
    }
}

#[async_trait]
impl Report for ArAgingReport {
    fn kind(&self) -> ReportKind {
        ReportKind::ArAging
    }

    async fn generate(
        &self,
        ctx: &TenantContext,
        params: &ReportParameters,
        source: &dyn ReportDataSource,
    ) -> Result<ReportDocument, ReportError> {
        let buckets = aging_buckets(&self.bounds).map_err(|err| ReportError::InvalidParameter {
            name: "aging_buckets".to_string(),
            reason: err.to_string(),
        })?;
        let as_of = params.as_of_date(ctx.today());
        let range = DateRange { start: as_of, end: as_of };
        let scope = params.scope(ctx, range)?;
        let currency = scope.currency;

        let invoices = source.open_invoices(&scope).await?;

        let zero_row = vec![Money::zero(currency); buckets.len()];
        let mut by_customer: BTreeMap<&str, Vec<Money>> = BTreeMap::new();
        let mut totals = zero_row.clone();
        for invoice in &invoices {
            let days_past_due = (as_of - invoice.due_date).num_days();
            let Some(index) = bucket_index(&buckets, days_past_due) else {
                continue;
            };
            let row = by_customer
                .entry(invoice.customer.as_str())
                .or_insert_with(|| zero_row.clone());
            row[index] = row[index].add(&invoice.balance)?;
            totals[index] = totals[index].add(&invoice.balance)?;
        }

        let mut header = vec!["Customer".to_string()];
        header.extend(buckets.iter().map(|b| b.label.clone()));
        header.push("Total".to_string());
        let mut table = TableGroup::new(&header);

        for (customer, amounts) in &by_customer {
            let mut row = vec![Cell::from(*customer)];
            row.extend(amounts.iter().copied().map(money_or_blank));
            row.push(Cell::Money(Money::sum(currency, amounts)?));
            table.push_row(row)?;
        }

        let mut footer = vec![Cell::from("Total")];
        footer.extend(totals.iter().copied().map(money_or_blank));
        footer.push(Cell::Money(Money::sum(currency, &totals)?));
        table.set_footer(footer)?;

        Ok(new_document(self.kind(), ctx, currency, range)
            .with_parameter("as_of", ctx.format_date(as_of))
            .with_section(Section::new("Aging").with_group(Group::Table(table))))
    }
}
