//! Tax collected per tax rate.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tally_shared::types::TaxRateId;
use tally_shared::{Money, TenantContext};

use super::error::ReportError;
use super::report::{Report, new_document};
use super::source::ReportDataSource;
use super::types::{DefaultRange, ReportKind, ReportParameters};
use crate::document::{Cell, Group, ReportDocument, Section, TableGroup};
use crate::lookup::LookupCache;

/// Taxable amount and tax per rate name, with totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxSummaryReport;

#[async_trait]
impl Report for TaxSummaryReport {
    fn kind(&self) -> ReportKind {
        ReportKind::TaxSummary
    }

    async fn generate(
        &self,
        ctx: &TenantContext,
        params: &ReportParameters,
        source: &dyn ReportDataSource,
    ) -> Result<ReportDocument, ReportError> {
        let range = params.date_range(DefaultRange::LastYear, ctx.today());
        let scope = params.scope(ctx, range)?;
        let currency = scope.currency;

        let lines = source.tax_lines(&scope).await?;

        let mut names: LookupCache<TaxRateId, String> = LookupCache::new();
        let mut by_rate: BTreeMap<String, (Money, Money)> = BTreeMap::new();
        for line in &lines {
            let name = names
                .get_or_load(&line.tax_rate_id, |id| source.tax_rate_name(ctx.id, id))
                .await?;
            let zero = Money::zero(currency);
            let (taxable, tax) = by_rate.entry(name).or_insert((zero, zero));
            *taxable = taxable.add(&line.taxable)?;
            *tax = tax.add(&line.tax)?;
        }

        let mut table = TableGroup::new(&["Tax Rate", "Taxable Amount", "Tax Collected"]);
        let mut total_taxable = Money::zero(currency);
        let mut total_tax = Money::zero(currency);
        for (name, (taxable, tax)) in by_rate {
            total_taxable = total_taxable.add(&taxable)?;
            total_tax = total_tax.add(&tax)?;
            table.push_row(vec![Cell::Text(name), Cell::Money(taxable), Cell::Money(tax)])?;
        }
        table.set_footer(vec![
            Cell::from("Total"),
            Cell::Money(total_taxable),
            Cell::Money(total_tax),
        ])?;

        Ok(new_document(self.kind(), ctx, currency, range)
            .with_section(Section::new("Tax Summary").with_group(Group::Table(table))))
    }
}
