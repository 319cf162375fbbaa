//! Invoice listing built from a report definition.

use async_trait::async_trait;
use tally_shared::TenantContext;

use super::error::ReportError;
use super::report::{Report, new_document};
use super::source::ReportDataSource;
use super::types::{DefaultRange, ReportKind, ReportParameters};
use crate::definition::{DataObject, Field, Filter, ReportDefinition};
use crate::document::{Group, ReportDocument, Section, TableGroup};

const GROUPABLE: &[&str] = &["customer", "currency", "status"];

/// Invoices in the range, one row each or grouped by `group_by`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceSummaryReport;

impl InvoiceSummaryReport {
    /// Definition for the given parameters.
    pub fn definition(params: &ReportParameters) -> Result<ReportDefinition, ReportError> {
        let base = ReportDefinition::new(DataObject::Invoice);

        let mut definition = match params.group_by.as_deref() {
            None => base
                .add_field(Field::plain("number"))?
                .add_field(Field::plain("date"))?
                .add_field(Field::plain("due_date"))?
                .add_field(Field::plain("customer"))?
                .add_field(Field::plain("status"))?
                .add_field(Field::plain("total"))?
                .add_field(Field::plain("balance"))?,
            Some(group) if GROUPABLE.contains(&group) => base
                .add_field(Field::plain(group))?
                .add_field(Field::count("number").labelled("Invoices"))?
                .add_field(Field::sum("total"))?
                .add_field(Field::sum("balance"))?
                .add_group_by(group)?,
            Some(other) => {
                return Err(ReportError::InvalidParameter {
                    name: "group_by".to_string(),
                    reason: format!("cannot group invoices by '{other}'"),
                });
            }
        };

        for filter in params.metadata_filters()? {
            definition = definition.add_filter(Filter::Metadata(filter))?;
        }
        Ok(definition)
    }
}

#[async_trait]
impl Report for InvoiceSummaryReport {
    fn kind(&self) -> ReportKind {
        ReportKind::InvoiceSummary
    }

    async fn generate(
        &self,
        ctx: &TenantContext,
        params: &ReportParameters,
        source: &dyn ReportDataSource,
    ) -> Result<ReportDocument, ReportError> {
        let range = params.date_range(DefaultRange::LastYear, ctx.today());
        let scope = params.scope(ctx, range)?;
        let definition = Self::definition(params)?;

        let rows = source.fetch_rows(&scope, &definition).await?;

        let mut table = TableGroup::new(&definition.header());
        for row in rows {
            table.push_row(row.cells)?;
        }

        let mut doc = new_document(self.kind(), ctx, scope.currency, range);
        if let Some(group) = &params.group_by {
            doc = doc.with_parameter("group_by", group);
        }
        Ok(doc.with_section(Section::new("Invoices").with_group(Group::Table(table))))
    }
}
