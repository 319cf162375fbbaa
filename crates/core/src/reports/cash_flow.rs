//! Cash flow forecast from open installments.

use async_trait::async_trait;
use tally_shared::{Currency, Money, TenantContext};
use tracing::debug;

use super::error::ReportError;
use super::report::{Report, new_document};
use super::source::ReportDataSource;
use super::types::{DefaultRange, ReportKind, ReportParameters};
use crate::classify::{DatedEvent, PeriodCursor, accumulate, classify};
use crate::document::{
    Cell, ChartGroup, ChartType, Group, KeyValueGroup, ReportDocument, Section, TableGroup,
};
use crate::period::{Bucketizer, Granularity, ReportingPeriod};

const EXPECTED: &str = "expected";
const INSTALLMENTS: &str = "installments";

/// Expected receipts per week and per month.
///
/// Installments already overdue at the start of the range fold into the
/// first period, so the first week and month show everything collectable
/// right now.
#[derive(Debug, Clone, Copy)]
pub struct CashFlowReport {
    forecast_days: u32,
}

impl CashFlowReport {
    /// Forecasts `forecast_days` ahead when no valid range is given.
    #[must_use]
    pub const fn new(forecast_days: u32) -> Self {
        Self { forecast_days }
    }
}

fn period_table(
    first_column: &str,
    periods: &[ReportingPeriod],
    currency: Currency,
) -> Result<TableGroup, ReportError> {
    let mut table = TableGroup::new(&[first_column, "Installments", "Expected"]);
    for period in periods {
        table.push_row(vec![
            Cell::from(period.label.as_str()),
            Cell::Integer(period.count(INSTALLMENTS)),
            Cell::Money(period.amount(EXPECTED)),
        ])?;
    }
    let amounts: Vec<Money> = periods.iter().map(|p| p.amount(EXPECTED)).collect();
    let total = Money::sum(currency, &amounts)?;
    let count: i64 = periods.iter().map(|p| p.count(INSTALLMENTS)).sum();
    table.set_footer(vec![Cell::from("Total"), Cell::Integer(count), Cell::Money(total)])?;
    Ok(table)
}

#[async_trait]
impl Report for CashFlowReport {
    fn kind(&self) -> ReportKind {
        ReportKind::CashFlow
    }

    async fn generate(
        &self,
        ctx: &TenantContext,
        params: &ReportParameters,
        source: &dyn ReportDataSource,
    ) -> Result<ReportDocument, ReportError> {
        let range = params.date_range(DefaultRange::NextDays(self.forecast_days), ctx.today());
        let scope = params.scope(ctx, range)?;
        let currency = scope.currency;

        let installments = source.expected_payments(&scope).await?;

        let bucketizer = |granularity| {
            Bucketizer::new(granularity, ctx.week_start(), currency)
                .with_accumulators(&[EXPECTED])
                .with_counters(&[INSTALLMENTS])
                .with_date_format(&ctx.date_format)
                .build(range.start, range.end)
        };
        let mut weeks = bucketizer(Granularity::Week)?;
        let mut months = bucketizer(Granularity::Month)?;

        let events: Vec<DatedEvent> = installments
            .iter()
            .map(|row| DatedEvent::new(row.due).with_amount(row.amount))
            .collect();
        let overdue = Money::sum(
            currency,
            installments
                .iter()
                .filter(|row| ctx.local_date(row.due) < range.start)
                .map(|row| &row.amount),
        )?;

        let mut cursors = [PeriodCursor::new(&mut weeks), PeriodCursor::new(&mut months)];
        let stats = classify(&events, ctx.time_zone, &mut cursors, |event, period| {
            accumulate(event, period, EXPECTED, Some(INSTALLMENTS))
        })?;
        debug!(
            installments = stats.events,
            weekly_steps = cursors[0].steps(),
            monthly_steps = cursors[1].steps(),
            "Classified expected payments"
        );

        let total = Money::sum(currency, installments.iter().map(|row| &row.amount))?;

        let mut chart = ChartGroup::new(
            ChartType::Bar,
            months.iter().map(|m| m.label.clone()).collect(),
        );
        chart.push_series(
            "Expected",
            months.iter().map(|m| m.amount(EXPECTED).to_decimal()).collect(),
        )?;

        let summary = KeyValueGroup::new()
            .with("Total Expected", total)
            .with("Already Overdue", overdue)
            .with("Open Installments", i64::try_from(installments.len()).unwrap_or(i64::MAX));

        Ok(new_document(self.kind(), ctx, currency, range)
            .with_section(Section::new("Summary").with_group(Group::KeyValue(summary)))
            .with_section(
                Section::new("Monthly")
                    .with_group(Group::Chart(chart))
                    .with_group(Group::Table(period_table("Month", &months, currency)?)),
            )
            .with_section(
                Section::new("Weekly")
                    .with_group(Group::Table(period_table("Week", &weeks, currency)?)),
            ))
    }
}
