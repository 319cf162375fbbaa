//! Payments received per method and per month.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::json;
use tally_shared::{Money, TenantContext};

use super::error::ReportError;
use super::report::{Report, new_document};
use super::source::ReportDataSource;
use super::types::{DefaultRange, ReportKind, ReportParameters};
use crate::classify::{DatedEvent, PeriodCursor, accumulate, classify};
use crate::document::{Cell, ChartGroup, ChartType, Group, ReportDocument, Section, TableGroup};
use crate::lookup::LookupCache;
use crate::metrics::percent_of;
use crate::period::{Bucketizer, Granularity};

const RECEIVED: &str = "received";
const PAYMENTS: &str = "payments";

/// Payment totals grouped by method name, plus a monthly trend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentSummaryReport;

#[async_trait]
impl Report for PaymentSummaryReport {
    fn kind(&self) -> ReportKind {
        ReportKind::PaymentSummary
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

        let payments = source.payments(&scope).await?;

        let mut names: LookupCache<String, String> = LookupCache::new();
        let mut by_method: BTreeMap<String, (i64, Money)> = BTreeMap::new();
        for payment in &payments {
            let name = names
                .get_or_load(&payment.method, |method| async move {
                    source.payment_method_name(ctx.id, &method).await
                })
                .await?;
            let (count, total) = by_method
                .entry(name)
                .or_insert((0, Money::zero(currency)));
            *count += 1;
            *total = total.add(&payment.amount)?;
        }

        let grand_total = Money::sum(currency, by_method.values().map(|(_, total)| total))?;

        let mut methods = TableGroup::new(&["Payment Method", "Payments", "Amount", "Share"]);
        let mut shares = ChartGroup::new(ChartType::Pie, by_method.keys().cloned().collect())
            .with_option("legend", json!("right"));
        for (name, (count, total)) in &by_method {
            methods.push_row(vec![
                Cell::from(name.as_str()),
                Cell::Integer(*count),
                Cell::Money(*total),
                Cell::Percent(percent_of(total.to_decimal(), grand_total.to_decimal())),
            ])?;
        }
        methods.set_footer(vec![
            Cell::from("Total"),
            Cell::Integer(i64::try_from(payments.len()).unwrap_or(i64::MAX)),
            Cell::Money(grand_total),
            Cell::Empty,
        ])?;
        shares.push_series(
            "Amount",
            by_method.values().map(|(_, total)| total.to_decimal()).collect(),
        )?;

        let mut months = Bucketizer::new(Granularity::Month, ctx.week_start(), currency)
            .with_accumulators(&[RECEIVED])
            .with_counters(&[PAYMENTS])
            .build(range.start, range.end)?;
        let events: Vec<DatedEvent> = payments
            .iter()
            .map(|p| DatedEvent::new(p.date).with_amount(p.amount))
            .collect();
        classify(
            &events,
            ctx.time_zone,
            &mut [PeriodCursor::new(&mut months)],
            |event, period| accumulate(event, period, RECEIVED, Some(PAYMENTS)),
        )?;

        let mut trend = TableGroup::new(&["Month", "Payments", "Amount"]);
        for month in months.iter().rev() {
            trend.push_row(vec![
                Cell::from(month.label.as_str()),
                Cell::Integer(month.count(PAYMENTS)),
                Cell::Money(month.amount(RECEIVED)),
            ])?;
        }
        let mut chart = ChartGroup::new(
            ChartType::Bar,
            months.iter().map(|m| m.label.clone()).collect(),
        );
        chart.push_series(
            "Received",
            months.iter().map(|m| m.amount(RECEIVED).to_decimal()).collect(),
        )?;

        Ok(new_document(self.kind(), ctx, currency, range)
            .with_section(
                Section::new("By Payment Method")
                    .with_group(Group::Table(methods))
                    .with_group(Group::Chart(shares)),
            )
            .with_section(
                Section::new("Monthly Trend")
                    .with_group(Group::Chart(chart))
                    .with_group(Group::Table(trend)),
            ))
    }
}
