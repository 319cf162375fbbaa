//! MRR loading shared by the subscription reports.

use tally_shared::{Currency, TenantContext};
use tracing::debug;

use super::error::ReportError;
use super::source::{KIND, ReportDataSource};
use super::types::{DateRange, DefaultRange, ReportParameters};
use crate::classify::{DatedEvent, PeriodCursor, accumulate, classify};
use crate::metrics::mrr::{LOST_CUSTOMERS, NEW_CUSTOMERS, REACTIVATED_CUSTOMERS};
use crate::metrics::{MovementKind, MrrBridge};
use crate::period::{Bucketizer, Granularity};

/// Monthly MRR bridge over the requested range.
pub(crate) struct SubscriptionData {
    pub range: DateRange,
    pub currency: Currency,
    pub bridge: MrrBridge,
}

/// Fetches the opening snapshot and the movements, classifies the movements
/// into calendar months and carries the running totals forward.
pub(crate) async fn load(
    ctx: &TenantContext,
    params: &ReportParameters,
    source: &dyn ReportDataSource,
) -> Result<SubscriptionData, ReportError> {
    let range = params.date_range(DefaultRange::LastYear, ctx.today());
    let scope = params.scope(ctx, range)?;

    let opening = source.mrr_opening(&scope).await?;
    let movements = source.mrr_movements(&scope).await?;

    let accumulators: Vec<&str> = MovementKind::ALL.iter().map(|k| k.as_str()).collect();
    let mut months = Bucketizer::new(Granularity::Month, ctx.week_start(), scope.currency)
        .with_accumulators(&accumulators)
        .with_counters(&[NEW_CUSTOMERS, REACTIVATED_CUSTOMERS, LOST_CUSTOMERS])
        .build(range.start, range.end)?;

    let events: Vec<DatedEvent> = movements.iter().map(DatedEvent::from).collect();
    let mut cursors = [PeriodCursor::new(&mut months)];
    let stats = classify(&events, ctx.time_zone, &mut cursors, |event, period| {
        match event.meta(KIND).and_then(|k| k.parse::<MovementKind>().ok()) {
            Some(kind) => accumulate(event, period, kind.as_str(), kind.customer_counter()),
            None => Ok(()),
        }
    })?;
    debug!(
        movements = stats.events,
        months = cursors[0].position() + 1,
        "Classified MRR movements"
    );

    let bridge = MrrBridge::build(opening, &months)?;
    Ok(SubscriptionData {
        range,
        currency: scope.currency,
        bridge,
    })
}
