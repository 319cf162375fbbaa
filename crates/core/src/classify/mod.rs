//! Single-pass classification of dated events into reporting periods.
//!
//! Events must be sorted ascending by timestamp. Each period sequence is
//! walked by its own [`PeriodCursor`], which only ever moves forward, so a
//! pass costs O(events + periods) per sequence.
//!
//! Out-of-range events are clamped: anything before the first period lands
//! in the first period and anything after the last period lands in the last
//! one. This is the behaviour reports have always had, not a considered
//! policy, and it can silently fold stray rows into an edge bucket.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tally_shared::{Money, MoneyError};
use tracing::debug;

use crate::period::ReportingPeriod;

/// A dated unit of money or count to classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedEvent {
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// Optional amount carried by the event.
    pub amount: Option<Money>,
    /// Free-form attributes (e.g. movement kind).
    pub metadata: BTreeMap<String, String>,
}

impl DatedEvent {
    /// Creates an event with no amount.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            amount: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Attaches an amount.
    #[must_use]
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Attaches a metadata attribute.
    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Looks up a metadata attribute.
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Forward-only position in one period sequence.
#[derive(Debug)]
pub struct PeriodCursor<'a> {
    periods: &'a mut [ReportingPeriod],
    position: usize,
    steps: usize,
}

impl<'a> PeriodCursor<'a> {
    /// Places a cursor on the first period.
    pub fn new(periods: &'a mut [ReportingPeriod]) -> Self {
        Self {
            periods,
            position: 0,
            steps: 0,
        }
    }

    /// Current index.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Total number of forward moves made so far.
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Advances to the period whose window holds `date` and returns it.
    ///
    /// Stops at the last period. Returns `None` only for an empty sequence.
    pub fn seek(&mut self, date: NaiveDate) -> Option<&mut ReportingPeriod> {
        let last = self.periods.len().checked_sub(1)?;
        while self.position < last && date > self.periods[self.position].window_end {
            self.position += 1;
            self.steps += 1;
        }
        self.periods.get_mut(self.position)
    }

    fn first_window_start(&self) -> Option<NaiveDate> {
        self.periods.first().map(|p| p.window_start)
    }

    fn last_window_end(&self) -> Option<NaiveDate> {
        self.periods.last().map(|p| p.window_end)
    }
}

/// Counts gathered during one classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassificationStats {
    /// Events seen.
    pub events: usize,
    /// Events dated before the first period (folded into it).
    pub before_range: usize,
    /// Events dated after the last period (folded into it).
    pub after_range: usize,
}

/// Classifies `events` into every cursor's sequence in one pass.
///
/// `apply` is called once per event per sequence with the period the event
/// belongs to. Event dates are taken in the tenant time zone `tz`.
pub fn classify<F>(
    events: &[DatedEvent],
    tz: Tz,
    cursors: &mut [PeriodCursor<'_>],
    mut apply: F,
) -> Result<ClassificationStats, MoneyError>
where
    F: FnMut(&DatedEvent, &mut ReportingPeriod) -> Result<(), MoneyError>,
{
    let mut stats = ClassificationStats::default();
    let bounds = cursors
        .first()
        .and_then(|c| Some((c.first_window_start()?, c.last_window_end()?)));

    for event in events {
        let date = event.timestamp.with_timezone(&tz).date_naive();
        stats.events += 1;

        if let Some((first, last)) = bounds {
            if date < first {
                stats.before_range += 1;
            } else if date > last {
                stats.after_range += 1;
            }
        }

        for cursor in cursors.iter_mut() {
            if let Some(period) = cursor.seek(date) {
                apply(event, period)?;
            }
        }
    }

    if stats.before_range > 0 || stats.after_range > 0 {
        debug!(
            before_range = stats.before_range,
            after_range = stats.after_range,
            "Out-of-range events folded into edge periods"
        );
    }

    Ok(stats)
}

/// Standard `apply` step: adds the event amount into `accumulator` and bumps `counter`.
pub fn accumulate(
    event: &DatedEvent,
    period: &mut ReportingPeriod,
    accumulator: &str,
    counter: Option<&str>,
) -> Result<(), MoneyError> {
    if let Some(amount) = &event.amount {
        period.add_amount(accumulator, amount)?;
    }
    if let Some(counter) = counter {
        period.increment(counter, 1);
    }
    Ok(())
}
