//! Weekly and monthly reporting periods.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tally_shared::{Currency, Money, MoneyError, WeekStart};
use tally_shared::types::{DEFAULT_DATE_FORMAT, format_date_or_default, is_date_format};

use super::error::PeriodError;

/// Calendar unit a period spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One week, starting on the tenant's week-start day.
    Week,
    /// One calendar month.
    Month,
}

/// One bucket of a period sequence.
///
/// `window_start..=window_end` is the full calendar unit used for
/// classification; `start..=end` is the same unit clipped to the requested
/// range and is what the label shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    /// Position in the sequence (0 = oldest).
    pub index: usize,
    /// First day of the calendar unit.
    pub window_start: NaiveDate,
    /// Last day of the calendar unit.
    pub window_end: NaiveDate,
    /// First day shown for this period.
    pub start: NaiveDate,
    /// Last day shown for this period.
    pub end: NaiveDate,
    /// Display label.
    pub label: String,
    /// Currency of every accumulator.
    pub currency: Currency,
    /// Named money totals.
    pub accumulators: BTreeMap<String, Money>,
    /// Named counts.
    pub counters: BTreeMap<String, i64>,
}

impl ReportingPeriod {
    /// Returns true if `date` falls in this period's calendar window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.window_start && date <= self.window_end
    }

    /// Adds `amount` into the named accumulator.
    pub fn add_amount(&mut self, name: &str, amount: &Money) -> Result<(), MoneyError> {
        let current = self
            .accumulators
            .get(name)
            .copied()
            .unwrap_or_else(|| Money::zero(self.currency));
        let updated = current.add(amount)?;
        self.accumulators.insert(name.to_string(), updated);
        Ok(())
    }

    /// Adds `by` to the named counter.
    pub fn increment(&mut self, name: &str, by: i64) {
        *self.counters.entry(name.to_string()).or_insert(0) += by;
    }

    /// Total of the named accumulator (zero if never touched).
    #[must_use]
    pub fn amount(&self, name: &str) -> Money {
        self.accumulators
            .get(name)
            .copied()
            .unwrap_or_else(|| Money::zero(self.currency))
    }

    /// Value of the named counter (zero if never touched).
    #[must_use]
    pub fn count(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Number of days in the clipped period.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// First day of the calendar unit containing `date`.
#[must_use]
pub fn unit_start(date: NaiveDate, granularity: Granularity, week_start: WeekStart) -> NaiveDate {
    match granularity {
        Granularity::Week => {
            let offset = week_start.days_since_start(date.weekday());
            date - Days::new(u64::from(offset))
        }
        Granularity::Month => date.with_day(1).unwrap_or(date),
    }
}

/// First day of the unit following the one starting at `start`.
pub fn next_unit_start(
    start: NaiveDate,
    granularity: Granularity,
) -> Result<NaiveDate, PeriodError> {
    let next = match granularity {
        Granularity::Week => start.checked_add_days(Days::new(7)),
        Granularity::Month => start.checked_add_months(Months::new(1)),
    };
    next.ok_or(PeriodError::OutOfRange(start))
}

/// Builds period sequences with a fixed set of named accumulators.
#[derive(Debug, Clone)]
pub struct Bucketizer {
    granularity: Granularity,
    week_start: WeekStart,
    currency: Currency,
    accumulators: Vec<String>,
    counters: Vec<String>,
    date_format: String,
}

impl Bucketizer {
    /// Creates a bucketizer with no accumulators.
    #[must_use]
    pub fn new(granularity: Granularity, week_start: WeekStart, currency: Currency) -> Self {
        Self {
            granularity,
            week_start,
            currency,
            accumulators: Vec::new(),
            counters: Vec::new(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Declares money accumulators, initialised to zero in every period.
    #[must_use]
    pub fn with_accumulators(mut self, names: &[&str]) -> Self {
        self.accumulators.extend(names.iter().map(|n| (*n).to_string()));
        self
    }

    /// Declares counters, initialised to zero in every period.
    #[must_use]
    pub fn with_counters(mut self, names: &[&str]) -> Self {
        self.counters.extend(names.iter().map(|n| (*n).to_string()));
        self
    }

    /// Date format used in weekly labels. Patterns that cannot render a date are ignored.
    #[must_use]
    pub fn with_date_format(mut self, date_format: &str) -> Self {
        if is_date_format(date_format) {
            self.date_format = date_format.to_string();
        }
        self
    }

    /// Tiles `start..=end` with calendar units.
    ///
    /// Starts at the unit containing `start` and keeps emitting while the
    /// next unit start is on or before `end`, so `start == end` yields one period.
    pub fn build(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ReportingPeriod>, PeriodError> {
        if start > end {
            return Err(PeriodError::InvertedRange { start, end });
        }

        let mut periods = Vec::new();
        let mut window_start = unit_start(start, self.granularity, self.week_start);

        loop {
            let next = next_unit_start(window_start, self.granularity)?;
            let window_end = next.pred_opt().ok_or(PeriodError::OutOfRange(next))?;
            let clipped_start = window_start.max(start);
            let clipped_end = window_end.min(end);

            periods.push(ReportingPeriod {
                index: periods.len(),
                window_start,
                window_end,
                start: clipped_start,
                end: clipped_end,
                label: self.label(window_start, clipped_start, clipped_end),
                currency: self.currency,
                accumulators: self
                    .accumulators
                    .iter()
                    .map(|name| (name.clone(), Money::zero(self.currency)))
                    .collect(),
                counters: self.counters.iter().map(|name| (name.clone(), 0)).collect(),
            });

            if next > end {
                break;
            }
            window_start = next;
        }

        Ok(periods)
    }

    fn label(&self, window_start: NaiveDate, start: NaiveDate, end: NaiveDate) -> String {
        match self.granularity {
            Granularity::Month => window_start.format("%b %Y").to_string(),
            Granularity::Week => format!(
                "{} - {}",
                format_date_or_default(start, &self.date_format),
                format_date_or_default(end, &self.date_format)
            ),
        }
    }
}
