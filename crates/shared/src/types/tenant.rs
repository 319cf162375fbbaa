//! Tenant (company) context that scopes every report computation.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::id::TenantId;
use super::money::Currency;

/// First day of the week in a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// Weeks start on Saturday (most Gulf states, Egypt).
    Saturday,
    /// Weeks start on Sunday (US, Canada, Japan, Brazil, ...).
    Sunday,
    /// Weeks start on Monday (ISO 8601, most of Europe).
    Monday,
}

/// Regions whose calendars start the week on Sunday.
const SUNDAY_REGIONS: &[&str] = &[
    "AG", "AS", "BD", "BR", "BS", "BT", "BW", "BZ", "CA", "CN", "CO", "DM", "DO", "ET", "GT",
    "GU", "HK", "HN", "ID", "IL", "IN", "JM", "JP", "KE", "KH", "KR", "LA", "MH", "MM", "MO",
    "MT", "MX", "MZ", "NI", "NP", "PA", "PE", "PH", "PK", "PR", "PT", "PY", "SA", "SG", "SV",
    "TH", "TT", "TW", "UM", "US", "VE", "VI", "WS", "YE", "ZA", "ZW",
];

/// Regions whose calendars start the week on Saturday.
const SATURDAY_REGIONS: &[&str] = &[
    "AE", "AF", "BH", "DJ", "DZ", "EG", "IQ", "IR", "JO", "KW", "LY", "OM", "QA", "SD", "SY",
];

/// Date format used when a tenant has none (e.g. `Mar 9, 2024`).
pub const DEFAULT_DATE_FORMAT: &str = "%b %-d, %Y";

/// Whether `pattern` is a strftime pattern that can render a calendar date.
///
/// Rejects unknown specifiers and time-of-day fields, both of which make
/// chrono's formatter fail.
#[must_use]
pub fn is_date_format(pattern: &str) -> bool {
    try_format(NaiveDate::MIN, pattern).is_some()
}

/// Formats `date`, falling back to [`DEFAULT_DATE_FORMAT`] when `pattern` cannot render it.
#[must_use]
pub fn format_date_or_default(date: NaiveDate, pattern: &str) -> String {
    try_format(date, pattern).unwrap_or_else(|| date.format(DEFAULT_DATE_FORMAT).to_string())
}

fn try_format(date: NaiveDate, pattern: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(pattern)).ok()?;
    Some(out)
}

impl WeekStart {
    /// Derives the week start from a locale tag such as `en_US`, `en-GB` or `ar-EG`.
    ///
    /// Locales without a region fall back to Monday.
    #[must_use]
    pub fn for_locale(locale: &str) -> Self {
        let region = locale
            .split(['_', '-', '.', '@'])
            .skip(1)
            .find(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
            .map(str::to_ascii_uppercase);

        match region.as_deref() {
            Some(r) if SATURDAY_REGIONS.contains(&r) => Self::Saturday,
            Some(r) if SUNDAY_REGIONS.contains(&r) => Self::Sunday,
            _ => Self::Monday,
        }
    }

    /// The chrono weekday that opens a week.
    #[must_use]
    pub const fn weekday(self) -> Weekday {
        match self {
            Self::Saturday => Weekday::Sat,
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
        }
    }

    /// Number of days between the week start and `day`.
    #[must_use]
    pub fn days_since_start(self, day: Weekday) -> u32 {
        (7 + day.num_days_from_monday() - self.weekday().num_days_from_monday()) % 7
    }
}

/// Read-only tenant context established once per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantContext {
    /// Tenant ID every query is filtered by.
    pub id: TenantId,
    /// Reporting currency.
    pub currency: Currency,
    /// IANA time zone.
    pub time_zone: Tz,
    /// chrono `strftime` pattern for dates (e.g. `%b %-d, %Y`).
    pub date_format: String,
    /// Locale tag (e.g. `en_US`).
    pub locale: String,
}

impl TenantContext {
    /// Creates a context with the default date format.
    #[must_use]
    pub fn new(id: TenantId, currency: Currency, time_zone: Tz, locale: impl Into<String>) -> Self {
        Self {
            id,
            currency,
            time_zone,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            locale: locale.into(),
        }
    }

    /// Overrides the date format. Patterns that cannot render a date are ignored.
    #[must_use]
    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        let date_format = date_format.into();
        if is_date_format(&date_format) {
            self.date_format = date_format;
        }
        self
    }

    /// Week start convention of the tenant's locale.
    #[must_use]
    pub fn week_start(&self) -> WeekStart {
        WeekStart::for_locale(&self.locale)
    }

    /// Calendar date of an instant in the tenant's time zone.
    #[must_use]
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.time_zone).date_naive()
    }

    /// Today's date in the tenant's time zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }

    /// Formats a date with the tenant's date format.
    #[must_use]
    pub fn format_date(&self, date: NaiveDate) -> String {
        format_date_or_default(date, &self.date_format)
    }
}
