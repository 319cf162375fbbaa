//! Report kinds, parameters and date ranges.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::TenantId;
use tally_shared::{Currency, TenantContext};
use tracing::warn;

use super::error::ReportError;
use crate::definition::{MetadataFilter, MetadataScope};

/// Every report the engine can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Expected receipts from open installments.
    CashFlow,
    /// Customer lifetime value by month.
    LifetimeValue,
    /// Net revenue retention by month.
    NetRevenueRetention,
    /// User and revenue churn by month.
    SubscriptionChurn,
    /// Running subscriber count by month.
    SubscriberCount,
    /// Monthly MRR bridge.
    MrrMovements,
    /// Tax collected per tax rate.
    TaxSummary,
    /// Payments per method and month.
    PaymentSummary,
    /// Open balances by days past due.
    ArAging,
    /// DSO and collections efficiency.
    CollectionsEfficiency,
    /// A/R roll-forward against the ledger.
    Reconciliation,
    /// Tabular invoice listing.
    InvoiceSummary,
}

impl ReportKind {
    /// Every kind.
    pub const ALL: [Self; 12] = [
        Self::CashFlow,
        Self::LifetimeValue,
        Self::NetRevenueRetention,
        Self::SubscriptionChurn,
        Self::SubscriberCount,
        Self::MrrMovements,
        Self::TaxSummary,
        Self::PaymentSummary,
        Self::ArAging,
        Self::CollectionsEfficiency,
        Self::Reconciliation,
        Self::InvoiceSummary,
    ];

    /// Snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashFlow => "cash_flow",
            Self::LifetimeValue => "lifetime_value",
            Self::NetRevenueRetention => "net_revenue_retention",
            Self::SubscriptionChurn => "subscription_churn",
            Self::SubscriberCount => "subscriber_count",
            Self::MrrMovements => "mrr_movements",
            Self::TaxSummary => "tax_summary",
            Self::PaymentSummary => "payment_summary",
            Self::ArAging => "ar_aging",
            Self::CollectionsEfficiency => "collections_efficiency",
            Self::Reconciliation => "reconciliation",
            Self::InvoiceSummary => "invoice_summary",
        }
    }

    /// Document title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::CashFlow => "Cash Flow Forecast",
            Self::LifetimeValue => "Customer Lifetime Value",
            Self::NetRevenueRetention => "Net Revenue Retention",
            Self::SubscriptionChurn => "Subscription Churn",
            Self::SubscriberCount => "Subscriber Count",
            Self::MrrMovements => "MRR Movements",
            Self::TaxSummary => "Tax Summary",
            Self::PaymentSummary => "Payment Summary",
            Self::ArAging => "A/R Aging",
            Self::CollectionsEfficiency => "Collections Efficiency",
            Self::Reconciliation => "A/R Reconciliation",
            Self::InvoiceSummary => "Invoice Summary",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ReportError::UnknownReport(s.to_string()))
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of days, both ends included.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Returns true if `date` is inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Range a report falls back to when no valid range was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultRange {
    /// The year up to and including today.
    LastYear,
    /// Everything up to and including today.
    AllTime,
    /// Today and the following `n` days.
    NextDays(u32),
    /// Today only.
    AsOf,
}

impl DefaultRange {
    /// Resolves the default against `today`.
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        let start = match self {
            Self::LastYear => today
                .checked_sub_months(Months::new(12))
                .and_then(|d| d.succ_opt())
                .unwrap_or(today),
            Self::AllTime => DateTime::<Utc>::UNIX_EPOCH.date_naive(),
            Self::NextDays(_) | Self::AsOf => today,
        };
        let end = match self {
            Self::NextDays(days) => today
                .checked_add_days(Days::new(u64::from(days)))
                .unwrap_or(today),
            Self::LastYear | Self::AllTime | Self::AsOf => today,
        };
        DateRange {
            start: start.min(today),
            end,
        }
    }
}

/// Data a report is allowed to see.
///
/// Every data source call is filtered by `tenant_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataScope {
    /// Tenant every row must belong to.
    pub tenant_id: TenantId,
    /// Report currency; rows in other currencies are excluded.
    pub currency: Currency,
    /// Date range.
    pub range: DateRange,
    /// Validated metadata filters.
    pub filters: Vec<MetadataFilter>,
}

/// Raw request parameters, as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportParameters {
    /// Range start (`YYYY-MM-DD`).
    pub start: Option<String>,
    /// Range end (`YYYY-MM-DD`).
    pub end: Option<String>,
    /// Point-in-time date for aging (`YYYY-MM-DD`).
    pub as_of: Option<String>,
    /// Currency code; the tenant currency when absent.
    pub currency: Option<String>,
    /// Report-specific grouping.
    pub group_by: Option<String>,
    /// Invoice metadata filters.
    pub invoice_metadata: BTreeMap<String, String>,
    /// Customer metadata filters.
    pub customer_metadata: BTreeMap<String, String>,
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
}

impl ReportParameters {
    /// Parameters covering `start..=end`.
    #[must_use]
    pub fn between(start: &str, end: &str) -> Self {
        Self {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            ..Self::default()
        }
    }

    /// Resolves the requested range, or `default` if it is missing, does not
    /// parse or is inverted.
    pub fn date_range(&self, default: DefaultRange, today: NaiveDate) -> DateRange {
        let requested = match (
            parse_date(self.start.as_deref()),
            parse_date(self.end.as_deref()),
        ) {
            (Some(start), Some(end)) => DateRange::new(start, end),
            _ => Err(ReportError::InvalidParameter {
                name: "start/end".to_string(),
                reason: "expected YYYY-MM-DD".to_string(),
            }),
        };

        match requested {
            Ok(range) => range,
            Err(err) => {
                let fallback = default.resolve(today);
                if self.start.is_some() || self.end.is_some() {
                    warn!(
                        error = %err,
                        start = %fallback.start,
                        end = %fallback.end,
                        "Unusable date range, using default"
                    );
                }
                fallback
            }
        }
    }

    /// Point-in-time date, or `today` if missing or unparsable.
    pub fn as_of_date(&self, today: NaiveDate) -> NaiveDate {
        match parse_date(self.as_of.as_deref()) {
            Some(date) => date,
            None => {
                if let Some(raw) = &self.as_of {
                    warn!(as_of = %raw, "Unusable as-of date, using today");
                }
                today
            }
        }
    }

    /// Requested currency, or the tenant's.
    pub fn currency(&self, ctx: &TenantContext) -> Result<Currency, ReportError> {
        match &self.currency {
            None => Ok(ctx.currency),
            Some(code) => Currency::new(code).map_err(|err| ReportError::InvalidParameter {
                name: "currency".to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// Validates and collects every metadata filter.
    pub fn metadata_filters(&self) -> Result<Vec<MetadataFilter>, ReportError> {
        let invoice = self
            .invoice_metadata
            .iter()
            .map(|(k, v)| MetadataFilter::new(MetadataScope::Invoice, k, v));
        let customer = self
            .customer_metadata
            .iter()
            .map(|(k, v)| MetadataFilter::new(MetadataScope::Customer, k, v));

        invoice
            .chain(customer)
            .map(|filter| filter.map_err(ReportError::from))
            .collect()
    }

    /// Builds the data scope for a resolved range.
    pub fn scope(&self, ctx: &TenantContext, range: DateRange) -> Result<DataScope, ReportError> {
        Ok(DataScope {
            tenant_id: ctx.id,
            currency: self.currency(ctx)?,
            range,
            filters: self.metadata_filters()?,
        })
    }
}
