//! Derived financial metrics.
//!
//! - `ratios` - guarded ratios (churn, ARPU, LTV, NRR, DSO, collections efficiency)
//! - `mrr` - the monthly MRR bridge with running totals
//! - `aging` - A/R aging bucket columns

pub mod aging;
pub mod mrr;
pub mod ratios;

pub use aging::{AgingBoundsError, AgingBucket, aging_buckets, bucket_index};
pub use mrr::{MovementKind, MrrBridge, MrrMonth, MrrSnapshot};
pub use ratios::{
    ASSUMED_LIFETIME_MONTHS, arpu, collections_efficiency, days_sales_outstanding, lifetime_value,
    net_revenue_retention, percent_of, revenue_churn, user_churn,
};
