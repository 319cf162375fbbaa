//! Common types used across the application.

pub mod id;
pub mod money;
pub mod tenant;

pub use id::*;
pub use money::{Currency, Money, MoneyError};
pub use tenant::{
    DEFAULT_DATE_FORMAT, TenantContext, WeekStart, format_date_or_default, is_date_format,
};
