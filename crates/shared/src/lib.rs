//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Money values in integer minor units, tagged with an ISO 4217 currency
//! - Typed IDs for type-safe entity references
//! - The tenant context every report computation is scoped to
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::AppError;
pub use types::{Currency, Money, MoneyError, TenantContext, WeekStart};
