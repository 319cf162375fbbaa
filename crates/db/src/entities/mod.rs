//! `SeaORM` entities for the tables looked up by primary key.
//!
//! Aggregate report queries are raw statements (see
//! [`crate::repositories::report`]); only single-row lookups go through
//! entities.

pub mod companies;
pub mod payment_methods;
pub mod tax_rates;
