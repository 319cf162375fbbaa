//! Database layer for Tally reports.
//!
//! This crate provides:
//! - `SeaORM` entities for the lookup tables (companies, tax rates, payment methods)
//! - [`ReportRepository`], the Postgres implementation of
//!   [`tally_core::ReportDataSource`]
//! - [`TenantRepository`], which loads the tenant context of a request

pub mod entities;
pub mod repositories;

pub use repositories::{ReportRepository, RepositoryError, TenantRepository};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tally_shared::config::DatabaseConfig;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}
