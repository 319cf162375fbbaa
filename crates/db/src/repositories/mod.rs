//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the report engine.

pub mod definition;
pub mod error;
pub mod report;
pub mod statement;
pub mod tenant;

pub use error::RepositoryError;
pub use report::ReportRepository;
pub use tenant::TenantRepository;
