//! Tenant repository: resolves the context every report runs under.

use chrono_tz::Tz;
use sea_orm::{DatabaseConnection, EntityTrait};
use tally_shared::types::{TenantId, is_date_format};
use tally_shared::{Currency, TenantContext};
use tracing::{instrument, warn};

use super::error::RepositoryError;
use crate::entities::companies;

/// Loads tenant contexts from the `companies` table.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    db: DatabaseConnection,
}

impl TenantRepository {
    /// Creates a new tenant repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads the context of one tenant.
    #[instrument(skip(self), err)]
    pub async fn load_context(
        &self,
        tenant_id: TenantId,
    ) -> Result<TenantContext, RepositoryError> {
        let company = companies::Entity::find_by_id(tenant_id.0)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::TenantNotFound(tenant_id))?;

        context_from_model(company)
    }
}

fn context_from_model(company: companies::Model) -> Result<TenantContext, RepositoryError> {
    let currency = Currency::new(&company.currency)
        .map_err(|err| RepositoryError::invalid("companies.currency", err))?;
    let time_zone: Tz = company
        .time_zone
        .parse()
        .map_err(|err| RepositoryError::invalid("companies.time_zone", err))?;

    let ctx = TenantContext::new(TenantId(company.id), currency, time_zone, company.locale);
    Ok(match company.date_format {
        Some(format) if format.trim().is_empty() => ctx,
        Some(format) if is_date_format(&format) => ctx.with_date_format(format),
        Some(format) => {
            warn!(
                tenant_id = %ctx.id,
                date_format = %format,
                "Unusable date format, keeping default"
            );
            ctx
        }
        None => ctx,
    })
}
