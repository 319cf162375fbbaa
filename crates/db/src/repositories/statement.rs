//! Parameterised Postgres statement assembly.
//!
//! User-supplied values only ever reach SQL as bound parameters; the SQL text
//! itself is assembled from fixed fragments.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use sea_orm::{DbBackend, Statement, Value};
use tally_core::definition::{MetadataFilter, MetadataScope};
use tally_core::reports::DataScope;
use tracing::debug;

/// Appends SQL fragments and their bound values.
#[derive(Debug, Default)]
pub struct StatementBuilder {
    sql: String,
    values: Vec<Value>,
}

impl StatementBuilder {
    /// Starts a statement with a fixed fragment.
    #[must_use]
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            values: Vec::new(),
        }
    }

    /// Appends a fixed fragment.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Binds a value and returns its placeholder.
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }

    /// Appends a fixed fragment followed by the placeholder of a new value.
    pub fn push_bind(&mut self, sql: &str, value: impl Into<Value>) -> &mut Self {
        let placeholder = self.bind(value);
        self.sql.push_str(sql);
        self.sql.push_str(&placeholder);
        self
    }

    /// SQL text assembled so far.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Finishes the statement.
    #[must_use]
    pub fn build(self) -> Statement {
        Statement::from_sql_and_values(DbBackend::Postgres, self.sql, self.values)
    }

    /// Restricts rows to the scope's tenant and currency.
    ///
    /// `alias` names the table carrying `tenant_id` and `currency`.
    pub fn push_tenant(&mut self, alias: &str, scope: &DataScope) -> &mut Self {
        self.push_bind(&format!(" WHERE {alias}.tenant_id = "), scope.tenant_id.0)
            .push_bind(&format!(" AND {alias}.currency = "), scope.currency.code().to_string())
    }

    /// Restricts `column` to the half-open instant window `[from, to)`.
    pub fn push_window(
        &mut self,
        column: &str,
        from: Option<DateTime<Utc>>,
        to: DateTime<Utc>,
    ) -> &mut Self {
        if let Some(from) = from {
            self.push_bind(&format!(" AND {column} >= "), from);
        }
        self.push_bind(&format!(" AND {column} < "), to)
    }

    /// Applies metadata filters to the invoice and customer aliases in scope.
    ///
    /// Invoice filters are skipped when the query has no invoice alias.
    pub fn push_metadata(
        &mut self,
        filters: &[MetadataFilter],
        invoice: Option<&str>,
        customer: &str,
    ) -> &mut Self {
        for filter in filters {
            let alias = match filter.scope() {
                MetadataScope::Invoice => invoice,
                MetadataScope::Customer => Some(customer),
            };
            let Some(alias) = alias else {
                debug!(key = filter.key(), "Invoice metadata filter has no invoice to match");
                continue;
            };
            self.push_bind(&format!(" AND {alias}.metadata ->> "), filter.key().to_string())
                .push_bind(" = ", filter.value().to_string());
        }
        self
    }
}

/// The UTC instant at which `date` begins in `tz`.
#[must_use]
pub fn day_start(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map_or_else(|| Utc.from_utc_datetime(&midnight), |t| t.with_timezone(&Utc))
}

/// The UTC instant at which the day after `date` begins in `tz`.
#[must_use]
pub fn day_end(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    match date.succ_opt() {
        Some(next) => day_start(tz, next),
        None => DateTime::<Utc>::MAX_UTC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::reports::DateRange;
    use tally_shared::Currency;
    use tally_shared::types::TenantId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scope(filters: Vec<MetadataFilter>) -> DataScope {
        DataScope {
            tenant_id: TenantId::new(),
            currency: Currency::EUR,
            range: DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap(),
            filters,
        }
    }

    #[test]
    fn test_placeholders_are_numbered_in_order() {
        let scope = scope(Vec::new());
        let mut builder = StatementBuilder::new("SELECT 1 FROM invoices i");
        builder.push_tenant("i", &scope);
        let statement = builder.build();

        assert_eq!(
            statement.sql,
            "SELECT 1 FROM invoices i WHERE i.tenant_id = $1 AND i.currency = $2"
        );
        let values = statement.values.unwrap().0;
        assert_eq!(values[0], Value::from(scope.tenant_id.0));
        assert_eq!(values[1], Value::from("EUR".to_string()));
    }

    #[test]
    fn test_metadata_values_are_bound_not_inlined() {
        let filter =
            MetadataFilter::new(MetadataScope::Customer, "region", "x' OR '1'='1").unwrap();
        let scope = scope(vec![filter]);
        let mut builder = StatementBuilder::new("SELECT 1 FROM customers c");
        builder
            .push_tenant("c", &scope)
            .push_metadata(&scope.filters, None, "c");

        assert!(builder.sql().ends_with("AND c.metadata ->> $3 = $4"));
        assert!(!builder.sql().contains("OR"));
    }

    #[test]
    fn test_invoice_filter_without_invoice_alias_is_skipped() {
        let filter = MetadataFilter::new(MetadataScope::Invoice, "po", "42").unwrap();
        let mut builder = StatementBuilder::new("SELECT 1");
        builder.push_metadata(&[filter], None, "c");
        assert_eq!(builder.sql(), "SELECT 1");
    }

    #[test]
    fn test_day_bounds_follow_tenant_time_zone() {
        let tz = chrono_tz::America::New_York;
        let start = day_start(tz, date(2024, 1, 15));
        let end = day_end(tz, date(2024, 1, 15));

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 16, 5, 0, 0).unwrap());
    }
}
