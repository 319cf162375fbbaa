//! Report repository: the Postgres [`ReportDataSource`].
//!
//! Every statement binds the tenant id and report currency of its
//! [`DataScope`]; rows of other tenants are never read. Dates in a scope are
//! calendar dates in the tenant's time zone and are converted to half-open
//! UTC windows before they reach SQL.
//!
//! Tables read:
//!
//! - `customers(id, tenant_id, name, email, country, currency, balance, metadata, created_at)`
//! - `invoices(id, tenant_id, customer_id, number, date, due_date, currency, status,
//!   subtotal, total, balance, draft, paid, voided, metadata)`
//! - `payment_plan_installments(id, tenant_id, invoice_id, date, balance)`
//! - `payments(id, tenant_id, customer_id, invoice_id, date, method, currency, amount, voided)`
//! - `invoice_taxes(id, tenant_id, invoice_id, tax_rate_id, taxable, tax)`
//! - `ar_transactions(id, tenant_id, customer_id, invoice_id, date, kind, currency, amount)`
//! - `mrr_movements(id, tenant_id, customer_id, date, kind, currency, amount)`
//! - `ledgers(id, tenant_id)`, `ledger_entries(id, tenant_id, ledger_id, account, date,
//!   currency, amount)`
//!
//! Amounts are `bigint` minor units; A/R reductions are stored negative.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    Statement,
};
use tally_core::definition::ReportDefinition;
use tally_core::metrics::{MovementKind, MrrSnapshot};
use tally_core::reports::{
    ArActivity, DataScope, DefinitionRow, ExpectedPayment, MrrMovement, OpenInvoice, PaymentRow,
    ReportDataSource, TaxLine,
};
use tally_core::ReportError;
use tally_shared::types::{CustomerId, TaxRateId, TenantId};
use tally_shared::{Money, TenantContext};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::definition::{definition_statement, read_row};
use super::error::RepositoryError;
use super::statement::{StatementBuilder, day_end, day_start};
use crate::entities::{payment_methods, tax_rates};

/// Ledger account holding receivables.
const RECEIVABLES_ACCOUNT: &str = "accounts_receivable";

/// Reads report data for tenants of one time zone.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
    time_zone: Tz,
}

impl ReportRepository {
    /// Creates a repository interpreting dates in `time_zone`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, time_zone: Tz) -> Self {
        Self { db, time_zone }
    }

    /// Creates a repository for the tenant of a request.
    #[must_use]
    pub const fn for_tenant(db: DatabaseConnection, ctx: &TenantContext) -> Self {
        Self::new(db, ctx.time_zone)
    }

    fn start(&self, scope: &DataScope) -> DateTime<Utc> {
        day_start(self.time_zone, scope.range.start)
    }

    fn end(&self, scope: &DataScope) -> DateTime<Utc> {
        day_end(self.time_zone, scope.range.end)
    }

    fn money(scope: &DataScope, minor_units: i64) -> Money {
        Money::new(scope.currency, minor_units)
    }

    fn mrr_opening_statement(&self, scope: &DataScope) -> Statement {
        let mut sql = StatementBuilder::new(
            "SELECT COALESCE(SUM(t.mrr), 0)::bigint AS mrr, \
             COUNT(*) FILTER (WHERE t.mrr > 0) AS customers \
             FROM (SELECT m.customer_id, SUM(m.amount) AS mrr \
             FROM mrr_movements m \
             JOIN customers c ON c.id = m.customer_id AND c.tenant_id = m.tenant_id",
        );
        sql.push_tenant("m", scope)
            .push_bind(" AND m.date < ", self.start(scope))
            .push_metadata(&scope.filters, None, "c")
            .push(" GROUP BY m.customer_id) t");
        sql.build()
    }

    fn mrr_movements_statement(&self, scope: &DataScope) -> Statement {
        let mut sql = StatementBuilder::new(
            "SELECT m.date, m.customer_id, m.kind, m.amount \
             FROM mrr_movements m \
             JOIN customers c ON c.id = m.customer_id AND c.tenant_id = m.tenant_id",
        );
        sql.push_tenant("m", scope)
            .push_window("m.date", Some(self.start(scope)), self.end(scope))
            .push_metadata(&scope.filters, None, "c")
            .push(" ORDER BY m.date, m.id");
        sql.build()
    }

    fn expected_payments_statement(&self, scope: &DataScope) -> Statement {
        let mut sql = StatementBuilder::new(
            "SELECT p.date AS due, i.number AS invoice_number, c.name AS customer, \
             p.balance AS amount \
             FROM payment_plan_installments p \
             JOIN invoices i ON i.id = p.invoice_id AND i.tenant_id = p.tenant_id \
             JOIN customers c ON c.id = i.customer_id AND c.tenant_id = i.tenant_id",
        );
        sql.push_tenant("i", scope)
            .push_bind(" AND p.tenant_id = ", scope.tenant_id.0)
            .push(" AND p.balance > 0 AND NOT i.paid AND NOT i.voided AND NOT i.draft")
            .push_window("p.date", None, self.end(scope))
            .push_metadata(&scope.filters, Some("i"), "c")
            .push(" ORDER BY p.date, i.number");
        sql.build()
    }

    fn payments_statement(&self, scope: &DataScope) -> Statement {
        let mut sql = StatementBuilder::new(
            "SELECT p.date, p.method, p.amount \
             FROM payments p \
             JOIN customers c ON c.id = p.customer_id AND c.tenant_id = p.tenant_id \
             LEFT JOIN invoices i ON i.id = p.invoice_id AND i.tenant_id = p.tenant_id",
        );
        sql.push_tenant("p", scope)
            .push(" AND NOT p.voided")
            .push_window("p.date", Some(self.start(scope)), self.end(scope))
            .push_metadata(&scope.filters, Some("i"), "c")
            .push(" ORDER BY p.date, p.id");
        sql.build()
    }

    fn tax_lines_statement(&self, scope: &DataScope) -> Statement {
        let mut sql = StatementBuilder::new(
            "SELECT i.date, t.tax_rate_id, t.taxable, t.tax \
             FROM invoice_taxes t \
             JOIN invoices i ON i.id = t.invoice_id AND i.tenant_id = t.tenant_id \
             JOIN customers c ON c.id = i.customer_id AND c.tenant_id = i.tenant_id",
        );
        sql.push_tenant("i", scope)
            .push_bind(" AND t.tenant_id = ", scope.tenant_id.0)
            .push(" AND NOT i.voided AND NOT i.draft")
            .push_window("i.date", Some(self.start(scope)), self.end(scope))
            .push_metadata(&scope.filters, Some("i"), "c")
            .push(" ORDER BY i.date, t.id");
        sql.build()
    }

    fn open_invoices_statement(&self, scope: &DataScope) -> Statement {
        let mut sql = StatementBuilder::new(
            "SELECT i.number, c.name AS customer, i.due_date, SUM(a.amount)::bigint AS balance \
             FROM ar_transactions a \
             JOIN invoices i ON i.id = a.invoice_id AND i.tenant_id = a.tenant_id \
             JOIN customers c ON c.id = i.customer_id AND c.tenant_id = i.tenant_id",
        );
        sql.push_tenant("a", scope)
            .push_window("a.date", None, self.end(scope))
            .push_metadata(&scope.filters, Some("i"), "c")
            .push(
                " GROUP BY i.id, i.number, c.name, i.due_date \
                 HAVING SUM(a.amount) > 0 \
                 ORDER BY i.due_date, i.number",
            );
        sql.build()
    }

    fn ar_balance_statement(&self, scope: &DataScope, as_of: NaiveDate) -> Statement {
        let mut sql = StatementBuilder::new(
            "SELECT COALESCE(SUM(a.amount), 0)::bigint AS amount \
             FROM ar_transactions a \
             JOIN customers c ON c.id = a.customer_id AND c.tenant_id = a.tenant_id \
             LEFT JOIN invoices i ON i.id = a.invoice_id AND i.tenant_id = a.tenant_id",
        );
        sql.push_tenant("a", scope)
            .push_window("a.date", None, day_end(self.time_zone, as_of))
            .push_metadata(&scope.filters, Some("i"), "c");
        sql.build()
    }

    fn ar_activity_statement(&self, scope: &DataScope) -> Statement {
        let mut sql = StatementBuilder::new(
            "SELECT \
             COALESCE(SUM(a.amount) FILTER (WHERE a.kind = 'invoice'), 0)::bigint AS invoiced, \
             COALESCE(SUM(a.amount) FILTER (WHERE a.kind = 'payment'), 0)::bigint AS paid, \
             COALESCE(SUM(a.amount) FILTER (WHERE a.kind = 'credit_note'), 0)::bigint AS credit_notes, \
             COALESCE(SUM(a.amount) FILTER (WHERE a.kind = 'bad_debt'), 0)::bigint AS bad_debt, \
             COALESCE(SUM(a.amount) FILTER (WHERE a.kind = 'void'), 0)::bigint AS voided \
             FROM ar_transactions a \
             JOIN customers c ON c.id = a.customer_id AND c.tenant_id = a.tenant_id \
             LEFT JOIN invoices i ON i.id = a.invoice_id AND i.tenant_id = a.tenant_id",
        );
        sql.push_tenant("a", scope)
            .push_window("a.date", Some(self.start(scope)), self.end(scope))
            .push_metadata(&scope.filters, Some("i"), "c");
        sql.build()
    }

    fn ledger_balance_statement(&self, scope: &DataScope, as_of: NaiveDate) -> Statement {
        let mut sql = StatementBuilder::new(
            "SELECT COALESCE(SUM(e.amount), 0)::bigint AS amount \
             FROM ledger_entries e \
             JOIN ledgers l ON l.id = e.ledger_id AND l.tenant_id = e.tenant_id",
        );
        sql.push_tenant("e", scope)
            .push_bind(" AND e.account = ", RECEIVABLES_ACCOUNT.to_string())
            .push_window("e.date", None, day_end(self.time_zone, as_of));
        sql.build()
    }

    async fn sum(&self, statement: Statement) -> Result<i64, RepositoryError> {
        #[derive(Debug, FromQueryResult)]
        struct SumRow {
            amount: i64,
        }

        let row = SumRow::find_by_statement(statement).one(&self.db).await?;
        Ok(row.map_or(0, |r| r.amount))
    }

    async fn load_mrr_opening(&self, scope: &DataScope) -> Result<MrrSnapshot, RepositoryError> {
        #[derive(Debug, FromQueryResult)]
        struct OpeningRow {
            mrr: i64,
            customers: i64,
        }

        let row = OpeningRow::find_by_statement(self.mrr_opening_statement(scope))
            .one(&self.db)
            .await?;

        let (mrr, customers) = row.map_or((0, 0), |r| (r.mrr, r.customers));
        Ok(MrrSnapshot {
            mrr: Self::money(scope, mrr),
            customers,
        })
    }

    async fn load_mrr_movements(
        &self,
        scope: &DataScope,
    ) -> Result<Vec<MrrMovement>, RepositoryError> {
        #[derive(Debug, FromQueryResult)]
        struct MovementRow {
            date: DateTime<Utc>,
            customer_id: Uuid,
            kind: String,
            amount: i64,
        }

        let rows = MovementRow::find_by_statement(self.mrr_movements_statement(scope))
            .all(&self.db)
            .await?;

        rows.into_iter()
            .map(|row| {
                let kind = MovementKind::from_str(&row.kind)
                    .map_err(|err| RepositoryError::invalid("mrr_movements.kind", err))?;
                Ok(MrrMovement {
                    date: row.date,
                    customer_id: CustomerId(row.customer_id),
                    kind,
                    amount: Self::money(scope, row.amount),
                })
            })
            .collect()
    }

    async fn load_expected_payments(
        &self,
        scope: &DataScope,
    ) -> Result<Vec<ExpectedPayment>, RepositoryError> {
        #[derive(Debug, FromQueryResult)]
        struct InstallmentRow {
            due: DateTime<Utc>,
            invoice_number: String,
            customer: String,
            amount: i64,
        }

        let rows = InstallmentRow::find_by_statement(self.expected_payments_statement(scope))
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ExpectedPayment {
                due: row.due,
                invoice_number: row.invoice_number,
                customer: row.customer,
                amount: Self::money(scope, row.amount),
            })
            .collect())
    }

    async fn load_payments(&self, scope: &DataScope) -> Result<Vec<PaymentRow>, RepositoryError> {
        #[derive(Debug, FromQueryResult)]
        struct PaymentRecord {
            date: DateTime<Utc>,
            method: String,
            amount: i64,
        }

        let rows = PaymentRecord::find_by_statement(self.payments_statement(scope))
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| PaymentRow {
                date: row.date,
                method: row.method,
                amount: Self::money(scope, row.amount),
            })
            .collect())
    }

    async fn load_tax_lines(&self, scope: &DataScope) -> Result<Vec<TaxLine>, RepositoryError> {
        #[derive(Debug, FromQueryResult)]
        struct TaxRow {
            date: DateTime<Utc>,
            tax_rate_id: Uuid,
            taxable: i64,
            tax: i64,
        }

        let rows = TaxRow::find_by_statement(self.tax_lines_statement(scope))
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| TaxLine {
                date: row.date,
                tax_rate_id: TaxRateId(row.tax_rate_id),
                taxable: Self::money(scope, row.taxable),
                tax: Self::money(scope, row.tax),
            })
            .collect())
    }

    async fn load_open_invoices(
        &self,
        scope: &DataScope,
    ) -> Result<Vec<OpenInvoice>, RepositoryError> {
        #[derive(Debug, FromQueryResult)]
        struct OpenRow {
            number: String,
            customer: String,
            due_date: NaiveDate,
            balance: i64,
        }

        let rows = OpenRow::find_by_statement(self.open_invoices_statement(scope))
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| OpenInvoice {
                number: row.number,
                customer: row.customer,
                due_date: row.due_date,
                balance: Self::money(scope, row.balance),
            })
            .collect())
    }

    async fn load_ar_activity(&self, scope: &DataScope) -> Result<ArActivity, RepositoryError> {
        #[derive(Debug, FromQueryResult)]
        struct ActivityRow {
            invoiced: i64,
            paid: i64,
            credit_notes: i64,
            bad_debt: i64,
            voided: i64,
        }

        let row = ActivityRow::find_by_statement(self.ar_activity_statement(scope))
            .one(&self.db)
            .await?;

        Ok(row.map_or_else(
            || ArActivity::zero(scope.currency),
            |row| ArActivity {
                invoiced: Self::money(scope, row.invoiced),
                paid: Self::money(scope, row.paid),
                credit_notes: Self::money(scope, row.credit_notes),
                bad_debt: Self::money(scope, row.bad_debt),
                voided: Self::money(scope, row.voided),
            },
        ))
    }

    async fn load_has_ledger(&self, tenant_id: TenantId) -> Result<bool, RepositoryError> {
        #[derive(Debug, FromQueryResult)]
        struct PresenceRow {
            present: bool,
        }

        let mut sql = StatementBuilder::new("SELECT EXISTS (SELECT 1 FROM ledgers l");
        sql.push_bind(" WHERE l.tenant_id = ", tenant_id.0)
            .push(") AS present");

        let row = PresenceRow::find_by_statement(sql.build())
            .one(&self.db)
            .await?;
        Ok(row.is_some_and(|r| r.present))
    }

    async fn load_payment_method_name(
        &self,
        tenant_id: TenantId,
        method: &str,
    ) -> Result<String, RepositoryError> {
        let found = payment_methods::Entity::find()
            .filter(payment_methods::Column::TenantId.eq(tenant_id.0))
            .filter(payment_methods::Column::Id.eq(method))
            .one(&self.db)
            .await?;

        Ok(found.map_or_else(
            || {
                debug!(method, "Payment method has no custom name");
                method.to_string()
            },
            |m| m.name,
        ))
    }

    async fn load_tax_rate_name(
        &self,
        tenant_id: TenantId,
        tax_rate_id: TaxRateId,
    ) -> Result<String, RepositoryError> {
        tax_rates::Entity::find_by_id(tax_rate_id.0)
            .filter(tax_rates::Column::TenantId.eq(tenant_id.0))
            .one(&self.db)
            .await?
            .map(|rate| rate.name)
            .ok_or(RepositoryError::TaxRateNotFound(tax_rate_id))
    }

    async fn load_rows(
        &self,
        scope: &DataScope,
        definition: &ReportDefinition,
    ) -> Result<Vec<DefinitionRow>, RepositoryError> {
        let statement = definition_statement(
            scope,
            definition,
            self.time_zone,
            (self.start(scope), self.end(scope)),
        )?;
        let columns = definition.output_columns();

        self.db
            .query_all(statement)
            .await?
            .iter()
            .map(|row| read_row(row, &columns, scope.currency))
            .collect()
    }
}

#[async_trait]
impl ReportDataSource for ReportRepository {
    #[instrument(skip_all, fields(tenant_id = %scope.tenant_id), err)]
    async fn mrr_opening(&self, scope: &DataScope) -> Result<MrrSnapshot, ReportError> {
        Ok(self.load_mrr_opening(scope).await?)
    }

    #[instrument(skip_all, fields(tenant_id = %scope.tenant_id), err)]
    async fn mrr_movements(&self, scope: &DataScope) -> Result<Vec<MrrMovement>, ReportError> {
        Ok(self.load_mrr_movements(scope).await?)
    }

    #[instrument(skip_all, fields(tenant_id = %scope.tenant_id), err)]
    async fn expected_payments(
        &self,
        scope: &DataScope,
    ) -> Result<Vec<ExpectedPayment>, ReportError> {
        Ok(self.load_expected_payments(scope).await?)
    }

    #[instrument(skip_all, fields(tenant_id = %scope.tenant_id), err)]
    async fn payments(&self, scope: &DataScope) -> Result<Vec<PaymentRow>, ReportError> {
        Ok(self.load_payments(scope).await?)
    }

    async fn payment_method_name(
        &self,
        tenant_id: TenantId,
        method: &str,
    ) -> Result<String, ReportError> {
        Ok(self.load_payment_method_name(tenant_id, method).await?)
    }

    #[instrument(skip_all, fields(tenant_id = %scope.tenant_id), err)]
    async fn tax_lines(&self, scope: &DataScope) -> Result<Vec<TaxLine>, ReportError> {
        Ok(self.load_tax_lines(scope).await?)
    }

    async fn tax_rate_name(
        &self,
        tenant_id: TenantId,
        tax_rate_id: TaxRateId,
    ) -> Result<String, ReportError> {
        Ok(self.load_tax_rate_name(tenant_id, tax_rate_id).await?)
    }

    #[instrument(skip_all, fields(tenant_id = %scope.tenant_id), err)]
    async fn open_invoices(&self, scope: &DataScope) -> Result<Vec<OpenInvoice>, ReportError> {
        Ok(self.load_open_invoices(scope).await?)
    }

    #[instrument(skip_all, fields(tenant_id = %scope.tenant_id, as_of = %as_of), err)]
    async fn ar_balance(&self, scope: &DataScope, as_of: NaiveDate) -> Result<Money, ReportError> {
        let amount = self.sum(self.ar_balance_statement(scope, as_of)).await?;
        Ok(Self::money(scope, amount))
    }

    #[instrument(skip_all, fields(tenant_id = %scope.tenant_id), err)]
    async fn ar_activity(&self, scope: &DataScope) -> Result<ArActivity, ReportError> {
        Ok(self.load_ar_activity(scope).await?)
    }

    async fn has_ledger(&self, tenant_id: TenantId) -> Result<bool, ReportError> {
        Ok(self.load_has_ledger(tenant_id).await?)
    }

    #[instrument(skip_all, fields(tenant_id = %scope.tenant_id, as_of = %as_of), err)]
    async fn ledger_balance(
        &self,
        scope: &DataScope,
        as_of: NaiveDate,
    ) -> Result<Money, ReportError> {
        let amount = self.sum(self.ledger_balance_statement(scope, as_of)).await?;
        Ok(Self::money(scope, amount))
    }

    #[instrument(
        skip_all,
        fields(tenant_id = %scope.tenant_id, object = ?definition.object()),
        err
    )]
    async fn fetch_rows(
        &self,
        scope: &DataScope,
        definition: &ReportDefinition,
    ) -> Result<Vec<DefinitionRow>, ReportError> {
        Ok(self.load_rows(scope, definition).await?)
    }
}
