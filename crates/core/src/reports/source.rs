//! The seam between reports and the relational store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{CustomerId, TaxRateId, TenantId};
use tally_shared::{Money, MoneyError};

use super::error::ReportError;
use super::types::DataScope;
use crate::classify::DatedEvent;
use crate::definition::ReportDefinition;
use crate::document::Cell;
use crate::metrics::{MovementKind, MrrSnapshot};

/// Metadata key carrying the movement kind on classified MRR events.
pub const KIND: &str = "kind";

/// One MRR movement of one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrrMovement {
    /// When the movement took effect.
    pub date: DateTime<Utc>,
    /// Customer concerned.
    pub customer_id: CustomerId,
    /// Kind of movement.
    pub kind: MovementKind,
    /// Signed MRR change.
    pub amount: Money,
}

impl From<&MrrMovement> for DatedEvent {
    fn from(row: &MrrMovement) -> Self {
        Self::new(row.date)
            .with_amount(row.amount)
            .with_metadata(KIND, row.kind.as_str())
            .with_metadata("customer_id", row.customer_id.to_string())
    }
}

/// Open installment expected to be paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedPayment {
    /// When the installment is due.
    pub due: DateTime<Utc>,
    /// Invoice number.
    pub invoice_number: String,
    /// Customer name.
    pub customer: String,
    /// Balance still to collect.
    pub amount: Money,
}

/// Received payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRow {
    /// When the payment was received.
    pub date: DateTime<Utc>,
    /// Payment method id (e.g. `credit_card`).
    pub method: String,
    /// Amount received.
    pub amount: Money,
}

/// Tax charged on one invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLine {
    /// Invoice date.
    pub date: DateTime<Utc>,
    /// Tax rate applied.
    pub tax_rate_id: TaxRateId,
    /// Amount the rate applied to.
    pub taxable: Money,
    /// Tax charged.
    pub tax: Money,
}

/// Unpaid invoice at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInvoice {
    /// Invoice number.
    pub number: String,
    /// Customer name.
    pub customer: String,
    /// Due date.
    pub due_date: NaiveDate,
    /// Outstanding balance.
    pub balance: Money,
}

/// A/R activity over a range. Reductions are negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArActivity {
    /// Invoices issued.
    pub invoiced: Money,
    /// Payments applied (negative).
    pub paid: Money,
    /// Credit notes issued (negative).
    pub credit_notes: Money,
    /// Amounts written off (negative).
    pub bad_debt: Money,
    /// Invoices voided (negative).
    pub voided: Money,
}

impl ArActivity {
    /// No activity.
    #[must_use]
    pub const fn zero(currency: tally_shared::Currency) -> Self {
        Self {
            invoiced: Money::zero(currency),
            paid: Money::zero(currency),
            credit_notes: Money::zero(currency),
            bad_debt: Money::zero(currency),
            voided: Money::zero(currency),
        }
    }

    /// Net change in A/R.
    pub fn net(&self) -> Result<Money, MoneyError> {
        Money::sum(
            self.invoiced.currency,
            [
                &self.invoiced,
                &self.paid,
                &self.credit_notes,
                &self.bad_debt,
                &self.voided,
            ],
        )
    }
}

/// One row of a definition query, aligned with
/// [`ReportDefinition::output_columns`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRow {
    /// Cell per output column.
    pub cells: Vec<Cell>,
}

/// Read access to a tenant's A/R data.
///
/// Every method is scoped to `scope.tenant_id` (or the given tenant) and
/// must never return another tenant's rows. Row collections come back
/// sorted ascending by date where they have one.
#[async_trait]
pub trait ReportDataSource: Send + Sync {
    /// MRR and active customers at the end of the day before `scope.range.start`.
    async fn mrr_opening(&self, scope: &DataScope) -> Result<MrrSnapshot, ReportError>;

    /// MRR movements within the range.
    async fn mrr_movements(&self, scope: &DataScope) -> Result<Vec<MrrMovement>, ReportError>;

    /// Open installments due on or before the range end, including overdue ones.
    async fn expected_payments(&self, scope: &DataScope)
    -> Result<Vec<ExpectedPayment>, ReportError>;

    /// Payments received within the range.
    async fn payments(&self, scope: &DataScope) -> Result<Vec<PaymentRow>, ReportError>;

    /// Display name of a payment method.
    async fn payment_method_name(
        &self,
        tenant_id: TenantId,
        method: &str,
    ) -> Result<String, ReportError>;

    /// Taxed invoice lines within the range.
    async fn tax_lines(&self, scope: &DataScope) -> Result<Vec<TaxLine>, ReportError>;

    /// Display name of a tax rate.
    async fn tax_rate_name(
        &self,
        tenant_id: TenantId,
        tax_rate_id: TaxRateId,
    ) -> Result<String, ReportError>;

    /// Invoices with an outstanding balance at the end of `scope.range.end`.
    async fn open_invoices(&self, scope: &DataScope) -> Result<Vec<OpenInvoice>, ReportError>;

    /// Total A/R balance at the end of `as_of`.
    async fn ar_balance(&self, scope: &DataScope, as_of: NaiveDate) -> Result<Money, ReportError>;

    /// A/R activity within the range.
    async fn ar_activity(&self, scope: &DataScope) -> Result<ArActivity, ReportError>;

    /// Returns true if the tenant has an A/R ledger.
    async fn has_ledger(&self, tenant_id: TenantId) -> Result<bool, ReportError>;

    /// Ledger A/R account balance at the end of `as_of`.
    async fn ledger_balance(&self, scope: &DataScope, as_of: NaiveDate)
    -> Result<Money, ReportError>;

    /// Executes a report definition.
    async fn fetch_rows(
        &self,
        scope: &DataScope,
        definition: &ReportDefinition,
    ) -> Result<Vec<DefinitionRow>, ReportError>;
}
