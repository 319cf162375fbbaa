//! In-memory data source for report tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tally_shared::types::{TaxRateId, TenantId};
use tally_shared::{Currency, Money};

use super::error::ReportError;
use super::source::{
    ArActivity, DefinitionRow, ExpectedPayment, MrrMovement, OpenInvoice, PaymentRow,
    ReportDataSource, TaxLine,
};
use super::types::DataScope;
use crate::definition::ReportDefinition;
use crate::metrics::MrrSnapshot;

/// Canned rows for one tenant. Calls for any other tenant return nothing.
pub struct FakeSource {
    pub tenant_id: TenantId,
    pub currency: Currency,
    pub opening: Option<MrrSnapshot>,
    pub movements: Vec<MrrMovement>,
    pub expected: Vec<ExpectedPayment>,
    pub payments: Vec<PaymentRow>,
    pub method_names: HashMap<String, String>,
    pub tax_lines: Vec<TaxLine>,
    pub tax_rate_names: HashMap<TaxRateId, String>,
    pub open_invoices: Vec<OpenInvoice>,
    pub balances: HashMap<NaiveDate, Money>,
    pub activity: Option<ArActivity>,
    pub ledger: Option<Money>,
    pub rows: Vec<DefinitionRow>,
    pub fetches: AtomicUsize,
    pub name_lookups: AtomicUsize,
    pub last_definition: std::sync::Mutex<Option<ReportDefinition>>,
}

impl FakeSource {
    pub fn new(tenant_id: TenantId, currency: Currency) -> Self {
        Self {
            tenant_id,
            currency,
            opening: None,
            movements: Vec::new(),
            expected: Vec::new(),
            payments: Vec::new(),
            method_names: HashMap::new(),
            tax_lines: Vec::new(),
            tax_rate_names: HashMap::new(),
            open_invoices: Vec::new(),
            balances: HashMap::new(),
            activity: None,
            ledger: None,
            rows: Vec::new(),
            fetches: AtomicUsize::new(0),
            name_lookups: AtomicUsize::new(0),
            last_definition: std::sync::Mutex::new(None),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn name_lookups(&self) -> usize {
        self.name_lookups.load(Ordering::SeqCst)
    }

    fn owns(&self, tenant_id: TenantId) -> bool {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tenant_id == self.tenant_id
    }

    fn scoped<T: Clone>(&self, scope: &DataScope, rows: &[T]) -> Vec<T> {
        if self.owns(scope.tenant_id) {
            rows.to_vec()
        } else {
            Vec::new()
        }
    }

    fn zero(&self) -> Money {
        Money::zero(self.currency)
    }
}

#[async_trait]
impl ReportDataSource for FakeSource {
    async fn mrr_opening(&self, scope: &DataScope) -> Result<MrrSnapshot, ReportError> {
        let empty = MrrSnapshot {
            mrr: self.zero(),
            customers: 0,
        };
        Ok(if self.owns(scope.tenant_id) {
            self.opening.unwrap_or(empty)
        } else {
            empty
        })
    }

    async fn mrr_movements(&self, scope: &DataScope) -> Result<Vec<MrrMovement>, ReportError> {
        Ok(self.scoped(scope, &self.movements))
    }

    async fn expected_payments(
        &self,
        scope: &DataScope,
    ) -> Result<Vec<ExpectedPayment>, ReportError> {
        Ok(self.scoped(scope, &self.expected))
    }

    async fn payments(&self, scope: &DataScope) -> Result<Vec<PaymentRow>, ReportError> {
        Ok(self.scoped(scope, &self.payments))
    }

    async fn payment_method_name(
        &self,
        _tenant_id: TenantId,
        method: &str,
    ) -> Result<String, ReportError> {
        self.name_lookups.fetch_add(1, Ordering::SeqCst);
        self.method_names
            .get(method)
            .cloned()
            .ok_or_else(|| ReportError::DataSource(format!("no payment method {method}")))
    }

    async fn tax_lines(&self, scope: &DataScope) -> Result<Vec<TaxLine>, ReportError> {
        Ok(self.scoped(scope, &self.tax_lines))
    }

    async fn tax_rate_name(
        &self,
        _tenant_id: TenantId,
        tax_rate_id: TaxRateId,
    ) -> Result<String, ReportError> {
        self.name_lookups.fetch_add(1, Ordering::SeqCst);
        self.tax_rate_names
            .get(&tax_rate_id)
            .cloned()
            .ok_or_else(|| ReportError::DataSource(format!("no tax rate {tax_rate_id}")))
    }

    async fn open_invoices(&self, scope: &DataScope) -> Result<Vec<OpenInvoice>, ReportError> {
        Ok(self.scoped(scope, &self.open_invoices))
    }

    async fn ar_balance(&self, scope: &DataScope, as_of: NaiveDate) -> Result<Money, ReportError> {
        if !self.owns(scope.tenant_id) {
            return Ok(self.zero());
        }
        Ok(self.balances.get(&as_of).copied().unwrap_or_else(|| self.zero()))
    }

    async fn ar_activity(&self, scope: &DataScope) -> Result<ArActivity, ReportError> {
        let empty = ArActivity::zero(self.currency);
        Ok(if self.owns(scope.tenant_id) {
            self.activity.unwrap_or(empty)
        } else {
            empty
        })
    }

    async fn has_ledger(&self, tenant_id: TenantId) -> Result<bool, ReportError> {
        Ok(self.owns(tenant_id) && self.ledger.is_some())
    }

    async fn ledger_balance(
        &self,
        scope: &DataScope,
        _as_of: NaiveDate,
    ) -> Result<Money, ReportError> {
        if !self.owns(scope.tenant_id) {
            return Ok(self.zero());
        }
        Ok(self.ledger.unwrap_or_else(|| self.zero()))
    }

    async fn fetch_rows(
        &self,
        scope: &DataScope,
        definition: &ReportDefinition,
    ) -> Result<Vec<DefinitionRow>, ReportError> {
        if let Ok(mut last) = self.last_definition.lock() {
            *last = Some(definition.clone());
        }
        Ok(self.scoped(scope, &self.rows))
    }
}
