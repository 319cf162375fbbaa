//! Command-line arguments.

use clap::Parser;
use tally_core::{ReportKind, ReportParameters};
use tally_shared::types::TenantId;

/// Generate one report for one tenant and print it as JSON.
#[derive(Parser, Debug)]
#[command(name = "reporter", version, about)]
pub struct Args {
    /// Tenant (company) id.
    pub tenant: TenantId,

    /// Report kind, e.g. `cash_flow` or `ar_aging`.
    pub kind: ReportKind,

    /// Range start (YYYY-MM-DD).
    pub start: Option<String>,

    /// Range end (YYYY-MM-DD).
    pub end: Option<String>,

    /// Point-in-time date for aging (YYYY-MM-DD).
    #[arg(long)]
    pub as_of: Option<String>,

    /// Report currency; the tenant currency when omitted.
    #[arg(long)]
    pub currency: Option<String>,

    /// Report-specific grouping field.
    #[arg(long)]
    pub group_by: Option<String>,

    /// Invoice metadata filter, repeatable.
    #[arg(long = "invoice-meta", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub invoice_meta: Vec<(String, String)>,

    /// Customer metadata filter, repeatable.
    #[arg(long = "customer-meta", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub customer_meta: Vec<(String, String)>,
}

impl Args {
    /// Raw report parameters carried by the arguments.
    #[must_use]
    pub fn params(&self) -> ReportParameters {
        ReportParameters {
            start: self.start.clone(),
            end: self.end.clone(),
            as_of: self.as_of.clone(),
            currency: self.currency.clone(),
            group_by: self.group_by.clone(),
            invoice_metadata: self.invoice_meta.iter().cloned().collect(),
            customer_metadata: self.customer_meta.iter().cloned().collect(),
        }
    }
}

fn parse_pair(pair: &str) -> Result<(String, String), String> {
    pair.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {pair}"))
}
