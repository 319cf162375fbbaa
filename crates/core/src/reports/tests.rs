//! Report generation tests against an in-memory data source.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal_macros::dec;
use tally_shared::config::ReportsConfig;
use tally_shared::types::{CustomerId, TaxRateId, TenantId};
use tally_shared::{Currency, Money, MoneyError, TenantContext};

use super::fake::FakeSource;
use super::invoice_summary::InvoiceSummaryReport;
use super::*;
use crate::definition::FieldKind;
use crate::document::{Cell, ChartType, DocumentError, Group, ReportDocument, TableGroup};
use crate::metrics::{MovementKind, MrrSnapshot};

fn usd(units: i64) -> Money {
    Money::new(Currency::USD, units)
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tenant() -> TenantContext {
    TenantContext::new(TenantId::new(), Currency::USD, Tz::UTC, "en_US")
}

fn movement(when: DateTime<Utc>, kind: MovementKind, units: i64) -> MrrMovement {
    MrrMovement {
        date: when,
        customer_id: CustomerId::new(),
        kind,
        amount: usd(units),
    }
}

fn service() -> ReportService {
    ReportService::new(ReportsConfig::default())
}

async fn generate(
    ctx: &TenantContext,
    kind: ReportKind,
    params: &ReportParameters,
    source: &FakeSource,
) -> Result<ReportDocument, ReportError> {
    service().generate(ctx, kind, params, source).await
}

fn table<'a>(doc: &'a ReportDocument, section: &str) -> &'a TableGroup {
    doc.section(section)
        .and_then(|s| {
            s.groups.iter().find_map(|g| match g {
                Group::Table(t) => Some(t),
                _ => None,
            })
        })
        .unwrap_or_else(|| panic!("no table in section {section}"))
}

fn pairs<'a>(doc: &'a ReportDocument, section: &str) -> &'a [(String, Cell)] {
    doc.section(section)
        .and_then(|s| {
            s.groups.iter().find_map(|g| match g {
                Group::KeyValue(kv) => Some(kv.pairs.as_slice()),
                _ => None,
            })
        })
        .unwrap_or_else(|| panic!("no key-value group in section {section}"))
}

fn value<'a>(pairs: &'a [(String, Cell)], label: &str) -> &'a Cell {
    &pairs
        .iter()
        .find(|(l, _)| l == label)
        .unwrap_or_else(|| panic!("no pair {label}"))
        .1
}

/// Opening 10000 MRR and 100 customers; 4 new, 1 reactivated and 5 lost
/// customers take MRR to 12000 with 100 customers.
fn lifetime_value_source(ctx: &TenantContext) -> FakeSource {
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.opening = Some(MrrSnapshot {
        mrr: usd(10000),
        customers: 100,
    });
    for day in 1..=4 {
        source.movements.push(movement(at(2024, 3, day), MovementKind::New, 625));
    }
    source
        .movements
        .push(movement(at(2024, 3, 10), MovementKind::Reactivation, 500));
    for day in 20..25 {
        source.movements.push(movement(at(2024, 3, day), MovementKind::Lost, -200));
    }
    source
}

#[tokio::test]
async fn test_lifetime_value_scenario() {
    let ctx = tenant();
    let source = lifetime_value_source(&ctx);
    let params = ReportParameters::between("2024-03-01", "2024-03-31");

    let doc = generate(&ctx, ReportKind::LifetimeValue, &params, &source)
        .await
        .unwrap();

    let rows = &table(&doc, "Monthly Lifetime Value").rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0],
        vec![
            Cell::from("Mar 2024"),
            Cell::Money(usd(12000)),
            Cell::Integer(100),
            Cell::Percent(dec!(4)),
            Cell::Money(usd(120)),
            Cell::Money(usd(3000)),
        ]
    );
}

#[tokio::test]
async fn test_lifetime_value_without_churn_assumes_36_months() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.opening = Some(MrrSnapshot {
        mrr: usd(10000),
        customers: 100,
    });
    source
        .movements
        .push(movement(at(2024, 3, 5), MovementKind::Expansion, 2000));
    let params = ReportParameters::between("2024-03-01", "2024-03-31");

    let doc = generate(&ctx, ReportKind::LifetimeValue, &params, &source)
        .await
        .unwrap();

    let summary = pairs(&doc, "Summary");
    assert_eq!(value(summary, "ARPU"), &Cell::Money(usd(120)));
    assert_eq!(value(summary, "Lifetime Value"), &Cell::Money(usd(4320)));
}

#[tokio::test]
async fn test_net_revenue_retention_scenario() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.opening = Some(MrrSnapshot {
        mrr: usd(10000),
        customers: 50,
    });
    source.movements = vec![
        movement(at(2024, 3, 2), MovementKind::Expansion, 500),
        movement(at(2024, 3, 3), MovementKind::Reactivation, 200),
        movement(at(2024, 3, 4), MovementKind::Contraction, -300),
        movement(at(2024, 3, 5), MovementKind::Lost, -400),
    ];
    let params = ReportParameters::between("2024-03-01", "2024-03-31");

    let doc = generate(&ctx, ReportKind::NetRevenueRetention, &params, &source)
        .await
        .unwrap();

    let row = &table(&doc, "Net Revenue Retention").rows[0];
    assert_eq!(row[1], Cell::Money(usd(10000)));
    assert_eq!(row[6], Cell::Percent(dec!(100)));
}

#[tokio::test]
async fn test_subscriber_count_runs_oldest_to_newest_and_displays_newest_first() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.opening = Some(MrrSnapshot {
        mrr: usd(10000),
        customers: 10,
    });
    source.movements = vec![
        movement(at(2024, 1, 3), MovementKind::New, 1000),
        movement(at(2024, 1, 4), MovementKind::New, 1000),
        movement(at(2024, 1, 5), MovementKind::New, 1000),
        movement(at(2024, 2, 9), MovementKind::Lost, -1000),
        movement(at(2024, 3, 1), MovementKind::Reactivation, 1000),
        movement(at(2024, 3, 2), MovementKind::New, 1000),
        movement(at(2024, 3, 3), MovementKind::New, 1000),
    ];
    let params = ReportParameters::between("2024-01-01", "2024-03-31");

    let doc = generate(&ctx, ReportKind::SubscriberCount, &params, &source)
        .await
        .unwrap();

    let totals: Vec<(&Cell, &Cell)> = table(&doc, "Subscribers")
        .rows
        .iter()
        .map(|row| (&row[0], &row[5]))
        .collect();
    assert_eq!(
        totals,
        vec![
            (&Cell::from("Mar 2024"), &Cell::Integer(15)),
            (&Cell::from("Feb 2024"), &Cell::Integer(12)),
            (&Cell::from("Jan 2024"), &Cell::Integer(13)),
        ]
    );
}

#[tokio::test]
async fn test_mrr_movements_blank_zero_cells_and_total_footer() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.opening = Some(MrrSnapshot {
        mrr: usd(5000),
        customers: 5,
    });
    source.movements = vec![
        movement(at(2024, 1, 10), MovementKind::New, 1000),
        movement(at(2024, 2, 10), MovementKind::Contraction, -250),
    ];
    let params = ReportParameters::between("2024-01-01", "2024-02-29");

    let doc = generate(&ctx, ReportKind::MrrMovements, &params, &source)
        .await
        .unwrap();

    let table = table(&doc, "MRR Movements");
    // Feb is shown first; it had no new business.
    assert_eq!(table.rows[0][2], Cell::Empty);
    assert_eq!(table.rows[0][5], Cell::Money(usd(-250)));
    assert_eq!(table.rows[0][7], Cell::Money(usd(5750)));

    let footer = table.footer.as_ref().unwrap();
    assert_eq!(footer[1], Cell::Money(usd(5000)));
    assert_eq!(footer[2], Cell::Money(usd(1000)));
    assert_eq!(footer[7], Cell::Money(usd(5750)));
}

#[tokio::test]
async fn test_subscription_churn_guards_zero_previous_month() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.movements = vec![movement(at(2024, 1, 10), MovementKind::New, 1000)];
    let params = ReportParameters::between("2024-01-01", "2024-01-31");

    let doc = generate(&ctx, ReportKind::SubscriptionChurn, &params, &source)
        .await
        .unwrap();

    let row = &table(&doc, "Churn").rows[0];
    assert_eq!(row[3], Cell::Percent(dec!(0)));
    assert_eq!(row[5], Cell::Percent(dec!(0)));
}

#[tokio::test]
async fn test_mrr_in_another_currency_is_a_hard_failure() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.opening = Some(MrrSnapshot {
        mrr: Money::new(Currency::EUR, 10000),
        customers: 10,
    });
    source.movements = vec![movement(at(2024, 1, 10), MovementKind::New, 1000)];
    let params = ReportParameters::between("2024-01-01", "2024-01-31");

    let err = generate(&ctx, ReportKind::MrrMovements, &params, &source)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReportError::Money(MoneyError::CurrencyMismatch { .. })
    ));
}

#[tokio::test]
async fn test_cash_flow_folds_overdue_into_first_week_and_month() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.expected = vec![
        ExpectedPayment {
            due: at(2023, 12, 15),
            invoice_number: "INV-1".to_string(),
            customer: "Acme".to_string(),
            amount: usd(100),
        },
        ExpectedPayment {
            due: at(2024, 1, 10),
            invoice_number: "INV-2".to_string(),
            customer: "Acme".to_string(),
            amount: usd(200),
        },
        ExpectedPayment {
            due: at(2024, 2, 20),
            invoice_number: "INV-3".to_string(),
            customer: "Globex".to_string(),
            amount: usd(300),
        },
    ];
    let params = ReportParameters::between("2024-01-01", "2024-02-29");

    let doc = generate(&ctx, ReportKind::CashFlow, &params, &source)
        .await
        .unwrap();

    let summary = pairs(&doc, "Summary");
    assert_eq!(value(summary, "Total Expected"), &Cell::Money(usd(600)));
    assert_eq!(value(summary, "Already Overdue"), &Cell::Money(usd(100)));

    let monthly = table(&doc, "Monthly");
    assert_eq!(monthly.rows.len(), 2);
    assert_eq!(monthly.rows[0][2], Cell::Money(usd(300)));
    assert_eq!(monthly.rows[1][2], Cell::Money(usd(300)));
    assert_eq!(monthly.footer.as_ref().unwrap()[2], Cell::Money(usd(600)));

    // en_US weeks start on Sunday: Dec 31 - Jan 6 (clipped to Jan 1), Jan 7 - Jan 13, ...
    let weekly = table(&doc, "Weekly");
    assert_eq!(weekly.rows[0][0], Cell::from("Jan 1, 2024 - Jan 6, 2024"));
    assert_eq!(weekly.rows[0][2], Cell::Money(usd(100)));
    assert_eq!(weekly.rows[1][2], Cell::Money(usd(200)));
    assert_eq!(weekly.footer.as_ref().unwrap()[1], Cell::Integer(3));
}

#[tokio::test]
async fn test_cash_flow_without_range_forecasts_configured_days() {
    let ctx = tenant();
    let source = FakeSource::new(ctx.id, Currency::USD);
    let service = ReportService::new(ReportsConfig {
        forecast_days: 30,
        ..ReportsConfig::default()
    });

    let doc = service
        .generate(&ctx, ReportKind::CashFlow, &ReportParameters::default(), &source)
        .await
        .unwrap();

    let today = ctx.today();
    let end = today + chrono::Days::new(30);
    assert_eq!(doc.parameters["start"], ctx.format_date(today));
    assert_eq!(doc.parameters["end"], ctx.format_date(end));
}

#[tokio::test]
async fn test_tax_summary_looks_up_each_rate_once() {
    let ctx = tenant();
    let vat = TaxRateId::new();
    let state = TaxRateId::new();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.tax_rate_names.insert(vat, "VAT 20%".to_string());
    source.tax_rate_names.insert(state, "State Tax".to_string());
    source.tax_lines = vec![
        TaxLine {
            date: at(2024, 1, 5),
            tax_rate_id: vat,
            taxable: usd(1000),
            tax: usd(200),
        },
        TaxLine {
            date: at(2024, 1, 6),
            tax_rate_id: state,
            taxable: usd(500),
            tax: usd(25),
        },
        TaxLine {
            date: at(2024, 1, 7),
            tax_rate_id: vat,
            taxable: usd(2000),
            tax: usd(400),
        },
    ];
    let params = ReportParameters::between("2024-01-01", "2024-01-31");

    let doc = generate(&ctx, ReportKind::TaxSummary, &params, &source)
        .await
        .unwrap();

    assert_eq!(source.name_lookups(), 2);
    let table = table(&doc, "Tax Summary");
    assert_eq!(
        table.rows,
        vec![
            vec![Cell::from("State Tax"), Cell::Money(usd(500)), Cell::Money(usd(25))],
            vec![Cell::from("VAT 20%"), Cell::Money(usd(3000)), Cell::Money(usd(600))],
        ]
    );
    assert_eq!(
        table.footer,
        Some(vec![Cell::from("Total"), Cell::Money(usd(3500)), Cell::Money(usd(625))])
    );
}

#[tokio::test]
async fn test_payment_summary_groups_by_method_name() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source
        .method_names
        .insert("credit_card".to_string(), "Credit Card".to_string());
    source.method_names.insert("ach".to_string(), "ACH".to_string());
    source.payments = vec![
        PaymentRow {
            date: at(2024, 1, 3),
            method: "credit_card".to_string(),
            amount: usd(1000),
        },
        PaymentRow {
            date: at(2024, 1, 20),
            method: "ach".to_string(),
            amount: usd(5000),
        },
        PaymentRow {
            date: at(2024, 2, 2),
            method: "credit_card".to_string(),
            amount: usd(1500),
        },
    ];
    let params = ReportParameters::between("2024-01-01", "2024-02-29");

    let doc = generate(&ctx, ReportKind::PaymentSummary, &params, &source)
        .await
        .unwrap();

    assert_eq!(source.name_lookups(), 2);
    let methods = table(&doc, "By Payment Method");
    assert_eq!(
        methods.rows[1],
        vec![
            Cell::from("Credit Card"),
            Cell::Integer(2),
            Cell::Money(usd(2500)),
            Cell::Percent(dec!(33.33)),
        ]
    );
    assert_eq!(methods.rows[0][3], Cell::Percent(dec!(66.67)));
    assert_eq!(methods.footer.as_ref().unwrap()[2], Cell::Money(usd(7500)));

    let shares = doc
        .section("By Payment Method")
        .and_then(|s| {
            s.groups.iter().find_map(|g| match g {
                Group::Chart(c) => Some(c),
                _ => None,
            })
        })
        .unwrap();
    assert_eq!(shares.chart_type, ChartType::Pie);
    assert_eq!(shares.labels, vec!["ACH".to_string(), "Credit Card".to_string()]);
    assert_eq!(shares.options.get("legend"), Some(&serde_json::json!("right")));

    let trend = table(&doc, "Monthly Trend");
    assert_eq!(trend.rows[0][0], Cell::from("Feb 2024"));
    assert_eq!(trend.rows[1][2], Cell::Money(usd(6000)));
}

#[tokio::test]
async fn test_ar_aging_buckets_and_blank_cells() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.open_invoices = vec![
        OpenInvoice {
            number: "INV-1".to_string(),
            customer: "Acme".to_string(),
            due_date: date(2024, 7, 15),
            balance: usd(100),
        },
        OpenInvoice {
            number: "INV-2".to_string(),
            customer: "Acme".to_string(),
            due_date: date(2024, 6, 10),
            balance: usd(200),
        },
        OpenInvoice {
            number: "INV-3".to_string(),
            customer: "Globex".to_string(),
            due_date: date(2024, 3, 1),
            balance: usd(300),
        },
    ];
    let params = ReportParameters {
        as_of: Some("2024-06-30".to_string()),
        ..ReportParameters::default()
    };

    let doc = generate(&ctx, ReportKind::ArAging, &params, &source)
        .await
        .unwrap();

    let table = table(&doc, "Aging");
    assert_eq!(table.header.len(), 7);
    assert_eq!(
        table.rows[0],
        vec![
            Cell::from("Acme"),
            Cell::Money(usd(100)),
            Cell::Money(usd(200)),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Money(usd(300)),
        ]
    );
    assert_eq!(table.rows[1][5], Cell::Money(usd(300)));
    assert_eq!(table.footer.as_ref().unwrap()[6], Cell::Money(usd(600)));
    assert_eq!(doc.parameters["as_of"], "Jun 30, 2024");
}

#[tokio::test]
async fn test_collections_efficiency_and_dso() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.balances.insert(date(2024, 6, 30), usd(2500));
    source.activity = Some(ArActivity {
        invoiced: usd(10000),
        paid: usd(-7500),
        ..ArActivity::zero(Currency::USD)
    });
    let params = ReportParameters::between("2024-06-01", "2024-06-30");

    let doc = generate(&ctx, ReportKind::CollectionsEfficiency, &params, &source)
        .await
        .unwrap();

    let metrics = pairs(&doc, "Collections");
    assert_eq!(value(metrics, "Days Sales Outstanding"), &Cell::Decimal(dec!(8)));
    assert_eq!(value(metrics, "Collections Efficiency"), &Cell::Percent(dec!(75)));
}

#[tokio::test]
async fn test_collections_with_nothing_invoiced_falls_back_to_zero() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.balances.insert(date(2024, 6, 30), usd(2500));
    let params = ReportParameters::between("2024-06-01", "2024-06-30");

    let doc = generate(&ctx, ReportKind::CollectionsEfficiency, &params, &source)
        .await
        .unwrap();

    let metrics = pairs(&doc, "Collections");
    assert_eq!(value(metrics, "Days Sales Outstanding"), &Cell::Decimal(dec!(0)));
    assert_eq!(value(metrics, "Collections Efficiency"), &Cell::Percent(dec!(0)));
}

#[tokio::test]
async fn test_reconciliation_scenario() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.balances.insert(date(2024, 3, 31), usd(5000));
    source.activity = Some(ArActivity {
        invoiced: usd(2000),
        paid: usd(-1800),
        credit_notes: usd(-100),
        bad_debt: usd(0),
        voided: usd(0),
    });
    source.ledger = Some(usd(5100));
    let params = ReportParameters::between("2024-04-01", "2024-06-30");

    let doc = generate(&ctx, ReportKind::Reconciliation, &params, &source)
        .await
        .unwrap();

    let section = doc.section("A/R Reconciliation").unwrap();
    let Group::FinancialReport(statement) = &section.groups[0] else {
        panic!("expected a financial report group");
    };
    assert_eq!(statement.rows[0].value, Some(Cell::Money(usd(5000))));
    assert_eq!(statement.rows[1].children.len(), 5);
    assert_eq!(statement.rows[1].summary, Some(Cell::Money(usd(100))));
    assert_eq!(statement.rows[2].value, Some(Cell::Money(usd(5100))));

    let check = pairs(&doc, "A/R Reconciliation");
    assert_eq!(value(check, "Difference"), &Cell::Money(usd(0)));
    assert_eq!(value(check, "Status"), &Cell::from("Reconciled"));
}

#[tokio::test]
async fn test_reconciliation_without_ledger_is_no_data() {
    let ctx = tenant();
    let source = FakeSource::new(ctx.id, Currency::USD);

    let doc = generate(
        &ctx,
        ReportKind::Reconciliation,
        &ReportParameters::default(),
        &source,
    )
    .await
    .unwrap();

    assert!(doc.is_no_data());
}

#[tokio::test]
async fn test_invoice_summary_grouped_by_customer() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.rows = vec![
        DefinitionRow {
            cells: vec![
                Cell::from("Acme"),
                Cell::Integer(2),
                Cell::Money(usd(3000)),
                Cell::Money(usd(500)),
            ],
        },
        DefinitionRow {
            cells: vec![
                Cell::from("Globex"),
                Cell::Integer(1),
                Cell::Money(usd(700)),
                Cell::Empty,
            ],
        },
    ];
    let mut params = ReportParameters::between("2024-01-01", "2024-12-31");
    params.group_by = Some("customer".to_string());
    params
        .invoice_metadata
        .insert("region".to_string(), "emea".to_string());

    let doc = generate(&ctx, ReportKind::InvoiceSummary, &params, &source)
        .await
        .unwrap();

    let table = table(&doc, "Invoices");
    assert_eq!(table.header, vec!["Customer", "Invoices", "Total", "Balance"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(doc.parameters["group_by"], "customer");

    let definition = source.last_definition.lock().unwrap().clone().unwrap();
    assert_eq!(definition.group_by(), &["customer".to_string()]);
    assert_eq!(definition.filters().len(), 1);
    assert_eq!(definition.output_columns()[1].kind, FieldKind::Integer);
}

#[test]
fn test_invoice_summary_rejects_unknown_grouping() {
    let params = ReportParameters {
        group_by: Some("password_hash".to_string()),
        ..ReportParameters::default()
    };
    assert!(matches!(
        InvoiceSummaryReport::definition(&params),
        Err(ReportError::InvalidParameter { .. })
    ));
}

#[tokio::test]
async fn test_row_width_mismatch_is_reported() {
    let ctx = tenant();
    let mut source = FakeSource::new(ctx.id, Currency::USD);
    source.rows = vec![DefinitionRow {
        cells: vec![Cell::from("INV-1")],
    }];

    let err = generate(
        &ctx,
        ReportKind::InvoiceSummary,
        &ReportParameters::default(),
        &source,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        ReportError::Document(DocumentError::ColumnCountMismatch { expected: 7, got: 1 })
    ));
}

#[tokio::test]
async fn test_malformed_filter_fails_before_any_fetch() {
    let ctx = tenant();
    let source = FakeSource::new(ctx.id, Currency::USD);
    let mut params = ReportParameters::default();
    params
        .customer_metadata
        .insert("plan; drop".to_string(), "gold".to_string());

    for kind in ReportKind::ALL {
        let err = generate(&ctx, kind, &params, &source).await.unwrap_err();
        match err {
            ReportError::MalformedFilterValue { key } => assert_eq!(key, "plan; drop"),
            other => panic!("{kind}: expected malformed filter, got {other:?}"),
        }
    }
    assert_eq!(source.fetches(), 0);
}

#[tokio::test]
async fn test_other_tenants_rows_never_appear() {
    let owner = tenant();
    let mut source = lifetime_value_source(&owner);
    source.payments = vec![PaymentRow {
        date: at(2024, 3, 3),
        method: "ach".to_string(),
        amount: usd(5000),
    }];
    let intruder = tenant();
    let params = ReportParameters::between("2024-03-01", "2024-03-31");

    let doc = generate(&intruder, ReportKind::MrrMovements, &params, &source)
        .await
        .unwrap();
    let row = &table(&doc, "MRR Movements").rows[0];
    assert_eq!(row[1], Cell::Money(usd(0)));
    assert_eq!(row[7], Cell::Money(usd(0)));

    let doc = generate(&intruder, ReportKind::PaymentSummary, &params, &source)
        .await
        .unwrap();
    assert!(table(&doc, "By Payment Method").rows.is_empty());
}

#[tokio::test]
async fn test_every_report_generates_for_an_empty_tenant() {
    let ctx = tenant();
    let source = FakeSource::new(ctx.id, Currency::USD);
    let params = ReportParameters::between("2024-01-01", "2024-03-31");

    for kind in ReportKind::ALL {
        let doc = generate(&ctx, kind, &params, &source).await.unwrap();
        assert!(!doc.sections.is_empty(), "{kind} produced no sections");
        assert_eq!(service().report(kind).kind(), kind);
    }
}
