//! Compiles a [`ReportDefinition`] into one parameterised query.
//!
//! Field names are resolved against a fixed column map; nothing the caller
//! supplies is spliced into the SQL text. Output columns are aliased `c0`,
//! `c1`, ... in [`ReportDefinition::output_columns`] order.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sea_orm::{DbErr, QueryResult, Statement};
use tally_core::definition::{
    Aggregate, Column, DataObject, FieldKind, Filter, MetadataFilter, MetadataScope,
    ReportDefinition,
};
use tally_core::document::Cell;
use tally_core::reports::{DataScope, DefinitionRow};
use tally_shared::{Currency, Money};

use super::error::RepositoryError;
use super::statement::StatementBuilder;

/// Where a catalog field lives.
struct FieldSource {
    sql: &'static str,
    /// A `timestamptz` read as a calendar date in the tenant's zone.
    local_date: bool,
}

const fn plain(sql: &'static str) -> FieldSource {
    FieldSource {
        sql,
        local_date: false,
    }
}

const fn local_date(sql: &'static str) -> FieldSource {
    FieldSource {
        sql,
        local_date: true,
    }
}

fn field_source(object: DataObject, name: &str) -> Option<FieldSource> {
    let source = match (object, name) {
        (DataObject::Invoice, "number") => plain("i.number"),
        (DataObject::Invoice, "date") => local_date("i.date"),
        (DataObject::Invoice, "due_date") => plain("i.due_date"),
        (DataObject::Invoice, "customer") => plain("c.name"),
        (DataObject::Invoice, "currency") => plain("i.currency"),
        (DataObject::Invoice, "status") => plain("i.status"),
        (DataObject::Invoice, "subtotal") => plain("i.subtotal"),
        (DataObject::Invoice, "total") => plain("i.total"),
        (DataObject::Invoice, "balance") => plain("i.balance"),
        (DataObject::Customer, "name") => plain("c.name"),
        (DataObject::Customer, "email") => plain("c.email"),
        (DataObject::Customer, "country") => plain("c.country"),
        (DataObject::Customer, "created") => local_date("c.created_at"),
        (DataObject::Customer, "balance") => plain("c.balance"),
        _ => return None,
    };
    Some(source)
}

/// Renders field expressions, binding the time zone at most once.
struct Expressions {
    object: DataObject,
    time_zone: Tz,
    zone_placeholder: Option<String>,
}

impl Expressions {
    fn render(
        &mut self,
        sql: &mut StatementBuilder,
        name: &str,
    ) -> Result<String, RepositoryError> {
        let source = field_source(self.object, name).ok_or_else(|| {
            RepositoryError::invalid("definition", format!("no column for {name}"))
        })?;
        if !source.local_date {
            return Ok(source.sql.to_string());
        }

        let zone = match &self.zone_placeholder {
            Some(placeholder) => placeholder.clone(),
            None => {
                let placeholder = sql.bind(self.time_zone.name().to_string());
                self.zone_placeholder = Some(placeholder.clone());
                placeholder
            }
        };
        Ok(format!("({} AT TIME ZONE {zone})::date", source.sql))
    }
}

fn alias(index: usize) -> String {
    format!("c{index}")
}

/// Builds the query for `definition` within `scope`.
///
/// Invoices are limited to the half-open `window`; customers are not
/// date-limited.
pub fn definition_statement(
    scope: &DataScope,
    definition: &ReportDefinition,
    time_zone: Tz,
    window: (DateTime<Utc>, DateTime<Utc>),
) -> Result<Statement, RepositoryError> {
    let object = definition.object();
    let mut sql = StatementBuilder::new("SELECT ");
    let mut expressions = Expressions {
        object,
        time_zone,
        zone_placeholder: None,
    };

    let mut select = Vec::new();
    for (index, column) in definition.output_columns().into_iter().enumerate() {
        let expr = expressions.render(&mut sql, &column.name)?;
        let value = match column.aggregate {
            None => expr,
            Some(Aggregate::Sum)
                if matches!(column.kind, FieldKind::Money | FieldKind::Integer) =>
            {
                format!("COALESCE(SUM({expr}), 0)::bigint")
            }
            Some(Aggregate::Sum) => {
                return Err(RepositoryError::invalid(
                    "definition",
                    format!("cannot sum {}", column.name),
                ));
            }
            Some(Aggregate::Count) => format!("COUNT({expr})"),
        };
        select.push(format!("{value} AS {}", alias(index)));
    }
    if select.is_empty() {
        return Err(RepositoryError::invalid("definition", "no columns selected"));
    }
    sql.push(&select.join(", "));

    match object {
        DataObject::Invoice => {
            sql.push(
                " FROM invoices i \
                 JOIN customers c ON c.id = i.customer_id AND c.tenant_id = i.tenant_id",
            );
            sql.push_tenant("i", scope)
                .push(" AND NOT i.draft")
                .push_window("i.date", Some(window.0), window.1);
        }
        DataObject::Customer => {
            sql.push(" FROM customers c");
            sql.push_tenant("c", scope);
        }
    }

    for filter in definition.filters() {
        if let Filter::Equals { field, value } = filter {
            let expr = expressions.render(&mut sql, field)?;
            sql.push_bind(&format!(" AND ({expr})::text = "), value.clone());
        }
    }
    push_metadata(&mut sql, object, &metadata_filters(scope, definition));

    let mut group = Vec::new();
    for name in definition.group_by() {
        group.push(expressions.render(&mut sql, name)?);
    }
    if group.is_empty() {
        sql.push(match object {
            DataObject::Invoice => " ORDER BY i.date, i.number",
            DataObject::Customer => " ORDER BY c.name",
        });
    } else {
        let group = group.join(", ");
        sql.push(&format!(" GROUP BY {group} ORDER BY {group}"));
    }

    Ok(sql.build())
}

/// Metadata filters of the definition and the scope, without repeats.
fn metadata_filters<'a>(
    scope: &'a DataScope,
    definition: &'a ReportDefinition,
) -> Vec<&'a MetadataFilter> {
    let mut filters: Vec<&MetadataFilter> = Vec::new();
    let declared = definition.filters().iter().filter_map(|f| match f {
        Filter::Metadata(m) => Some(m),
        Filter::Equals { .. } => None,
    });
    for filter in declared.chain(scope.filters.iter()) {
        if !filters.contains(&filter) {
            filters.push(filter);
        }
    }
    filters
}

fn push_metadata(sql: &mut StatementBuilder, object: DataObject, filters: &[&MetadataFilter]) {
    for filter in filters {
        match (object, filter.scope()) {
            (DataObject::Invoice, MetadataScope::Invoice) => {
                sql.push_bind(" AND i.metadata ->> ", filter.key().to_string());
            }
            (_, MetadataScope::Customer) => {
                sql.push_bind(" AND c.metadata ->> ", filter.key().to_string());
            }
            (DataObject::Customer, MetadataScope::Invoice) => {
                sql.push_bind(
                    " AND EXISTS (SELECT 1 FROM invoices mi \
                     WHERE mi.customer_id = c.id AND mi.tenant_id = c.tenant_id \
                     AND mi.metadata ->> ",
                    filter.key().to_string(),
                );
                sql.push_bind(" = ", filter.value().to_string()).push(")");
                continue;
            }
        }
        sql.push_bind(" = ", filter.value().to_string());
    }
}

/// Reads one result row into cells aligned with `columns`.
pub fn read_row(
    row: &QueryResult,
    columns: &[&Column],
    currency: Currency,
) -> Result<DefinitionRow, RepositoryError> {
    let cells = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let name = alias(index);
            let cell = match column.kind {
                FieldKind::Text => row
                    .try_get::<Option<String>>("", &name)?
                    .map_or(Cell::Empty, Cell::Text),
                FieldKind::Money => row
                    .try_get::<Option<i64>>("", &name)?
                    .map_or(Cell::Empty, |v| Cell::Money(Money::new(currency, v))),
                FieldKind::Integer => row
                    .try_get::<Option<i64>>("", &name)?
                    .map_or(Cell::Empty, Cell::Integer),
                FieldKind::Date => row
                    .try_get::<Option<chrono::NaiveDate>>("", &name)?
                    .map_or(Cell::Empty, Cell::Date),
            };
            Ok::<_, DbErr>(cell)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DefinitionRow { cells })
}
