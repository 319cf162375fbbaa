//! Typed report definitions.
//!
//! A [`ReportDefinition`] names the object to report on, the columns to
//! select, the filters to apply and the grouping. Each change goes through a
//! consuming method that validates it against the object's field catalog, so
//! a definition can only ever describe a query the data layer knows how to
//! build.

use serde::{Deserialize, Serialize};

use super::error::DefinitionError;

/// Longest accepted metadata key.
pub const MAX_METADATA_KEY_LEN: usize = 40;

/// Kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Money in the report currency.
    Money,
    /// Whole number.
    Integer,
    /// Calendar date.
    Date,
}

/// Aggregate applied to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    /// Sum of a money or integer field.
    Sum,
    /// Number of rows.
    Count,
}

/// Catalog entry for a reportable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name used in definitions.
    pub name: &'static str,
    /// Default column header.
    pub label: &'static str,
    /// Value kind.
    pub kind: FieldKind,
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, label, kind }
}

const INVOICE_FIELDS: &[FieldSpec] = &[
    field("number", "Invoice #", FieldKind::Text),
    field("date", "Date", FieldKind::Date),
    field("due_date", "Due Date", FieldKind::Date),
    field("customer", "Customer", FieldKind::Text),
    field("currency", "Currency", FieldKind::Text),
    field("status", "Status", FieldKind::Text),
    field("subtotal", "Subtotal", FieldKind::Money),
    field("total", "Total", FieldKind::Money),
    field("balance", "Balance", FieldKind::Money),
];

const CUSTOMER_FIELDS: &[FieldSpec] = &[
    field("name", "Customer", FieldKind::Text),
    field("email", "Email", FieldKind::Text),
    field("country", "Country", FieldKind::Text),
    field("created", "Created", FieldKind::Date),
    field("balance", "Balance", FieldKind::Money),
];

/// Object a definition reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataObject {
    /// Invoices.
    Invoice,
    /// Customers.
    Customer,
}

impl DataObject {
    /// Fields that can be selected for this object.
    #[must_use]
    pub const fn catalog(self) -> &'static [FieldSpec] {
        match self {
            Self::Invoice => INVOICE_FIELDS,
            Self::Customer => CUSTOMER_FIELDS,
        }
    }

    /// Looks up a field in the catalog.
    #[must_use]
    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.catalog().iter().find(|f| f.name == name)
    }
}

/// A column requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Catalog field name.
    pub name: String,
    /// Aggregate, if any.
    pub aggregate: Option<Aggregate>,
    /// Header override.
    pub label: Option<String>,
}

impl Field {
    /// A plain column.
    #[must_use]
    pub fn plain(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aggregate: None,
            label: None,
        }
    }

    /// The sum of a field.
    #[must_use]
    pub fn sum(name: &str) -> Self {
        Self {
            aggregate: Some(Aggregate::Sum),
            ..Self::plain(name)
        }
    }

    /// The row count, keyed on a field.
    #[must_use]
    pub fn count(name: &str) -> Self {
        Self {
            aggregate: Some(Aggregate::Count),
            ..Self::plain(name)
        }
    }

    /// Overrides the column header.
    #[must_use]
    pub fn labelled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

/// A validated column of a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Catalog field name.
    pub name: String,
    /// Column header.
    pub label: String,
    /// Kind of the output value. Counts are always integers.
    pub kind: FieldKind,
    /// Aggregate, if any.
    pub aggregate: Option<Aggregate>,
}

impl Column {
    /// Returns true if this column is aggregated.
    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        self.aggregate.is_some()
    }
}

/// Whose metadata a filter matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataScope {
    /// Invoice metadata.
    Invoice,
    /// Customer metadata.
    Customer,
}

/// Exact-match filter on a metadata key.
///
/// Deserialization goes through [`MetadataFilter::new`], so a filter read
/// from JSON carries a validated key too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MetadataFilterFields")]
pub struct MetadataFilter {
    scope: MetadataScope,
    key: String,
    value: String,
}

impl MetadataFilter {
    /// Validates `key` and creates the filter.
    ///
    /// Keys are limited to ASCII letters, digits, `_` and `-`.
    pub fn new(scope: MetadataScope, key: &str, value: &str) -> Result<Self, DefinitionError> {
        let valid = !key.is_empty()
            && key.len() <= MAX_METADATA_KEY_LEN
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(DefinitionError::MalformedFilterValue {
                key: key.to_string(),
            });
        }

        Ok(Self {
            scope,
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Scope of the key.
    #[must_use]
    pub const fn scope(&self) -> MetadataScope {
        self.scope
    }

    /// Validated key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Value to match.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

#[derive(Deserialize)]
struct MetadataFilterFields {
    scope: MetadataScope,
    key: String,
    value: String,
}

impl TryFrom<MetadataFilterFields> for MetadataFilter {
    type Error = DefinitionError;

    fn try_from(fields: MetadataFilterFields) -> Result<Self, Self::Error> {
        Self::new(fields.scope, &fields.key, &fields.value)
    }
}

/// Row filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Metadata key equals a value.
    Metadata(MetadataFilter),
    /// Catalog field equals a value.
    Equals {
        /// Catalog field name.
        field: String,
        /// Value to match.
        value: String,
    },
}

/// Declarative description of a tabular report.
///
/// Deserialization replays the builder, so every catalog and grouping rule
/// holds for definitions read from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DefinitionFields")]
pub struct ReportDefinition {
    object: DataObject,
    columns: Vec<Column>,
    filters: Vec<Filter>,
    group_by: Vec<String>,
}

#[derive(Deserialize)]
struct DefinitionFields {
    object: DataObject,
    #[serde(default)]
    columns: Vec<Column>,
    #[serde(default)]
    filters: Vec<Filter>,
    #[serde(default)]
    group_by: Vec<String>,
}

impl TryFrom<DefinitionFields> for ReportDefinition {
    type Error = DefinitionError;

    fn try_from(fields: DefinitionFields) -> Result<Self, Self::Error> {
        let mut definition = Self::new(fields.object);
        for column in fields.columns {
            definition = definition.add_field(Field {
                name: column.name,
                aggregate: column.aggregate,
                label: Some(column.label),
            })?;
        }
        for filter in fields.filters {
            definition = definition.add_filter(filter)?;
        }
        for name in &fields.group_by {
            definition = definition.add_group_by(name)?;
        }
        Ok(definition)
    }
}

impl ReportDefinition {
    /// An empty definition over `object`.
    #[must_use]
    pub const fn new(object: DataObject) -> Self {
        Self {
            object,
            columns: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
        }
    }

    /// Appends a column.
    ///
    /// A field may appear once plain and once per aggregate.
    pub fn add_field(mut self, field: Field) -> Result<Self, DefinitionError> {
        let spec = self
            .object
            .field(&field.name)
            .ok_or_else(|| DefinitionError::UnknownField(field.name.clone()))?;

        if self
            .columns
            .iter()
            .any(|c| c.name == field.name && c.aggregate == field.aggregate)
        {
            return Err(DefinitionError::DuplicateField(field.name));
        }

        let kind = match field.aggregate {
            Some(Aggregate::Count) => FieldKind::Integer,
            _ => spec.kind,
        };
        let label = field.label.unwrap_or_else(|| match field.aggregate {
            Some(Aggregate::Count) => "Count".to_string(),
            _ => spec.label.to_string(),
        });

        self.columns.push(Column {
            name: field.name,
            label,
            kind,
            aggregate: field.aggregate,
        });
        Ok(self)
    }

    /// Adds a filter. Field filters must name a catalog field.
    pub fn add_filter(mut self, filter: Filter) -> Result<Self, DefinitionError> {
        if let Filter::Equals { field, .. } = &filter
            && self.object.field(field).is_none()
        {
            return Err(DefinitionError::UnknownField(field.clone()));
        }
        self.filters.push(filter);
        Ok(self)
    }

    /// Groups rows by a selected plain column.
    pub fn add_group_by(mut self, name: &str) -> Result<Self, DefinitionError> {
        if self.group_by.iter().any(|g| g == name) {
            return Err(DefinitionError::DuplicateField(name.to_string()));
        }

        let selected: Vec<&Column> = self.columns.iter().filter(|c| c.name == name).collect();
        if selected.is_empty() {
            return Err(DefinitionError::UnknownField(name.to_string()));
        }
        if selected.iter().all(|c| c.is_aggregate()) {
            return Err(DefinitionError::AggregateGroupField(name.to_string()));
        }

        self.group_by.push(name.to_string());
        Ok(self)
    }

    /// Object reported on.
    #[must_use]
    pub const fn object(&self) -> DataObject {
        self.object
    }

    /// Every selected column.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Filters, in insertion order.
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Group-by field names.
    #[must_use]
    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    /// Columns that appear in the output.
    ///
    /// When grouped, plain columns outside the grouping are dropped.
    #[must_use]
    pub fn output_columns(&self) -> Vec<&Column> {
        if self.group_by.is_empty() {
            return self.columns.iter().collect();
        }
        self.columns
            .iter()
            .filter(|c| c.is_aggregate() || self.group_by.contains(&c.name))
            .collect()
    }

    /// Output column headers.
    #[must_use]
    pub fn header(&self) -> Vec<String> {
        self.output_columns()
            .into_iter()
            .map(|c| c.label.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn invoices() -> ReportDefinition {
        ReportDefinition::new(DataObject::Invoice)
            .add_field(Field::plain("customer"))
            .and_then(|d| d.add_field(Field::plain("number")))
            .and_then(|d| d.add_field(Field::count("number")))
            .and_then(|d| d.add_field(Field::sum("total")))
            .unwrap()
    }

    #[test]
    fn test_builder_chain() {
        let definition = invoices();
        assert_eq!(definition.columns().len(), 4);
        assert_eq!(definition.header(), vec!["Customer", "Invoice #", "Count", "Total"]);
        assert_eq!(definition.columns()[2].kind, FieldKind::Integer);
    }

    #[test]
    fn test_each_step_returns_new_definition() {
        let base = ReportDefinition::new(DataObject::Invoice);
        let extended = base.clone().add_field(Field::plain("total")).unwrap();
        assert!(base.columns().is_empty());
        assert_eq!(extended.columns().len(), 1);
    }

    #[test]
    fn test_unknown_and_duplicate_fields() {
        let definition = ReportDefinition::new(DataObject::Invoice);
        assert_eq!(
            definition.clone().add_field(Field::plain("password")),
            Err(DefinitionError::UnknownField("password".to_string()))
        );

        let definition = definition.add_field(Field::plain("total")).unwrap();
        assert!(matches!(
            definition.add_field(Field::plain("total")),
            Err(DefinitionError::DuplicateField(_))
        ));
    }

    #[test]
    fn test_customer_catalog_differs() {
        assert!(DataObject::Customer.field("email").is_some());
        assert!(DataObject::Invoice.field("email").is_none());
    }

    #[test]
    fn test_group_by_drops_ungrouped_plain_columns() {
        let definition = invoices().add_group_by("customer").unwrap();
        assert_eq!(definition.header(), vec!["Customer", "Count", "Total"]);
    }

    #[test]
    fn test_group_by_validation() {
        assert_eq!(
            invoices().add_group_by("status"),
            Err(DefinitionError::UnknownField("status".to_string()))
        );
        assert_eq!(
            invoices().add_group_by("total"),
            Err(DefinitionError::AggregateGroupField("total".to_string()))
        );
        let grouped = invoices().add_group_by("customer").unwrap();
        assert!(matches!(
            grouped.add_group_by("customer"),
            Err(DefinitionError::DuplicateField(_))
        ));
    }

    #[test]
    fn test_equals_filter_requires_catalog_field() {
        let definition = invoices();
        assert!(
            definition
                .clone()
                .add_filter(Filter::Equals {
                    field: "status".to_string(),
                    value: "paid".to_string(),
                })
                .is_ok()
        );
        assert!(matches!(
            definition.add_filter(Filter::Equals {
                field: "1=1; --".to_string(),
                value: String::new(),
            }),
            Err(DefinitionError::UnknownField(_))
        ));
    }

    #[rstest]
    #[case("region")]
    #[case("plan_tier")]
    #[case("Cost-Center-2")]
    fn test_valid_metadata_keys(#[case] key: &str) {
        let filter = MetadataFilter::new(MetadataScope::Invoice, key, "anything goes").unwrap();
        assert_eq!(filter.key(), key);
        assert_eq!(filter.value(), "anything goes");
    }

    #[rstest]
    #[case("")]
    #[case("region'")]
    #[case("a b")]
    #[case("key.path")]
    #[case("x\"); DROP TABLE invoices; --")]
    fn test_malformed_metadata_keys_name_the_key(#[case] key: &str) {
        let err = MetadataFilter::new(MetadataScope::Customer, key, "v").unwrap_err();
        assert_eq!(
            err,
            DefinitionError::MalformedFilterValue {
                key: key.to_string()
            }
        );
    }

    #[test]
    fn test_metadata_key_length_limit() {
        let ok = "k".repeat(MAX_METADATA_KEY_LEN);
        let too_long = "k".repeat(MAX_METADATA_KEY_LEN + 1);
        assert!(MetadataFilter::new(MetadataScope::Invoice, &ok, "v").is_ok());
        assert!(MetadataFilter::new(MetadataScope::Invoice, &too_long, "v").is_err());
    }

    #[test]
    fn test_deserialized_metadata_filter_is_validated() {
        let ok: MetadataFilter =
            serde_json::from_str(r#"{"scope":"invoice","key":"region","value":"EU"}"#).unwrap();
        assert_eq!(ok.key(), "region");

        let err = serde_json::from_str::<MetadataFilter>(
            r#"{"scope":"invoice","key":"x'); DROP TABLE invoices; --","value":"v"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid metadata key"));
    }

    #[test]
    fn test_deserialized_definition_replays_builder() {
        let definition = invoices()
            .add_filter(Filter::Metadata(
                MetadataFilter::new(MetadataScope::Customer, "plan", "pro").unwrap(),
            ))
            .and_then(|d| d.add_group_by("customer"))
            .unwrap();
        let json = serde_json::to_string(&definition).unwrap();
        let back: ReportDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, definition);

        let unknown = r#"{"object":"customer","columns":[
            {"name":"total","label":"Total","kind":"money","aggregate":"sum"}]}"#;
        assert!(serde_json::from_str::<ReportDefinition>(unknown).is_err());

        let bad_key = r#"{"object":"invoice","filters":[
            {"type":"metadata","scope":"invoice","key":"a b","value":"v"}]}"#;
        assert!(serde_json::from_str::<ReportDefinition>(bad_key).is_err());
    }
}
