//! Generic report document model consumed by the rendering layer.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::Money;

use super::error::DocumentError;

/// Title of the section emitted when a report has nothing to show.
pub const NO_DATA_AVAILABLE: &str = "No Data Available";

/// A single rendered value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    /// Blank cell.
    Empty,
    /// Plain text.
    Text(String),
    /// Money amount.
    Money(Money),
    /// Whole number.
    Integer(i64),
    /// Decimal number.
    Decimal(Decimal),
    /// Percentage (already multiplied by 100).
    Percent(Decimal),
    /// Calendar date.
    Date(NaiveDate),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Money> for Cell {
    fn from(value: Money) -> Self {
        Self::Money(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// Money cell, or a blank cell when the amount is exactly zero.
#[must_use]
pub fn money_or_blank(amount: Money) -> Cell {
    if amount.is_zero() {
        Cell::Empty
    } else {
        Cell::Money(amount)
    }
}

/// Ordered label/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueGroup {
    /// Pairs in display order.
    pub pairs: Vec<(String, Cell)>,
}

impl KeyValueGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair.
    #[must_use]
    pub fn with(mut self, label: &str, value: impl Into<Cell>) -> Self {
        self.pairs.push((label.to_string(), value.into()));
        self
    }
}

/// Header, rows and an optional footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGroup {
    /// Column headers.
    pub header: Vec<String>,
    /// Body rows.
    pub rows: Vec<Vec<Cell>>,
    /// Totals row.
    pub footer: Option<Vec<Cell>>,
}

impl TableGroup {
    /// Creates a table with the given header.
    #[must_use]
    pub fn new<S: AsRef<str>>(header: &[S]) -> Self {
        Self {
            header: header.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
            footer: None,
        }
    }

    /// Appends a row, checking its width against the header.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), DocumentError> {
        self.check_width(&row)?;
        self.rows.push(row);
        Ok(())
    }

    /// Sets the footer, checking its width against the header.
    pub fn set_footer(&mut self, row: Vec<Cell>) -> Result<(), DocumentError> {
        self.check_width(&row)?;
        self.footer = Some(row);
        Ok(())
    }

    fn check_width(&self, row: &[Cell]) -> Result<(), DocumentError> {
        if row.len() == self.header.len() {
            Ok(())
        } else {
            Err(DocumentError::ColumnCountMismatch {
                expected: self.header.len(),
                got: row.len(),
            })
        }
    }
}

/// Kind of chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Vertical bars.
    Bar,
    /// Line.
    Line,
    /// Pie.
    Pie,
}

/// One named data series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Series name.
    pub name: String,
    /// One point per label.
    pub data: Vec<Decimal>,
}

/// Chart with labelled series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartGroup {
    /// Chart type.
    pub chart_type: ChartType,
    /// X-axis labels.
    pub labels: Vec<String>,
    /// Series data.
    pub series: Vec<ChartSeries>,
    /// Renderer options passed through untouched.
    pub options: BTreeMap<String, serde_json::Value>,
}

impl ChartGroup {
    /// Creates a chart with the given labels.
    #[must_use]
    pub fn new(chart_type: ChartType, labels: Vec<String>) -> Self {
        Self {
            chart_type,
            labels,
            series: Vec::new(),
            options: BTreeMap::new(),
        }
    }

    /// Adds a series; it must have one point per label.
    pub fn push_series(&mut self, name: &str, data: Vec<Decimal>) -> Result<(), DocumentError> {
        if data.len() != self.labels.len() {
            return Err(DocumentError::SeriesLengthMismatch {
                series: name.to_string(),
                expected: self.labels.len(),
                got: data.len(),
            });
        }
        self.series.push(ChartSeries {
            name: name.to_string(),
            data,
        });
        Ok(())
    }

    /// Sets a renderer option.
    #[must_use]
    pub fn with_option(mut self, key: &str, value: serde_json::Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }
}

/// Hierarchical row of a financial statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRow {
    /// Row caption.
    pub header: String,
    /// Row value, if the row carries one.
    pub value: Option<Cell>,
    /// Nested rows.
    pub children: Vec<FinancialRow>,
    /// Summary shown after the children (e.g. a subtotal).
    pub summary: Option<Cell>,
}

impl FinancialRow {
    /// Row with a value and no children.
    #[must_use]
    pub fn value(header: &str, value: impl Into<Cell>) -> Self {
        Self {
            header: header.to_string(),
            value: Some(value.into()),
            children: Vec::new(),
            summary: None,
        }
    }

    /// Row grouping `children` under `header`, closed by `summary`.
    #[must_use]
    pub fn parent(header: &str, children: Vec<Self>, summary: impl Into<Cell>) -> Self {
        Self {
            header: header.to_string(),
            value: None,
            children,
            summary: Some(summary.into()),
        }
    }
}

/// Nested financial statement rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialReportGroup {
    /// Top-level rows.
    pub rows: Vec<FinancialRow>,
}

/// A group inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Group {
    /// Label/value pairs.
    KeyValue(KeyValueGroup),
    /// Table.
    Table(TableGroup),
    /// Chart.
    Chart(ChartGroup),
    /// Nested financial rows.
    FinancialReport(FinancialReportGroup),
}

/// Named section of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section title.
    pub title: String,
    /// Groups in display order.
    pub groups: Vec<Group>,
}

impl Section {
    /// Creates an empty section.
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            groups: Vec::new(),
        }
    }

    /// Appends a group.
    #[must_use]
    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }
}

/// A finished report, handed to the rendering layer as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    /// Report title.
    pub title: String,
    /// Suggested file name (without extension).
    pub filename: String,
    /// Resolved parameters shown in the report header.
    pub parameters: BTreeMap<String, String>,
    /// Sections in display order.
    pub sections: Vec<Section>,
}

impl ReportDocument {
    /// Creates a document with no sections.
    #[must_use]
    pub fn new(title: &str, filename: &str) -> Self {
        Self {
            title: title.to_string(),
            filename: filename.to_string(),
            parameters: BTreeMap::new(),
            sections: Vec::new(),
        }
    }

    /// A document whose only section says there is no data.
    #[must_use]
    pub fn no_data(title: &str, filename: &str) -> Self {
        Self::new(title, filename).with_section(Section::new(NO_DATA_AVAILABLE))
    }

    /// Records a resolved parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: &str, value: impl ToString) -> Self {
        self.parameters.insert(name.to_string(), value.to_string());
        self
    }

    /// Appends a section.
    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Returns true for a "No Data Available" document.
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(
            self.sections.as_slice(),
            [only] if only.title == NO_DATA_AVAILABLE && only.groups.is_empty()
        )
    }

    /// First section with the given title.
    #[must_use]
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}
