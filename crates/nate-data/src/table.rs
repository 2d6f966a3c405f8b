//! Typed, column-oriented tables.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Storage type of a column. Every non-null cell in a column has this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Number,
    Boolean,
    DateTime,
    String,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
            ColumnType::DateTime => "datetime",
            ColumnType::String => "string",
        };
        f.write_str(name)
    }
}

/// A single table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Number(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// The column type this cell belongs in, or `None` for nulls.
    pub fn kind(&self) -> Option<ColumnType> {
        match self {
            Cell::Null => None,
            Cell::Integer(_) => Some(ColumnType::Integer),
            Cell::Number(_) => Some(ColumnType::Number),
            Cell::Boolean(_) => Some(ColumnType::Boolean),
            Cell::DateTime(_) => Some(ColumnType::DateTime),
            Cell::Text(_) => Some(ColumnType::String),
        }
    }

    /// Numeric view used for integer/number cross comparisons and histograms.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Number(v) => Some(*v),
            Cell::DateTime(v) => Some(v.and_utc().timestamp() as f64),
            _ => None,
        }
    }

    /// Compare two cells of compatible types.
    ///
    /// Integers and numbers compare numerically with each other. Nulls,
    /// NaN and mismatched types are incomparable.
    pub fn compare(&self, other: &Cell) -> Option<Ordering> {
        match (self, other) {
            (Cell::Integer(a), Cell::Integer(b)) => Some(a.cmp(b)),
            (Cell::Integer(_) | Cell::Number(_), Cell::Integer(_) | Cell::Number(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            (Cell::Boolean(a), Cell::Boolean(b)) => Some(a.cmp(b)),
            (Cell::DateTime(a), Cell::DateTime(b)) => Some(a.cmp(b)),
            (Cell::Text(a), Cell::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("null"),
            Cell::Integer(v) => write!(f, "{v}"),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Boolean(v) => write!(f, "{v}"),
            Cell::DateTime(v) => {
                if v.num_seconds_from_midnight() == 0 && v.nanosecond() == 0 {
                    write!(f, "{}", v.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            Cell::Text(v) => f.write_str(v),
        }
    }
}

/// Parse the datetime spellings the data sources emit.
///
/// Offsets are normalized to UTC so that values from different zones order
/// correctly.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a boolean from the fixed token set `true/t/yes/1` and `false/f/no/0`.
/// Parse a float, treating `NaN` and infinities as absent.
pub fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "1" => Some(true),
        "false" | "f" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    Ragged {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("column '{column}' is {expected} but row {row} holds a {actual} value")]
    TypeMismatch {
        column: String,
        row: usize,
        expected: ColumnType,
        actual: ColumnType,
    },

    #[error("failed to read tabular file: {0}")]
    Read(String),
}

/// One named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnType,
    cells: Vec<Cell>,
}

impl Column {
    /// Build a column, checking that every non-null cell matches `kind`.
    pub fn new(
        name: impl Into<String>,
        kind: ColumnType,
        cells: Vec<Cell>,
    ) -> Result<Self, TableError> {
        let name = name.into();
        for (row, cell) in cells.iter().enumerate() {
            if let Some(actual) = cell.kind() {
                if actual != kind {
                    return Err(TableError::TypeMismatch {
                        column: name,
                        row,
                        expected: kind,
                        actual,
                    });
                }
            }
        }
        Ok(Self { name, kind, cells })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnType {
        self.kind
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn take(&self, rows: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            kind: self.kind,
            cells: rows.iter().map(|&r| self.cells[r].clone()).collect(),
        }
    }
}

/// An ordered set of equal-length columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        for (i, column) in columns.iter().enumerate() {
            if column.len() != rows {
                return Err(TableError::Ragged {
                    column: column.name.clone(),
                    expected: rows,
                    actual: column.len(),
                });
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Build a new table holding `rows` (in that order) of the columns at
    /// `columns` (in that order).
    pub(crate) fn select(&self, columns: &[usize], rows: &[usize]) -> Table {
        Table {
            columns: columns.iter().map(|&c| self.columns[c].take(rows)).collect(),
            rows: rows.len(),
        }
    }

    /// Render as an aligned plain-text grid with a header line.
    pub fn render(&self) -> String {
        let rendered: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| c.cells.iter().map(ToString::to_string).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&rendered)
            .map(|(c, cells)| {
                cells
                    .iter()
                    .map(|s| s.chars().count())
                    .chain(std::iter::once(c.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c.name, w = *w))
            .collect();
        out.push_str(header.join("  ").trim_end());
        for row in 0..self.rows {
            out.push('\n');
            let line: Vec<String> = rendered
                .iter()
                .zip(&widths)
                .map(|(cells, w)| format!("{:<w$}", cells[row], w = *w))
                .collect();
            out.push_str(line.join("  ").trim_end());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(v: &str) -> Cell {
        Cell::Text(v.to_string())
    }

    #[test]
    fn column_rejects_mixed_types() {
        let err = Column::new("x", ColumnType::Integer, vec![Cell::Integer(1), text("a")])
            .unwrap_err();
        assert!(matches!(err, TableError::TypeMismatch { row: 1, .. }));
    }

    #[test]
    fn column_accepts_nulls_of_any_type() {
        let col = Column::new("x", ColumnType::Boolean, vec![Cell::Null, Cell::Boolean(true)]);
        assert!(col.is_ok());
    }

    #[test]
    fn table_rejects_ragged_and_duplicate_columns() {
        let a = Column::new("a", ColumnType::Integer, vec![Cell::Integer(1)]).unwrap();
        let b = Column::new("b", ColumnType::Integer, vec![]).unwrap();
        assert!(matches!(
            Table::new(vec![a.clone(), b]),
            Err(TableError::Ragged { .. })
        ));
        assert_eq!(
            Table::new(vec![a.clone(), a]),
            Err(TableError::DuplicateColumn("a".into()))
        );
    }

    #[test]
    fn integers_and_numbers_compare_numerically() {
        assert_eq!(
            Cell::Integer(3).compare(&Cell::Number(2.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(Cell::Null.compare(&Cell::Integer(1)), None);
        assert_eq!(text("a").compare(&Cell::Integer(1)), None);
    }

    #[test]
    fn parse_datetime_accepts_common_spellings() {
        let date = parse_datetime("2024-03-01").unwrap();
        assert_eq!(date.to_string(), "2024-03-01 00:00:00");

        let utc = parse_datetime("2024-03-01T10:00:00-07:00").unwrap();
        assert_eq!(utc.to_string(), "2024-03-01 17:00:00");

        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn parse_bool_token_set() {
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn render_aligns_columns() {
        let table = Table::new(vec![
            Column::new("name", ColumnType::String, vec![text("gila"), text("toad")]).unwrap(),
            Column::new("n", ColumnType::Integer, vec![Cell::Integer(12), Cell::Null]).unwrap(),
        ])
        .unwrap();
        assert_eq!(table.render(), "name  n\ngila  12\ntoad  null");
    }
}
