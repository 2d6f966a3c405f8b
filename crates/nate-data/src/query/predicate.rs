//! Typed row predicates.

use std::cmp::Ordering;

use nate_common::ToolError;

use crate::table::{parse_bool, parse_datetime, parse_finite, Cell, ColumnType, Table};

/// Comparison operators accepted in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    /// Parse one of `=`, `==`, `!=`, `>`, `<`, `>=`, `<=`.
    pub fn parse(op: &str) -> Result<Self, ToolError> {
        match op.trim() {
            "=" | "==" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            ">" => Ok(CompareOp::Gt),
            "<" => Ok(CompareOp::Lt),
            ">=" => Ok(CompareOp::Ge),
            "<=" => Ok(CompareOp::Le),
            _ => Err(ToolError::DisallowedOperator(op.to_string())),
        }
    }

    fn holds(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Ge => ord != Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
        }
    }
}

/// A `(column, operator, value)` filter as supplied by the model. The value
/// is always text and is cast to the column's type when the query runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: String,
    pub op: String,
    pub value: String,
}

impl Predicate {
    pub fn new(column: impl Into<String>, op: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: op.into(),
            value: value.into(),
        }
    }

    pub(crate) fn bind(&self, table: &Table) -> Result<BoundPredicate, ToolError> {
        let op = CompareOp::parse(&self.op)?;
        let column = table
            .column_index(&self.column)
            .ok_or_else(|| ToolError::UnknownColumn(vec![self.column.clone()]))?;
        let target = cast_value(&self.value, table.columns()[column].kind())?;
        Ok(BoundPredicate { column, op, target })
    }
}

/// A predicate resolved against a concrete table.
#[derive(Debug)]
pub(crate) struct BoundPredicate {
    column: usize,
    op: CompareOp,
    target: Cell,
}

impl BoundPredicate {
    /// Nulls (and NaN) only satisfy `!=`.
    pub(crate) fn matches(&self, table: &Table, row: usize) -> bool {
        let cell = &table.columns()[self.column].cells()[row];
        match cell.compare(&self.target) {
            Some(ord) => self.op.holds(ord),
            None => self.op == CompareOp::Ne,
        }
    }
}

/// Cast filter text to a cell of `kind`.
///
/// Integer columns also accept fractional values so `count > 2.5` works.
pub(crate) fn cast_value(value: &str, kind: ColumnType) -> Result<Cell, ToolError> {
    let trimmed = value.trim();
    let cast = match kind {
        ColumnType::Integer => trimmed
            .parse::<i64>()
            .map(Cell::Integer)
            .ok()
            .or_else(|| parse_finite(trimmed).map(Cell::Number)),
        ColumnType::Number => parse_finite(trimmed).map(Cell::Number),
        ColumnType::Boolean => parse_bool(trimmed).map(Cell::Boolean),
        ColumnType::DateTime => parse_datetime(trimmed).map(Cell::DateTime),
        ColumnType::String => Some(Cell::Text(value.to_string())),
    };
    cast.ok_or_else(|| ToolError::TypeCast {
        value: value.to_string(),
        target: kind.to_string(),
    })
}
