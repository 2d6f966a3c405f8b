//! Stable multi-key row ordering.

use std::cmp::Ordering;

use nate_common::ToolError;

use crate::table::{Cell, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(direction: &str) -> Result<Self, ToolError> {
        match direction.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(ToolError::InvalidArgument {
                name: "sort_by".into(),
                reason: format!("sort direction must be 'asc' or 'desc', got {direction:?}"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }

    pub(crate) fn bind(&self, table: &Table) -> Result<(usize, SortDirection), ToolError> {
        table
            .column_index(&self.column)
            .map(|index| (index, self.direction))
            .ok_or_else(|| ToolError::UnknownColumn(vec![self.column.clone()]))
    }
}

/// Order `rows` by `keys` in priority order. Ties keep their incoming order
/// and nulls (or NaN) sort last in either direction.
pub(crate) fn sort_rows(table: &Table, rows: &mut [usize], keys: &[(usize, SortDirection)]) {
    if keys.is_empty() {
        return;
    }
    rows.sort_by(|&a, &b| {
        keys.iter()
            .map(|&(column, direction)| {
                let cells = table.columns()[column].cells();
                compare_for_sort(&cells[a], &cells[b], direction)
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

fn sorts_last(cell: &Cell) -> bool {
    match cell {
        Cell::Null => true,
        Cell::Number(v) => v.is_nan(),
        _ => false,
    }
}

fn compare_for_sort(a: &Cell, b: &Cell, direction: SortDirection) -> Ordering {
    match (sorts_last(a), sorts_last(b)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.compare(b).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}
