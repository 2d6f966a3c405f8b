//! Table query engine: projection, typed filtering, stable multi-key sort
//! and a bounded row limit.
//!
//! Predicates are evaluated directly against typed cells. Predicate column
//! names are still restricted to a conservative character set.

mod predicate;
mod sort;


use std::sync::OnceLock;

use nate_common::ToolError;
use regex::Regex;
use tracing::debug;

use crate::artifact::ArtifactStore;
use crate::table::Table;

pub use predicate::{CompareOp, Predicate};
pub use sort::{SortDirection, SortKey};

/// Rows returned when no limit is given.
pub const DEFAULT_LIMIT: i64 = 5;

/// Largest accepted row limit.
pub const MAX_LIMIT: i64 = 20;

/// Parameters of one table read.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    /// Columns to keep, in output order. `None` keeps every column.
    pub columns: Option<Vec<String>>,
    /// Predicates combined with logical AND, applied in order.
    pub filters: Vec<Predicate>,
    /// Sort keys in priority order.
    pub sort_by: Vec<SortKey>,
    /// Maximum rows returned, `1..=20`.
    pub limit: i64,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            columns: None,
            filters: Vec::new(),
            sort_by: Vec::new(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Outcome of a query: the visible rows plus counts for the footer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub table: Table,
    pub matched: usize,
    pub total: usize,
}

impl QueryResult {
    pub fn render(&self) -> String {
        format!(
            "{}\n{} of {} matching rows ({} total)",
            self.table.render(),
            self.table.row_count(),
            self.matched,
            self.total
        )
    }
}

fn column_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_ ]+$").expect("valid column pattern"))
}

pub(crate) fn check_column_name(name: &str) -> Result<(), ToolError> {
    if column_name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(ToolError::InvalidColumnName(name.to_string()))
    }
}

/// Run `query` against `table`.
///
/// Validation happens before any row is touched: limit, predicate column
/// name characters, projection, predicates (operator, column, value cast),
/// then sort keys. Projection and sort columns only need to exist.
pub fn run_query(table: &Table, query: &TableQuery) -> Result<QueryResult, ToolError> {
    if !(1..=MAX_LIMIT).contains(&query.limit) {
        return Err(ToolError::InvalidLimit(query.limit));
    }

    for predicate in &query.filters {
        check_column_name(&predicate.column)?;
    }

    let projection: Vec<usize> = match &query.columns {
        None => (0..table.column_count()).collect(),
        Some(names) => {
            let missing: Vec<String> = names
                .iter()
                .filter(|n| table.column_index(n).is_none())
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(ToolError::UnknownColumn(missing));
            }
            names.iter().filter_map(|n| table.column_index(n)).collect()
        }
    };

    let filters = query
        .filters
        .iter()
        .map(|p| p.bind(table))
        .collect::<Result<Vec<_>, _>>()?;
    let sort_keys = query
        .sort_by
        .iter()
        .map(|k| k.bind(table))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows: Vec<usize> = (0..table.row_count())
        .filter(|&row| filters.iter().all(|f| f.matches(table, row)))
        .collect();
    let matched = rows.len();

    sort::sort_rows(table, &mut rows, &sort_keys);
    rows.truncate(query.limit as usize);

    debug!(
        matched,
        returned = rows.len(),
        filters = filters.len(),
        sort_keys = sort_keys.len(),
        "table query"
    );

    Ok(QueryResult {
        table: table.select(&projection, &rows),
        matched,
        total: table.row_count(),
    })
}

/// Look up artifact `name` in `store` and render the query result.
pub fn read_artifact(
    store: &ArtifactStore,
    name: &str,
    query: &TableQuery,
) -> Result<String, ToolError> {
    let artifact = store.require(name)?;
    Ok(run_query(artifact.table(), query)?.render())
}
