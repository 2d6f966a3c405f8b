use async_trait::async_trait;
use nate_ai::{ParamSpec, Tool, ToolArgs, ToolOutput, ToolSpec};
use nate_common::ToolError;
use nate_data::{
    read_artifact, ArtifactStore, Predicate, SortDirection, SortKey, TableQuery, DEFAULT_LIMIT,
};
use serde_json::json;

/// Projection, filtering, sorting and row limits over a stored table.
pub struct ReadTable {
    spec: ToolSpec,
}

impl ReadTable {
    pub fn new() -> Self {
        let spec = ToolSpec::new(
            "read_table",
            "Read rows from a stored table. Optionally select columns, filter rows with \
             [column, operator, value] triples (operators =, ==, !=, >, <, >=, <=; all filters \
             must hold), sort by columns ([column] or [column, \"asc\"|\"desc\"], first key \
             wins), and limit the row count n (1-20, default 5).",
        )
        .param(ParamSpec::string("artifact", "Name of the table to read").required())
        .param(ParamSpec::array(
            "cols",
            "Columns to return (default: all)",
            json!({ "type": "string" }),
        ))
        .param(ParamSpec::array(
            "filters",
            "Row filters as [column, operator, value] triples",
            json!({ "type": "array", "items": { "type": "string" } }),
        ))
        .param(ParamSpec::array(
            "sort_by",
            "Sort keys as [column] or [column, direction]",
            json!({ "type": "array", "items": { "type": "string" } }),
        ))
        .param(ParamSpec::integer("n", "Number of rows to return (1-20)"));
        Self { spec }
    }
}

impl Default for ReadTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ReadTable {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, store: &ArtifactStore, args: &ToolArgs) -> Result<ToolOutput, ToolError> {
        let name = args.required_str("artifact")?;
        let query = TableQuery {
            columns: args.string_list("cols")?,
            filters: args
                .rows("filters")?
                .into_iter()
                .map(predicate)
                .collect::<Result<_, _>>()?,
            sort_by: args
                .rows("sort_by")?
                .into_iter()
                .map(sort_key)
                .collect::<Result<_, _>>()?,
            limit: args.i64("n")?.unwrap_or(DEFAULT_LIMIT),
        };
        read_artifact(store, name, &query).map(ToolOutput::text)
    }
}

fn predicate(row: Vec<String>) -> Result<Predicate, ToolError> {
    match <[String; 3]>::try_from(row) {
        Ok([column, op, value]) => Ok(Predicate::new(column, op, value)),
        Err(row) => Err(ToolError::InvalidArgument {
            name: "filters".into(),
            reason: format!("expected [column, operator, value], got {row:?}"),
        }),
    }
}

fn sort_key(row: Vec<String>) -> Result<SortKey, ToolError> {
    match row.as_slice() {
        [column] => Ok(SortKey::asc(column.as_str())),
        [column, direction] => Ok(SortKey {
            column: column.clone(),
            direction: SortDirection::parse(direction)?,
        }),
        _ => Err(ToolError::InvalidArgument {
            name: "sort_by".into(),
            reason: format!("expected [column] or [column, direction], got {row:?}"),
        }),
    }
}
