//! The tools Nate's model can call.
//!
//! Data-fetching tools turn `DataSourceError`s into diagnostic result text
//! so the model can react; argument and query errors propagate as
//! `ToolError`s and are handled by the session's tool-error policy.

mod histogram;
mod observations;
mod place;
mod read_table;
mod taxon;

use std::sync::Arc;

use chrono::NaiveDate;
use nate_ai::{ToolArgs, ToolOutput, ToolRegistry};
use nate_common::{DataSourceError, ToolError};
use tracing::warn;

use crate::plot::PlotSink;
use crate::source::DataSource;

pub use histogram::PlotHistogram;
pub use observations::{GetObservationData, GetObservationSummary};
pub use place::GetLocationId;
pub use read_table::ReadTable;
pub use taxon::GetTaxonId;

/// Registry holding every built-in tool, in the order they are declared to
/// the model.
pub fn builtin_registry(
    source: Arc<dyn DataSource>,
    sink: Arc<dyn PlotSink>,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(GetTaxonId::new(source.clone()))?;
    registry.register(GetLocationId::new(source.clone()))?;
    registry.register(GetObservationSummary::new(source.clone()))?;
    registry.register(GetObservationData::new(source))?;
    registry.register(ReadTable::new())?;
    registry.register(PlotHistogram::new(sink))?;
    Ok(registry)
}

/// Optional `YYYY-MM-DD` argument.
fn date_arg(args: &ToolArgs, key: &str) -> Result<Option<NaiveDate>, ToolError> {
    args.str(key)?
        .map(|text| {
            NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| {
                ToolError::InvalidArgument {
                    name: key.to_string(),
                    reason: format!("expected a YYYY-MM-DD date, got {text:?}"),
                }
            })
        })
        .transpose()
}

/// Report a provider failure to the model instead of failing the call.
fn source_failure(tool: &str, err: DataSourceError) -> ToolOutput {
    warn!(tool, error = %err, "Data source request failed");
    ToolOutput::text(format!("{tool} could not reach the data source: {err}"))
}
