//! Observation fetches that materialize artifacts.

use std::sync::Arc;

use async_trait::async_trait;
use nate_ai::{ParamSpec, Tool, ToolArgs, ToolOutput, ToolSpec};
use nate_common::ToolError;
use nate_data::{ArtifactStore, DataArtifact, Table};
use serde_json::{json, Value};
use tracing::info;

use super::{date_arg, source_failure};
use crate::source::{DataSource, ObservationQuery};

fn with_filter_params(spec: ToolSpec, taxon_required: bool) -> ToolSpec {
    let taxon = ParamSpec::integer("taxon_id", "Taxon ID, as returned by get_taxon_id");
    spec.param(if taxon_required {
        taxon.required()
    } else {
        taxon
    })
    .param(ParamSpec::integer(
        "place_id",
        "Place ID, as returned by get_location_id",
    ))
    .param(ParamSpec::string(
        "d1",
        "Earliest observation date, YYYY-MM-DD",
    ))
    .param(ParamSpec::string("d2", "Latest observation date, YYYY-MM-DD"))
}

fn observation_query(args: &ToolArgs) -> Result<ObservationQuery, ToolError> {
    let query = ObservationQuery {
        taxon_id: args.i64("taxon_id")?,
        place_id: args.i64("place_id")?,
        d1: date_arg(args, "d1")?,
        d2: date_arg(args, "d2")?,
        limit: None,
    };
    if let (Some(d1), Some(d2)) = (query.d1, query.d2) {
        if d1 > d2 {
            return Err(ToolError::InvalidArgument {
                name: "d2".into(),
                reason: format!("d2 ({d2}) is before d1 ({d1})"),
            });
        }
    }
    Ok(query)
}

fn artifact_name<'a>(args: &'a ToolArgs, default: &'a str) -> Result<&'a str, ToolError> {
    Ok(args.str("name")?.unwrap_or(default))
}

fn materialize(name: &str, records: &[Value]) -> Result<ToolOutput, ToolError> {
    let table = Table::from_records(records).map_err(|e| ToolError::Execution(e.to_string()))?;
    let artifact = DataArtifact::new(name, table)?;
    info!(artifact = name, rows = records.len(), "Materialized artifact");
    Ok(ToolOutput::with_artifact(
        format!("Created {}", artifact.summarize()),
        artifact,
    ))
}

/// Species counts for a taxon and/or place.
pub struct GetObservationSummary {
    spec: ToolSpec,
    source: Arc<dyn DataSource>,
}

impl GetObservationSummary {
    pub const DEFAULT_NAME: &'static str = "observation_summary";

    pub fn new(source: Arc<dyn DataSource>) -> Self {
        let spec = with_filter_params(
            ToolSpec::new(
                "get_observation_summary",
                "Count observations per species for a taxon and/or place, optionally within a \
                 date range. Stores the counts as a table artifact (one row per species, with \
                 taxon_id, name, preferred_common_name, rank, iconic_taxon_name, \
                 conservation_status and count) and returns its summary.",
            ),
            false,
        )
        .param(ParamSpec::string(
            "name",
            "Name for the resulting table (default observation_summary)",
        ));
        Self { spec, source }
    }
}

#[async_trait]
impl Tool for GetObservationSummary {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(
        &self,
        _store: &ArtifactStore,
        args: &ToolArgs,
    ) -> Result<ToolOutput, ToolError> {
        let query = observation_query(args)?;
        if query.taxon_id.is_none() && query.place_id.is_none() {
            return Err(ToolError::InvalidArgument {
                name: "taxon_id".into(),
                reason: "give at least one of taxon_id or place_id".into(),
            });
        }
        let name = artifact_name(args, Self::DEFAULT_NAME)?;

        let results = match self.source.species_counts(&query).await {
            Ok(results) => results,
            Err(err) => return Ok(source_failure(self.name(), err)),
        };
        if results.is_empty() {
            return Ok(ToolOutput::text(
                "No observations matched these filters; no table was created.",
            ));
        }

        let records: Vec<Value> = results.iter().map(species_count_record).collect();
        materialize(name, &records)
    }
}

fn species_count_record(result: &Value) -> Value {
    let taxon = &result["taxon"];
    json!({
        "taxon_id": taxon["id"],
        "name": taxon["name"],
        "preferred_common_name": taxon["preferred_common_name"],
        "rank": taxon["rank"],
        "iconic_taxon_name": taxon["iconic_taxon_name"],
        "conservation_status": taxon["conservation_status"]["status"],
        "count": result["count"],
    })
}

/// Individual observation records.
pub struct GetObservationData {
    spec: ToolSpec,
    source: Arc<dyn DataSource>,
}

impl GetObservationData {
    pub const DEFAULT_NAME: &'static str = "observations";

    pub fn new(source: Arc<dyn DataSource>) -> Self {
        let spec = with_filter_params(
            ToolSpec::new(
                "get_observation_data",
                "Fetch individual observations of a taxon, optionally within a place and date \
                 range. Stores them as a table artifact (one row per observation, with id, \
                 observed_on, taxon, place_guess, latitude, longitude, quality_grade and more) \
                 and returns its summary. Use read_table or plot_histogram to inspect it.",
            ),
            true,
        )
        .param(ParamSpec::integer(
            "limit",
            "Maximum number of observations to fetch",
        ))
        .param(ParamSpec::string(
            "name",
            "Name for the resulting table (default observations)",
        ));
        Self { spec, source }
    }
}

#[async_trait]
impl Tool for GetObservationData {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(
        &self,
        _store: &ArtifactStore,
        args: &ToolArgs,
    ) -> Result<ToolOutput, ToolError> {
        let mut query = observation_query(args)?;
        query.limit = match args.i64("limit")? {
            Some(limit) if limit < 1 => {
                return Err(ToolError::InvalidArgument {
                    name: "limit".into(),
                    reason: format!("limit must be at least 1, got {limit}"),
                })
            }
            Some(limit) => Some(limit as usize),
            None => None,
        };
        let name = artifact_name(args, Self::DEFAULT_NAME)?;

        let results = match self.source.fetch_observations(&query).await {
            Ok(results) => results,
            Err(err) => return Ok(source_failure(self.name(), err)),
        };
        if results.is_empty() {
            return Ok(ToolOutput::text(
                "No observations matched these filters; no table was created.",
            ));
        }

        let records: Vec<Value> = results.iter().map(observation_record).collect();
        materialize(name, &records)
    }
}

fn observation_record(obs: &Value) -> Value {
    let taxon = &obs["taxon"];
    let (latitude, longitude) = split_location(&obs["location"]);
    json!({
        "id": obs["id"],
        "observed_on": obs["observed_on"],
        "taxon_id": taxon["id"],
        "taxon_name": taxon["name"],
        "preferred_common_name": taxon["preferred_common_name"],
        "iconic_taxon_name": taxon["iconic_taxon_name"],
        "conservation_status": taxon["conservation_status"]["status"],
        "quality_grade": obs["quality_grade"],
        "captive": obs["captive"],
        "place_guess": obs["place_guess"],
        "latitude": latitude,
        "longitude": longitude,
        "user_login": obs["user"]["login"],
    })
}

/// iNaturalist reports coordinates as a `"lat,lon"` string.
fn split_location(location: &Value) -> (Value, Value) {
    let parsed = location.as_str().and_then(|text| {
        let (lat, lon) = text.split_once(',')?;
        Some((lat.trim().parse::<f64>().ok()?, lon.trim().parse::<f64>().ok()?))
    });
    match parsed {
        Some((lat, lon)) => (json!(lat), json!(lon)),
        None => (Value::Null, Value::Null),
    }
}
