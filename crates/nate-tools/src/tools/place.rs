use std::sync::Arc;

use async_trait::async_trait;
use nate_ai::{ParamSpec, Tool, ToolArgs, ToolOutput, ToolSpec};
use nate_common::ToolError;
use nate_data::ArtifactStore;
use serde_json::{Map, Value};

use super::source_failure;
use crate::source::DataSource;

const PLACE_FIELDS: &[&str] = &[
    "id",
    "name",
    "display_name",
    "place_type",
    "admin_level",
    "location",
    "ancestor_place_ids",
];

/// Keyword search for places and their ids.
pub struct GetLocationId {
    spec: ToolSpec,
    source: Arc<dyn DataSource>,
}

impl GetLocationId {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        let spec = ToolSpec::new(
            "get_location_id",
            "Search on a keyword to find related location names and their ID numbers. Returns \
             a list of objects with id, name, display_name, place_type, admin_level, location \
             (lat,lon) and ancestor_place_ids for each match, largest area first.",
        )
        .param(
            ParamSpec::string("location_str", "String to search, for example \"Tucson\"")
                .required(),
        );
        Self { spec, source }
    }
}

#[async_trait]
impl Tool for GetLocationId {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(
        &self,
        _store: &ArtifactStore,
        args: &ToolArgs,
    ) -> Result<ToolOutput, ToolError> {
        let query = args.required_str("location_str")?;
        let results = match self.source.search_places(query).await {
            Ok(results) => results,
            Err(err) => return Ok(source_failure(self.name(), err)),
        };

        if results.is_empty() {
            return Ok(ToolOutput::text(format!(
                "No locations found matching {query:?}"
            )));
        }
        let places: Vec<Value> = results
            .iter()
            .map(|place| {
                let fields: Map<String, Value> = PLACE_FIELDS
                    .iter()
                    .map(|&key| (key.to_string(), place.get(key).cloned().unwrap_or(Value::Null)))
                    .collect();
                Value::Object(fields)
            })
            .collect();
        Ok(ToolOutput::text(Value::Array(places).to_string()))
    }
}
