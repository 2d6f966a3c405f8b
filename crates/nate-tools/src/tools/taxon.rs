use std::sync::Arc;

use async_trait::async_trait;
use nate_ai::{ParamSpec, Tool, ToolArgs, ToolOutput, ToolSpec};
use nate_common::ToolError;
use nate_data::ArtifactStore;
use serde_json::{Map, Value};

use super::source_failure;
use crate::source::DataSource;

pub const ICONIC_TAXA: &[&str] = &[
    "Plantae",
    "Animalia",
    "Mollusca",
    "Reptilia",
    "Aves",
    "Amphibia",
    "Actinopterygii",
    "Mammalia",
    "Insecta",
    "Arachnida",
    "Fungi",
    "Protozoa",
    "Chromista",
    "unknown",
];

pub const RANKS: &[&str] = &[
    "kingdom",
    "phylum",
    "subphylum",
    "superclass",
    "subclass",
    "superorder",
    "order",
    "suborder",
    "infraorder",
    "superfamily",
    "epifamily",
    "family",
    "subfamily",
    "supertribe",
    "tribe",
    "subtribe",
    "genus",
    "genushybrid",
    "species",
    "hybrid",
    "subspecies",
    "variety",
    "form",
];

const TAXON_FIELDS: &[&str] = &[
    "id",
    "rank",
    "name",
    "extinct",
    "observations_count",
    "matched_term",
    "iconic_taxon_name",
    "preferred_common_name",
];

/// Keyword search for taxa and their ids.
pub struct GetTaxonId {
    spec: ToolSpec,
    source: Arc<dyn DataSource>,
}

impl GetTaxonId {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        let spec = ToolSpec::new(
            "get_taxon_id",
            "Search on a keyword to find related taxon names and their ID numbers. Returns a \
             list of objects with key information about each matching taxon, including name, \
             common name, rank, ID number and number of observations.",
        )
        .param(
            ParamSpec::string("taxon_str", "String to search on, for example \"bullfrog\"")
                .required(),
        )
        .param(
            ParamSpec::string(
                "iconic_taxon_name",
                "Iconic taxonomic group by which to filter results",
            )
            .one_of(ICONIC_TAXA),
        )
        .param(ParamSpec::string("rank", "Rank by which to filter results").one_of(RANKS));
        Self { spec, source }
    }
}

#[async_trait]
impl Tool for GetTaxonId {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(
        &self,
        _store: &ArtifactStore,
        args: &ToolArgs,
    ) -> Result<ToolOutput, ToolError> {
        let query = args.required_str("taxon_str")?;
        let iconic = args.str("iconic_taxon_name")?;

        let results = match self.source.search_taxa(query, args.str("rank")?).await {
            Ok(results) => results,
            Err(err) => return Ok(source_failure(self.name(), err)),
        };

        let taxa = abbreviate_taxa(&results, iconic);
        if taxa.is_empty() {
            return Ok(ToolOutput::text(format!(
                "No active taxa found matching {query:?}"
            )));
        }
        Ok(ToolOutput::text(Value::Array(taxa).to_string()))
    }
}

/// Keep active, extant taxa (optionally in one iconic group), trimmed to the
/// fields the model needs.
pub(crate) fn abbreviate_taxa(results: &[Value], iconic: Option<&str>) -> Vec<Value> {
    results
        .iter()
        .filter(|taxon| taxon["is_active"].as_bool().unwrap_or(true))
        .filter(|taxon| !taxon["extinct"].as_bool().unwrap_or(false))
        .filter(|taxon| iconic.map_or(true, |name| taxon["iconic_taxon_name"] == name))
        .map(|taxon| {
            let fields: Map<String, Value> = TAXON_FIELDS
                .iter()
                .filter_map(|&key| taxon.get(key).map(|v| (key.to_string(), v.clone())))
                .collect();
            Value::Object(fields)
        })
        .collect()
}
