//! Loosely-typed biodiversity records from an external provider.

mod inaturalist;

use async_trait::async_trait;
use chrono::NaiveDate;
use nate_common::DataSourceError;
use serde_json::Value;

pub use inaturalist::INaturalistClient;

/// Filters for observation and species-count queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationQuery {
    pub taxon_id: Option<i64>,
    pub place_id: Option<i64>,
    /// Observed on or after.
    pub d1: Option<NaiveDate>,
    /// Observed on or before.
    pub d2: Option<NaiveDate>,
    /// Requested record count; the source may cap it further.
    pub limit: Option<usize>,
}

impl ObservationQuery {
    pub(crate) fn filter_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.taxon_id {
            params.push(("taxon_id", id.to_string()));
        }
        if let Some(id) = self.place_id {
            params.push(("place_id", id.to_string()));
        }
        if let Some(d) = self.d1 {
            params.push(("d1", d.format("%Y-%m-%d").to_string()));
        }
        if let Some(d) = self.d2 {
            params.push(("d2", d.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

/// A provider of taxon, place and observation records. Each method returns
/// the provider's raw result objects.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn search_taxa(
        &self,
        query: &str,
        rank: Option<&str>,
    ) -> Result<Vec<Value>, DataSourceError>;

    async fn search_places(&self, query: &str) -> Result<Vec<Value>, DataSourceError>;

    /// Observation records, paginated internally up to the requested cap.
    async fn fetch_observations(
        &self,
        query: &ObservationQuery,
    ) -> Result<Vec<Value>, DataSourceError>;

    /// Per-species observation counts for the filters.
    async fn species_counts(
        &self,
        query: &ObservationQuery,
    ) -> Result<Vec<Value>, DataSourceError>;
}
