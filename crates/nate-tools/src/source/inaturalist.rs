//! iNaturalist v1 REST client.

use std::time::Duration;

use async_trait::async_trait;
use nate_common::DataSourceError;
use nate_config::DataSourceConfig;
use serde_json::Value;
use tracing::debug;

use super::{DataSource, ObservationQuery};

pub struct INaturalistClient {
    base_url: String,
    per_page: usize,
    max_observations: usize,
    http: reqwest::Client,
}

impl std::fmt::Debug for INaturalistClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("INaturalistClient")
            .field("base_url", &self.base_url)
            .field("per_page", &self.per_page)
            .field("max_observations", &self.max_observations)
            .finish()
    }
}

impl INaturalistClient {
    pub fn new(config: &DataSourceConfig) -> Result<Self, DataSourceError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("nate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataSourceError::Http(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            per_page: config.per_page.max(1) as usize,
            max_observations: config.max_observations.max(1) as usize,
            http,
        })
    }

    /// GET `path` and return the `results` array and `total_results`.
    async fn get_results(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<(Vec<Value>, Option<u64>), DataSourceError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, ?params, "iNaturalist request");

        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| DataSourceError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataSourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut json: Value = response
            .json()
            .await
            .map_err(|e| DataSourceError::Decode(e.to_string()))?;
        let total = json["total_results"].as_u64();
        match json.get_mut("results").map(Value::take) {
            Some(Value::Array(results)) => Ok((results, total)),
            _ => Err(DataSourceError::Decode(format!(
                "{path}: response has no results array"
            ))),
        }
    }
}

#[async_trait]
impl DataSource for INaturalistClient {
    async fn search_taxa(
        &self,
        query: &str,
        rank: Option<&str>,
    ) -> Result<Vec<Value>, DataSourceError> {
        let mut params = vec![("q", query.to_string())];
        if let Some(rank) = rank {
            params.push(("rank", rank.to_string()));
        }
        Ok(self.get_results("taxa", &params).await?.0)
    }

    async fn search_places(&self, query: &str) -> Result<Vec<Value>, DataSourceError> {
        let params = [("q", query.to_string()), ("order_by", "area".to_string())];
        Ok(self.get_results("places/autocomplete", &params).await?.0)
    }

    async fn fetch_observations(
        &self,
        query: &ObservationQuery,
    ) -> Result<Vec<Value>, DataSourceError> {
        let cap = query
            .limit
            .unwrap_or(self.max_observations)
            .min(self.max_observations);
        let mut records = Vec::new();
        let mut page = 1;

        while records.len() < cap {
            let per_page = self.per_page.min(cap - records.len());
            let mut params = query.filter_params();
            params.push(("order_by", "observed_on".to_string()));
            params.push(("per_page", per_page.to_string()));
            params.push(("page", page.to_string()));

            let (batch, total) = self.get_results("observations", &params).await?;
            let fetched = batch.len();
            records.extend(batch);

            let exhausted = total.is_some_and(|t| records.len() as u64 >= t);
            if fetched < per_page || exhausted {
                break;
            }
            page += 1;
        }

        records.truncate(cap);
        debug!(count = records.len(), pages = page, "Fetched observations");
        Ok(records)
    }

    async fn species_counts(
        &self,
        query: &ObservationQuery,
    ) -> Result<Vec<Value>, DataSourceError> {
        let per_page = query
            .limit
            .unwrap_or(self.per_page)
            .clamp(1, self.per_page);
        let mut params = query.filter_params();
        params.push(("per_page", per_page.to_string()));
        Ok(self
            .get_results("observations/species_counts", &params)
            .await?
            .0)
    }
}
