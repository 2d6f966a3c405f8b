//! Biodiversity data source configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    pub base_url: String,
    /// Page size for paginated requests (valid range: 1-200).
    pub per_page: u32,
    /// Upper bound on observations fetched per call (valid range: 1-10000).
    pub max_observations: u32,
    /// Request timeout in seconds (valid range: 1-600).
    pub timeout_secs: u64,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.inaturalist.org/v1".to_string(),
            per_page: 200,
            max_observations: 200,
            timeout_secs: 30,
        }
    }
}
