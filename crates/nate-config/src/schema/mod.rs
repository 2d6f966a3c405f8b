//! Configuration schema types for Nate.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod data_source;
mod logging;
mod model;
mod session;

pub use data_source::*;
pub use logging::*;
pub use model::*;
pub use session::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NateConfig {
    pub model: ModelConfig,
    pub session: SessionConfig,
    pub data_source: DataSourceConfig,
    pub logging: LoggingConfig,
}
