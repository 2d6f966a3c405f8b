//! Configuration validation.
//!
//! Checks numeric ranges and required strings, collecting every problem into
//! a single `ConfigError` so users can fix them in one pass.

mod helpers;

#[cfg(test)]
mod tests;

use crate::schema::NateConfig;
use nate_common::ConfigError;

use helpers::{validate_non_empty, validate_range, validate_range_f64};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &NateConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_non_empty(&mut errors, "model.name", &config.model.name);
    validate_range(&mut errors, "model.max_tokens", config.model.max_tokens.into(), 1, 65536);
    validate_range_f64(&mut errors, "model.temperature", config.model.temperature, 0.0, 2.0);
    validate_range(&mut errors, "model.timeout_secs", config.model.timeout_secs, 1, 600);

    validate_range(
        &mut errors,
        "session.max_tool_rounds",
        config.session.max_tool_rounds.into(),
        1,
        50,
    );
    validate_non_empty(&mut errors, "session.seed_name", &config.session.seed_name);

    validate_non_empty(&mut errors, "data_source.base_url", &config.data_source.base_url);
    validate_range(
        &mut errors,
        "data_source.per_page",
        config.data_source.per_page.into(),
        1,
        200,
    );
    validate_range(
        &mut errors,
        "data_source.max_observations",
        config.data_source.max_observations.into(),
        1,
        10_000,
    );
    validate_range(
        &mut errors,
        "data_source.timeout_secs",
        config.data_source.timeout_secs,
        1,
        600,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
