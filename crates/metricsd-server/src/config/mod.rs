//! Config loading. YAML only; unknown keys are errors at every level.

pub mod schema;

use std::fs;
use std::path::Path;

use metricsd_core::error::{MetricsError, Result};

pub use schema::{CollectorSpec, ServerConfig, ServerSection};

/// Read and validate the config at `path`.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<ServerConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        MetricsError::Internal(format!("cannot read config {}: {e}", path.display()))
    })?;
    let cfg = load_from_str(&text)?;
    tracing::debug!(
        path = %path.display(),
        collectors = cfg.collect.len(),
        "config loaded"
    );
    Ok(cfg)
}

/// Parse and validate a config document.
pub fn load_from_str(text: &str) -> Result<ServerConfig> {
    serde_yaml::from_str::<ServerConfig>(text)
        .map_err(|e| MetricsError::BadRequest(format!("config: {e}")))
        .and_then(|cfg| cfg.validate().map(|()| cfg))
}
