use std::collections::BTreeMap;
use std::net::SocketAddr;

use metricsd_core::error::{MetricsError, Result};
use metricsd_core::CollectorDescriptor;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    /// Collectors declared at startup, keyed by name.
    #[serde(default)]
    pub collect: BTreeMap<String, CollectorSpec>,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::UnsupportedVersion);
        }

        self.server.validate()?;

        if self.collect.keys().any(|name| name.trim().is_empty()) {
            return Err(MetricsError::BadRequest(
                "collect entries must have a non-empty name".into(),
            ));
        }
        Ok(())
    }

    /// Startup declarations, in name order.
    pub fn descriptors(&self) -> Vec<CollectorDescriptor> {
        self.collect
            .iter()
            .map(|(name, spec)| spec.to_descriptor(name))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !self.metrics_path.starts_with('/') || self.metrics_path.len() < 2 {
            return Err(MetricsError::BadRequest(
                "server.metrics_path must start with '/' and name a path".into(),
            ));
        }
        // Route capture and wildcard syntax.
        if self.metrics_path.contains(['*', ':', '{', '}']) {
            return Err(MetricsError::BadRequest(format!(
                "server.metrics_path {} must be a literal path",
                self.metrics_path
            )));
        }
        if self.metrics_path == "/healthz" || self.metrics_path.starts_with("/v1/") {
            return Err(MetricsError::BadRequest(format!(
                "server.metrics_path {} collides with a built-in route",
                self.metrics_path
            )));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            MetricsError::BadRequest(format!(
                "server.listen must be a valid SocketAddr: {}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "127.0.0.1:2112".into()
}
fn default_metrics_path() -> String {
    "/metrics".into()
}

/// Config form of a collector declaration; the name is the map key.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub subsystem: String,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub buckets: Vec<f64>,
    #[serde(default)]
    pub objectives: Vec<f64>,
}

impl CollectorSpec {
    pub fn to_descriptor(&self, name: &str) -> CollectorDescriptor {
        CollectorDescriptor {
            name: name.to_string(),
            kind: self.kind.clone(),
            namespace: self.namespace.clone(),
            subsystem: self.subsystem.clone(),
            help: self.help.clone(),
            labels: self.labels.clone(),
            buckets: self.buckets.clone(),
            objectives: self.objectives.clone(),
        }
    }
}
