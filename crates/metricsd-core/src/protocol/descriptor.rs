//! Collector declaration request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of collector a caller may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectorKind {
    Counter,
    Gauge,
    Histogram,
    Summary,
}

impl CollectorKind {
    /// Parse a wire kind name, case-insensitive. `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "counter" => Some(CollectorKind::Counter),
            "gauge" => Some(CollectorKind::Gauge),
            "histogram" => Some(CollectorKind::Histogram),
            "summary" => Some(CollectorKind::Summary),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CollectorKind::Counter => "counter",
            CollectorKind::Gauge => "gauge",
            CollectorKind::Histogram => "histogram",
            CollectorKind::Summary => "summary",
        }
    }
}

impl fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration of a named collector.
///
/// `kind` stays a raw string (`type` on the wire) so an unknown kind reaches
/// the factory and is reported as `UnknownKind` instead of a decode failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorDescriptor {
    /// Collector name, the registry key.
    pub name: String,
    /// Collector kind (field name is `type` in JSON).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub subsystem: String,
    /// Display text only.
    #[serde(default)]
    pub help: String,
    /// Label names. Empty declares a scalar collector, non-empty a vector one.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Histogram bucket upper bounds, increasing. Empty means default ladder.
    #[serde(default)]
    pub buckets: Vec<f64>,
    /// Summary quantile objectives in (0, 1). Empty exports count and sum only.
    #[serde(default)]
    pub objectives: Vec<f64>,
}

impl CollectorDescriptor {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            namespace: String::new(),
            subsystem: String::new(),
            help: String::new(),
            labels: Vec::new(),
            buckets: Vec::new(),
            objectives: Vec::new(),
        }
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = subsystem.into();
        self
    }

    pub fn with_buckets(mut self, buckets: Vec<f64>) -> Self {
        self.buckets = buckets;
        self
    }

    pub fn with_objectives(mut self, objectives: Vec<f64>) -> Self {
        self.objectives = objectives;
        self
    }

    pub fn is_vector(&self) -> bool {
        !self.labels.is_empty()
    }
}
