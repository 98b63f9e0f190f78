//! Metric update request and the operations that consume it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Calls the registry answers. `Declare` creates; the other four mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Declare,
    Add,
    Sub,
    Set,
    Observe,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Declare => "Declare",
            Operation::Add => "Add",
            Operation::Sub => "Sub",
            Operation::Set => "Set",
            Operation::Observe => "Observe",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One numeric update pushed to a declared collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricUpdate {
    /// Collector name.
    pub name: String,
    pub value: f64,
    /// Label values, positionally aligned with the declared label names.
    /// Only meaningful for vector collectors.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl MetricUpdate {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            labels: Vec::new(),
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
}
