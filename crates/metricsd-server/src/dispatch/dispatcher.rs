use std::sync::Arc;

use metricsd_core::error::{MetricsError, Result};
use metricsd_core::{MetricUpdate, Operation};

use crate::collector::{Collector, Variant};
use crate::registry::CollectorRegistry;

/// Routes Add/Sub/Set/Observe to the collector registered under the update's
/// name, enforcing the capability table and label presence first.
///
/// Label *count* is checked by the collector primitive itself and surfaces as
/// `InvalidLabels`; this layer only requires at least one value for vectors.
/// Label values sent to a scalar collector are ignored.
pub struct Dispatcher {
    registry: Arc<CollectorRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CollectorRegistry>) -> Self {
        Self { registry }
    }

    pub fn add(&self, update: &MetricUpdate) -> Result<()> {
        self.dispatch(Operation::Add, update)
    }

    pub fn sub(&self, update: &MetricUpdate) -> Result<()> {
        self.dispatch(Operation::Sub, update)
    }

    pub fn set(&self, update: &MetricUpdate) -> Result<()> {
        self.dispatch(Operation::Set, update)
    }

    pub fn observe(&self, update: &MetricUpdate) -> Result<()> {
        self.dispatch(Operation::Observe, update)
    }

    pub fn dispatch(&self, op: Operation, update: &MetricUpdate) -> Result<()> {
        let name = update.name.as_str();
        let collector = self
            .registry
            .lookup(name)
            .ok_or_else(|| MetricsError::NotFound {
                op,
                name: name.to_string(),
            })?;

        let variant = collector.variant();
        if variant.is_vector() && update.labels.is_empty() {
            return Err(MetricsError::LabelsRequired {
                op,
                name: name.to_string(),
            });
        }
        if !variant.allows(op) {
            return Err(MetricsError::UnsupportedOperation {
                op,
                name: name.to_string(),
            });
        }
        check_value(op, variant, update)?;

        apply(&collector, op, update)?;
        tracing::debug!(%op, name = %name, value = update.value, labels = ?update.labels, "metric updated");
        Ok(())
    }
}

fn check_value(op: Operation, variant: Variant, update: &MetricUpdate) -> Result<()> {
    let v = update.value;
    let reason = if v.is_nan() {
        Some("value is NaN")
    } else if matches!(variant, Variant::ScalarCounter | Variant::VectorCounter)
        && !(v.is_finite() && v >= 0.0)
    {
        Some("counter increments must be finite and non-negative")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(MetricsError::InvalidValue {
            op,
            name: update.name.clone(),
            reason: reason.into(),
        }),
        None => Ok(()),
    }
}

fn apply(collector: &Collector, op: Operation, update: &MetricUpdate) -> Result<()> {
    let v = update.value;
    let labels: Vec<&str> = update.labels.iter().map(String::as_str).collect();
    let bad_labels = |e: prometheus::Error| MetricsError::InvalidLabels {
        op,
        name: update.name.clone(),
        reason: e.to_string(),
    };

    match (collector, op) {
        (Collector::Counter(c), Operation::Add) => c.inc_by(v),
        (Collector::CounterVec(c), Operation::Add) => {
            c.get_metric_with_label_values(&labels).map_err(bad_labels)?.inc_by(v)
        }

        (Collector::Gauge(g), Operation::Add) => g.add(v),
        (Collector::Gauge(g), Operation::Sub) => g.sub(v),
        (Collector::Gauge(g), Operation::Set) => g.set(v),
        (Collector::GaugeVec(g), Operation::Add) => {
            g.get_metric_with_label_values(&labels).map_err(bad_labels)?.add(v)
        }
        (Collector::GaugeVec(g), Operation::Sub) => {
            g.get_metric_with_label_values(&labels).map_err(bad_labels)?.sub(v)
        }
        (Collector::GaugeVec(g), Operation::Set) => {
            g.get_metric_with_label_values(&labels).map_err(bad_labels)?.set(v)
        }

        (Collector::Histogram(h), Operation::Observe) => h.observe(v),
        (Collector::HistogramVec(h), Operation::Observe) => {
            h.get_metric_with_label_values(&labels).map_err(bad_labels)?.observe(v)
        }

        (Collector::Summary(s), Operation::Observe) => s.observe(v),
        (Collector::SummaryVec(s), Operation::Observe) => {
            s.get_metric_with_label_values(&labels).map_err(bad_labels)?.observe(v)
        }

        // Unreachable after `Variant::allows`.
        _ => {
            return Err(MetricsError::UnsupportedOperation {
                op,
                name: update.name.clone(),
            })
        }
    }
    Ok(())
}
