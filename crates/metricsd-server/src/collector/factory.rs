//! Build a collector from its declaration.
//!
//! Pure: nothing here touches the registry or the exposition registry.

use metricsd_core::error::{MetricsError, Result};
use metricsd_core::{CollectorDescriptor, CollectorKind, Operation};
use prometheus::{
    Counter, CounterVec, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramVec, Opts,
};

use super::summary::{Summary, SummaryOpts, SummaryVec};
use super::Collector;

/// Map a descriptor to one concrete variant.
///
/// Scalar vs vector is decided solely by whether `labels` is empty.
/// Histogram buckets fall back to `prometheus::DEFAULT_BUCKETS`.
pub fn build(desc: &CollectorDescriptor) -> Result<Collector> {
    let kind = CollectorKind::parse(&desc.kind).ok_or_else(|| MetricsError::UnknownKind {
        op: Operation::Declare,
        name: desc.name.clone(),
        kind: desc.kind.clone(),
    })?;

    let invalid = |e: prometheus::Error| MetricsError::InvalidDescriptor {
        op: Operation::Declare,
        name: desc.name.clone(),
        reason: e.to_string(),
    };

    let opts = common_opts(desc);
    let labels: Vec<&str> = desc.labels.iter().map(String::as_str).collect();
    let scalar = labels.is_empty();

    let collector = match kind {
        CollectorKind::Counter if scalar => {
            Collector::Counter(Counter::with_opts(opts).map_err(invalid)?)
        }
        CollectorKind::Counter => {
            Collector::CounterVec(CounterVec::new(opts, &labels).map_err(invalid)?)
        }
        CollectorKind::Gauge if scalar => Collector::Gauge(Gauge::with_opts(opts).map_err(invalid)?),
        CollectorKind::Gauge => Collector::GaugeVec(GaugeVec::new(opts, &labels).map_err(invalid)?),
        CollectorKind::Histogram => {
            let buckets = if desc.buckets.is_empty() {
                prometheus::DEFAULT_BUCKETS.to_vec()
            } else {
                desc.buckets.clone()
            };
            let hopts = HistogramOpts {
                common_opts: opts,
                buckets,
            };
            if scalar {
                Collector::Histogram(Histogram::with_opts(hopts).map_err(invalid)?)
            } else {
                Collector::HistogramVec(HistogramVec::new(hopts, &labels).map_err(invalid)?)
            }
        }
        CollectorKind::Summary => {
            let sopts = SummaryOpts::new(opts).objectives(desc.objectives.clone());
            if scalar {
                Collector::Summary(Summary::with_opts(sopts).map_err(invalid)?)
            } else {
                Collector::SummaryVec(SummaryVec::new(sopts, &labels).map_err(invalid)?)
            }
        }
    };

    Ok(collector)
}

fn common_opts(desc: &CollectorDescriptor) -> Opts {
    // The exposition format requires a help string; fall back to the name.
    let help = if desc.help.trim().is_empty() {
        desc.name.clone()
    } else {
        desc.help.clone()
    };
    Opts::new(desc.name.clone(), help)
        .namespace(desc.namespace.clone())
        .subsystem(desc.subsystem.clone())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::collector::Variant;

    #[test]
    fn labels_decide_scalarity() {
        let cases = [
            ("counter", Variant::ScalarCounter, Variant::VectorCounter),
            ("gauge", Variant::ScalarGauge, Variant::VectorGauge),
            ("histogram", Variant::ScalarHistogram, Variant::VectorHistogram),
            ("summary", Variant::ScalarSummary, Variant::VectorSummary),
        ];
        for (kind, scalar, vector) in cases {
            let d = CollectorDescriptor::new("m", kind);
            assert_eq!(build(&d).unwrap().variant(), scalar);
            let d = d.with_labels(["a", "b"]);
            assert_eq!(build(&d).unwrap().variant(), vector);
        }
    }

    #[test]
    fn unknown_kind() {
        let err = build(&CollectorDescriptor::new("m", "meter")).unwrap_err();
        assert_eq!(err.client_code().as_str(), "UNKNOWN_KIND");
        assert_eq!(err.collector(), Some("m"));
    }

    #[test]
    fn histogram_buckets_must_increase() {
        let d = CollectorDescriptor::new("lat", "histogram").with_buckets(vec![1.0, 0.5]);
        let err = build(&d).unwrap_err();
        assert_eq!(err.client_code().as_str(), "INVALID_DESCRIPTOR");
    }

    #[test]
    fn custom_buckets_applied() {
        let d = CollectorDescriptor::new("lat", "histogram").with_buckets(vec![0.1, 1.0]);
        let Collector::Histogram(h) = build(&d).unwrap() else {
            panic!("expected scalar histogram");
        };
        h.observe(0.5);
        h.observe(5.0);
        assert_eq!(h.get_sample_count(), 2);
    }

    #[test]
    fn invalid_metric_name() {
        let err = build(&CollectorDescriptor::new("bad-name", "gauge")).unwrap_err();
        assert_eq!(err.client_code().as_str(), "INVALID_DESCRIPTOR");
    }

    #[test]
    fn empty_help_is_replaced() {
        assert!(build(&CollectorDescriptor::new("no_help", "counter")).is_ok());
    }
}
