//! Summary collector.
//!
//! The prometheus crate ships no summary type, so this module provides one
//! that plugs into the same `Registry`/`TextEncoder` pipeline by implementing
//! `prometheus::core::Collector`. Each series keeps an exact sample count and
//! sum. Samples land in a lock-free `AtomicBucket` and are folded into a
//! `metrics_util::Summary` sketch at collect time, where the quantile
//! objectives are read.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use metrics_util::{AtomicBucket, Summary as Sketch};
use prometheus::core::{Atomic, AtomicF64, AtomicU64, Collector, Desc};
use prometheus::proto::{LabelPair, Metric, MetricFamily, MetricType, Quantile};
use prometheus::{Error, Opts};

/// Options for [`Summary`] and [`SummaryVec`].
#[derive(Debug, Clone)]
pub struct SummaryOpts {
    pub common_opts: Opts,
    /// Quantiles to export, each in (0, 1).
    pub objectives: Vec<f64>,
}

impl SummaryOpts {
    pub fn new(common_opts: Opts) -> Self {
        Self {
            common_opts,
            objectives: Vec::new(),
        }
    }

    pub fn objectives(mut self, objectives: Vec<f64>) -> Self {
        self.objectives = objectives;
        self
    }

    fn validate(&self, label_names: &[&str]) -> prometheus::Result<()> {
        for &q in &self.objectives {
            if !(q > 0.0 && q < 1.0) {
                return Err(Error::Msg(format!(
                    "summary objective {q} must be within (0, 1)"
                )));
            }
        }
        if label_names.contains(&"quantile") {
            return Err(Error::Msg(
                "`quantile` is reserved as a summary label name".into(),
            ));
        }
        Ok(())
    }

    fn describe(&self, label_names: &[&str]) -> prometheus::Result<Desc> {
        self.validate(label_names)?;
        let help = self.common_opts.help.clone();
        Desc::new(
            self.common_opts.fq_name(),
            help,
            label_names.iter().map(|l| (*l).to_string()).collect(),
            self.common_opts.const_labels.clone(),
        )
    }
}

/// One series: exact count and sum, pending samples and the quantile sketch.
struct Series {
    count: AtomicU64,
    sum: AtomicF64,
    pending: AtomicBucket<f64>,
    sketch: Mutex<Sketch>,
}

impl Default for Series {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicF64::new(0.0),
            pending: AtomicBucket::new(),
            sketch: Mutex::new(Sketch::with_defaults()),
        }
    }
}

impl Series {
    fn observe(&self, v: f64) {
        self.pending.push(v);
        self.sum.inc_by(v);
        self.count.inc_by(1);
    }

    fn count(&self) -> u64 {
        self.count.get()
    }

    fn sum(&self) -> f64 {
        self.sum.get()
    }

    /// Fold pending samples into the sketch and read each objective.
    /// NaN when nothing has been observed.
    fn quantiles(&self, objectives: &[f64]) -> Vec<f64> {
        if objectives.is_empty() {
            self.pending.clear();
            return Vec::new();
        }
        let mut sketch = self.sketch.lock().unwrap_or_else(PoisonError::into_inner);
        self.pending.clear_with(|block| {
            for &v in block {
                sketch.add(v);
            }
        });
        objectives
            .iter()
            .map(|&q| sketch.quantile(q).unwrap_or(f64::NAN))
            .collect()
    }

    fn metric(&self, objectives: &[f64], labels: &[LabelPair]) -> Metric {
        let values = self.quantiles(objectives);

        let mut summary = prometheus::proto::Summary::default();
        summary.set_sample_count(self.count());
        summary.set_sample_sum(self.sum());
        for (&q, value) in objectives.iter().zip(values) {
            let mut quantile = Quantile::default();
            quantile.set_quantile(q);
            quantile.set_value(value);
            summary.mut_quantile().push(quantile);
        }

        let mut metric = Metric::default();
        for pair in labels {
            metric.mut_label().push(pair.clone());
        }
        metric.set_summary(summary);
        metric
    }
}

fn family(desc: &Desc, metrics: Vec<Metric>) -> MetricFamily {
    let mut mf = MetricFamily::default();
    mf.set_name(desc.fq_name.clone());
    mf.set_help(desc.help.clone());
    mf.set_field_type(MetricType::SUMMARY);
    for m in metrics {
        mf.mut_metric().push(m);
    }
    mf
}

struct SummaryCore {
    desc: Desc,
    objectives: Vec<f64>,
    series: Series,
}

/// Scalar summary.
#[derive(Clone)]
pub struct Summary {
    core: Arc<SummaryCore>,
}

impl Summary {
    pub fn with_opts(opts: SummaryOpts) -> prometheus::Result<Self> {
        let desc = opts.describe(&[])?;
        Ok(Self {
            core: Arc::new(SummaryCore {
                desc,
                objectives: opts.objectives,
                series: Series::default(),
            }),
        })
    }

    /// Record one sample.
    pub fn observe(&self, v: f64) {
        self.core.series.observe(v);
    }

    pub fn get_sample_count(&self) -> u64 {
        self.core.series.count()
    }

    pub fn get_sample_sum(&self) -> f64 {
        self.core.series.sum()
    }
}

impl Collector for Summary {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.core.desc]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let metric = self.core.series.metric(&self.core.objectives, &[]);
        vec![family(&self.core.desc, vec![metric])]
    }
}

struct SummaryVecCore {
    desc: Desc,
    objectives: Vec<f64>,
    children: DashMap<Vec<String>, Arc<Series>>,
}

/// Summary partitioned by label values.
#[derive(Clone)]
pub struct SummaryVec {
    core: Arc<SummaryVecCore>,
}

/// Handle to one labeled series of a [`SummaryVec`].
#[derive(Clone)]
pub struct SummaryChild {
    series: Arc<Series>,
}

impl SummaryChild {
    pub fn observe(&self, v: f64) {
        self.series.observe(v);
    }

    pub fn get_sample_count(&self) -> u64 {
        self.series.count()
    }

    pub fn get_sample_sum(&self) -> f64 {
        self.series.sum()
    }
}

impl SummaryVec {
    pub fn new(opts: SummaryOpts, label_names: &[&str]) -> prometheus::Result<Self> {
        let desc = opts.describe(label_names)?;
        Ok(Self {
            core: Arc::new(SummaryVecCore {
                desc,
                objectives: opts.objectives,
                children: DashMap::new(),
            }),
        })
    }

    /// Resolve the series for `vals`, creating it on first use.
    /// Fails when the value count differs from the declared label names.
    pub fn get_metric_with_label_values(&self, vals: &[&str]) -> prometheus::Result<SummaryChild> {
        let expect = self.core.desc.variable_labels.len();
        if vals.len() != expect {
            return Err(Error::Msg(format!(
                "inconsistent label cardinality, expect {expect} label values, but got {}",
                vals.len()
            )));
        }

        let key: Vec<String> = vals.iter().map(|v| (*v).to_string()).collect();
        let series = self
            .core
            .children
            .entry(key)
            .or_insert_with(|| Arc::new(Series::default()))
            .value()
            .clone();
        Ok(SummaryChild { series })
    }
}

impl Collector for SummaryVec {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.core.desc]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let names = &self.core.desc.variable_labels;
        let mut metrics: Vec<Metric> = self
            .core
            .children
            .iter()
            .map(|entry| {
                let labels: Vec<LabelPair> = names
                    .iter()
                    .zip(entry.key().iter())
                    .map(|(name, value)| {
                        let mut pair = LabelPair::default();
                        pair.set_name(name.clone());
                        pair.set_value(value.clone());
                        pair
                    })
                    .collect();
                entry.value().metric(&self.core.objectives, &labels)
            })
            .collect();
        if metrics.is_empty() {
            return Vec::new();
        }

        // DashMap iteration order is unstable; keep scrapes deterministic.
        metrics.sort_by(|a, b| {
            let key = |m: &Metric| -> Vec<String> {
                m.get_label().iter().map(|p| p.get_value().to_string()).collect()
            };
            key(a).cmp(&key(b))
        });
        vec![family(&self.core.desc, metrics)]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn opts(name: &str) -> SummaryOpts {
        SummaryOpts::new(Opts::new(name, "test summary"))
    }

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() <= expected.abs() * 0.01
    }

    #[test]
    fn scalar_tracks_count_and_sum() {
        let s = Summary::with_opts(opts("s").objectives(vec![0.5])).unwrap();
        for v in [1.0, 2.0, 3.0] {
            s.observe(v);
        }
        assert_eq!(s.get_sample_count(), 3);
        assert_eq!(s.get_sample_sum(), 6.0);

        let mfs = s.collect();
        assert_eq!(mfs.len(), 1);
        let summary = mfs[0].get_metric()[0].get_summary();
        assert_eq!(summary.get_sample_count(), 3);
        assert!(close(summary.get_quantile()[0].get_value(), 2.0));
    }

    #[test]
    fn quantiles_accumulate_across_scrapes() {
        let s = Summary::with_opts(opts("acc").objectives(vec![0.5, 0.9])).unwrap();
        for v in 1..=500 {
            s.observe(v as f64);
        }
        s.collect();
        for v in 501..=1000 {
            s.observe(v as f64);
        }

        let mfs = s.collect();
        let summary = mfs[0].get_metric()[0].get_summary();
        assert_eq!(summary.get_sample_count(), 1000);
        assert!(close(summary.get_quantile()[0].get_value(), 500.0));
        assert!(close(summary.get_quantile()[1].get_value(), 900.0));
    }

    #[test]
    fn empty_series_reports_nan() {
        let s = Summary::with_opts(opts("e").objectives(vec![0.99])).unwrap();
        let mfs = s.collect();
        let summary = mfs[0].get_metric()[0].get_summary();
        assert_eq!(summary.get_sample_count(), 0);
        assert!(summary.get_quantile()[0].get_value().is_nan());
    }

    #[test]
    fn objectives_out_of_range_rejected() {
        assert!(Summary::with_opts(opts("bad").objectives(vec![1.0])).is_err());
        assert!(Summary::with_opts(opts("bad").objectives(vec![0.0])).is_err());
    }

    #[test]
    fn quantile_label_reserved() {
        assert!(SummaryVec::new(opts("q"), &["quantile"]).is_err());
    }

    #[test]
    fn vec_checks_label_cardinality() {
        let v = SummaryVec::new(opts("sv"), &["method", "code"]).unwrap();
        assert!(v.get_metric_with_label_values(&["GET"]).is_err());

        let child = v.get_metric_with_label_values(&["GET", "200"]).unwrap();
        child.observe(0.25);
        let again = v.get_metric_with_label_values(&["GET", "200"]).unwrap();
        assert_eq!(again.get_sample_count(), 1);

        let mfs = v.collect();
        let metric = &mfs[0].get_metric()[0];
        assert_eq!(metric.get_label()[0].get_name(), "method");
        assert_eq!(metric.get_label()[1].get_value(), "200");
    }
}
