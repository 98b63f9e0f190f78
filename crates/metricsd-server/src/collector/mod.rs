//! Collector variants and the operation capability table.
//!
//! The variant set is closed: every declared collector is one of eight tagged
//! variants, and `Variant::allows` is the only place that decides which
//! operation a variant accepts.

pub mod factory;
pub mod summary;

use metricsd_core::Operation;
use prometheus::{Counter, CounterVec, Gauge, GaugeVec, Histogram, HistogramVec};

pub use factory::build;
pub use summary::{Summary, SummaryChild, SummaryOpts, SummaryVec};

/// A declared collector. Cloning shares the underlying numeric state.
#[derive(Clone)]
pub enum Collector {
    Counter(Counter),
    CounterVec(CounterVec),
    Gauge(Gauge),
    GaugeVec(GaugeVec),
    Histogram(Histogram),
    HistogramVec(HistogramVec),
    Summary(Summary),
    SummaryVec(SummaryVec),
}

/// Tag of a [`Collector`], without its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    ScalarCounter,
    VectorCounter,
    ScalarGauge,
    VectorGauge,
    ScalarHistogram,
    VectorHistogram,
    ScalarSummary,
    VectorSummary,
}

impl Variant {
    pub const ALL: [Variant; 8] = [
        Variant::ScalarCounter,
        Variant::VectorCounter,
        Variant::ScalarGauge,
        Variant::VectorGauge,
        Variant::ScalarHistogram,
        Variant::VectorHistogram,
        Variant::ScalarSummary,
        Variant::VectorSummary,
    ];

    pub fn is_vector(self) -> bool {
        matches!(
            self,
            Variant::VectorCounter
                | Variant::VectorGauge
                | Variant::VectorHistogram
                | Variant::VectorSummary
        )
    }

    /// Operation compatibility table.
    ///
    /// | variant   | Add | Sub | Set | Observe |
    /// |-----------|-----|-----|-----|---------|
    /// | counter   | yes | no  | no  | no      |
    /// | gauge     | yes | yes | yes | no      |
    /// | histogram | no  | no  | no  | yes     |
    /// | summary   | no  | no  | no  | yes     |
    ///
    /// Counters are monotonic, hence no `Sub`. `Declare` is never an update.
    pub fn allows(self, op: Operation) -> bool {
        use Operation::*;
        use Variant::*;
        matches!(
            (self, op),
            (ScalarCounter | VectorCounter, Add)
                | (ScalarGauge | VectorGauge, Add | Sub | Set)
                | (
                    ScalarHistogram | VectorHistogram | ScalarSummary | VectorSummary,
                    Observe
                )
        )
    }
}

impl Collector {
    pub fn variant(&self) -> Variant {
        match self {
            Collector::Counter(_) => Variant::ScalarCounter,
            Collector::CounterVec(_) => Variant::VectorCounter,
            Collector::Gauge(_) => Variant::ScalarGauge,
            Collector::GaugeVec(_) => Variant::VectorGauge,
            Collector::Histogram(_) => Variant::ScalarHistogram,
            Collector::HistogramVec(_) => Variant::VectorHistogram,
            Collector::Summary(_) => Variant::ScalarSummary,
            Collector::SummaryVec(_) => Variant::VectorSummary,
        }
    }

    /// Boxed handle for the exposition registry; shares state with `self`.
    pub fn boxed(&self) -> Box<dyn prometheus::core::Collector> {
        match self {
            Collector::Counter(c) => Box::new(c.clone()),
            Collector::CounterVec(c) => Box::new(c.clone()),
            Collector::Gauge(c) => Box::new(c.clone()),
            Collector::GaugeVec(c) => Box::new(c.clone()),
            Collector::Histogram(c) => Box::new(c.clone()),
            Collector::HistogramVec(c) => Box::new(c.clone()),
            Collector::Summary(c) => Box::new(c.clone()),
            Collector::SummaryVec(c) => Box::new(c.clone()),
        }
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Collector").field(&self.variant()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_is_never_allowed() {
        for v in Variant::ALL {
            assert!(!v.allows(Operation::Declare), "{v:?}");
        }
    }

    #[test]
    fn every_variant_accepts_exactly_its_operations() {
        let ops = [Operation::Add, Operation::Sub, Operation::Set, Operation::Observe];
        for v in Variant::ALL {
            let allowed: Vec<Operation> = ops.into_iter().filter(|op| v.allows(*op)).collect();
            let expect = match v {
                Variant::ScalarCounter | Variant::VectorCounter => vec![Operation::Add],
                Variant::ScalarGauge | Variant::VectorGauge => {
                    vec![Operation::Add, Operation::Sub, Operation::Set]
                }
                _ => vec![Operation::Observe],
            };
            assert_eq!(allowed, expect, "{v:?}");
        }
    }

    #[test]
    fn vector_variants() {
        let vectors: Vec<Variant> = Variant::ALL.into_iter().filter(|v| v.is_vector()).collect();
        assert_eq!(vectors.len(), 4);
        assert!(!Variant::ScalarSummary.is_vector());
    }
}
