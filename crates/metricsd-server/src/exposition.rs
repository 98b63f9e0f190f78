//! Exposition boundary.
//!
//! Declared collectors become scrapeable by registering them with an
//! [`Exposition`]. Registration is the one call in the system that may fail for
//! reasons outside the registry's control (identity collisions inside the
//! exposition registry) or even panic; [`publish`] is the single place where
//! both outcomes are turned into `RegistrationConflict`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use metricsd_core::error::{MetricsError, Result};
use metricsd_core::Operation;
use prometheus::proto::MetricFamily;

use crate::collector::Collector;

/// Process-wide mechanism that makes collectors visible to scrapes.
pub trait Exposition: Send + Sync {
    fn register(&self, collector: Box<dyn prometheus::core::Collector>) -> prometheus::Result<()>;

    /// Snapshot of every registered collector.
    fn gather(&self) -> Vec<MetricFamily>;
}

/// [`Exposition`] backed by a `prometheus::Registry`.
#[derive(Clone, Default)]
pub struct PrometheusExposition {
    registry: prometheus::Registry,
}

impl PrometheusExposition {
    pub fn new() -> Self {
        Self {
            registry: prometheus::Registry::new(),
        }
    }
}

impl Exposition for PrometheusExposition {
    fn register(&self, collector: Box<dyn prometheus::core::Collector>) -> prometheus::Result<()> {
        self.registry.register(collector)
    }

    fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}

/// Register `collector` under `name`, converting errors and panics raised by
/// the exposition into `RegistrationConflict`.
pub fn publish(exposition: &dyn Exposition, name: &str, collector: &Collector) -> Result<()> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| exposition.register(collector.boxed())));
    let reason = match outcome {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(e)) => e.to_string(),
        Err(payload) => format!("exposition panicked: {}", panic_message(payload.as_ref())),
    };
    Err(MetricsError::RegistrationConflict {
        op: Operation::Declare,
        name: name.to_string(),
        reason,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use metricsd_core::CollectorDescriptor;

    struct PanickingExposition;

    impl Exposition for PanickingExposition {
        fn register(&self, _: Box<dyn prometheus::core::Collector>) -> prometheus::Result<()> {
            panic!("descriptor collides with an exported metric");
        }

        fn gather(&self) -> Vec<MetricFamily> {
            Vec::new()
        }
    }

    fn counter(name: &str) -> Collector {
        crate::collector::build(&CollectorDescriptor::new(name, "counter")).unwrap()
    }

    #[test]
    fn duplicate_identity_is_conflict() {
        let expo = PrometheusExposition::new();
        publish(&expo, "c", &counter("c")).unwrap();
        let err = publish(&expo, "c", &counter("c")).unwrap_err();
        assert_eq!(err.client_code().as_str(), "REGISTRATION_CONFLICT");
    }

    #[test]
    fn panic_is_contained() {
        let err = publish(&PanickingExposition, "c", &counter("c")).unwrap_err();
        assert_eq!(err.client_code().as_str(), "REGISTRATION_CONFLICT");
        assert!(err.to_string().contains("collides"));
    }
}
