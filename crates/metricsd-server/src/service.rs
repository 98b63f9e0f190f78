//! Metrics service: Declare orchestration plus the four update operations.
//!
//! Declare order:
//! 1. reject a live name (`AlreadyExists`)
//! 2. build the collector (`UnknownKind`, `InvalidDescriptor`)
//! 3. claim the name in the registry (`AlreadyExists` when a concurrent
//!    Declare got there first)
//! 4. register with the exposition (`RegistrationConflict`); on failure the
//!    claim is released, so the name never becomes usable and can be
//!    declared again later
//! 5. make the collector visible to updates

use std::sync::Arc;

use metricsd_core::error::{MetricsError, Result};
use metricsd_core::{CollectorDescriptor, MetricUpdate, Operation};

use crate::collector;
use crate::dispatch::Dispatcher;
use crate::exposition::{self, Exposition};
use crate::registry::CollectorRegistry;

pub struct MetricsService {
    registry: Arc<CollectorRegistry>,
    dispatcher: Dispatcher,
    exposition: Arc<dyn Exposition>,
}

impl MetricsService {
    pub fn new(exposition: Arc<dyn Exposition>) -> Self {
        let registry = Arc::new(CollectorRegistry::new());
        Self {
            dispatcher: Dispatcher::new(Arc::clone(&registry)),
            registry,
            exposition,
        }
    }

    pub fn declare(&self, desc: &CollectorDescriptor) -> Result<()> {
        let already = || MetricsError::AlreadyExists {
            op: Operation::Declare,
            name: desc.name.clone(),
        };

        if self.registry.lookup(&desc.name).is_some() {
            return Err(already());
        }

        let collector = collector::build(desc)?;
        let variant = collector.variant();

        let inserted = self
            .registry
            .insert_if_absent_with(&desc.name, collector, |c| {
                exposition::publish(self.exposition.as_ref(), &desc.name, c)
            })
            .map_err(|e| {
                tracing::warn!(name = %desc.name, error = %e, "collector exposition failed");
                e
            })?;
        if !inserted {
            return Err(already());
        }

        tracing::info!(name = %desc.name, ?variant, labels = ?desc.labels, "collector declared");
        Ok(())
    }

    pub fn add(&self, update: &MetricUpdate) -> Result<()> {
        self.dispatcher.add(update)
    }

    pub fn sub(&self, update: &MetricUpdate) -> Result<()> {
        self.dispatcher.sub(update)
    }

    pub fn set(&self, update: &MetricUpdate) -> Result<()> {
        self.dispatcher.set(update)
    }

    pub fn observe(&self, update: &MetricUpdate) -> Result<()> {
        self.dispatcher.observe(update)
    }

    pub fn registry(&self) -> &CollectorRegistry {
        &self.registry
    }

    pub fn exposition(&self) -> &dyn Exposition {
        self.exposition.as_ref()
    }
}
