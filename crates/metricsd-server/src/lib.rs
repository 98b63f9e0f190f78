//! metricsd server library entry.
//!
//! This crate wires the collector factory, registry, dispatcher and exposition
//! boundary into the metrics service, and puts the HTTP surface, config and
//! application state around it. It is intended to be consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod collector;
pub mod config;
pub mod dispatch;
pub mod exposition;
pub mod ops;
pub mod registry;
pub mod router;
pub mod service;
pub mod transport;
