//! metricsd core: transport-agnostic request types, operations, and errors.
//!
//! This crate defines the contracts shared by the server, the RPC surface and
//! any client tooling: what a collector declaration looks like, what a metric
//! update carries, and the error taxonomy every call can return. It carries no
//! transport or runtime dependencies so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `MetricsError`/`Result` so a bad request
//! never takes the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ClientCode, MetricsError, Result};
pub use protocol::{CollectorDescriptor, CollectorKind, MetricUpdate, Operation};
