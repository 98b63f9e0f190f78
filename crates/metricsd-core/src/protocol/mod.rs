//! Request contracts.
//!
//! - `CollectorDescriptor`: one declaration, consumed by a single Declare call.
//! - `MetricUpdate`: one numeric update, consumed by a single Add/Sub/Set/Observe.
//!
//! Both are plain serde value objects; validation happens in the server where
//! the collector primitives live.

pub mod descriptor;
pub mod update;

pub use descriptor::{CollectorDescriptor, CollectorKind};
pub use update::{MetricUpdate, Operation};
