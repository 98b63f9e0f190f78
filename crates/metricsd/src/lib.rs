//! Top-level facade crate for metricsd.
//!
//! Re-exports core types and the server library so users can depend on a single crate.

pub mod core {
    pub use metricsd_core::*;
}

pub mod server {
    pub use metricsd_server::*;
}
