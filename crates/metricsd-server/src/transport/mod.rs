//! Transport layer (HTTP + JSON).
//!
//! Exposes the five metric calls as JSON endpoints. Request bodies are decoded
//! once by axum's `Json` extractor before they reach the service.

pub mod rpc;
