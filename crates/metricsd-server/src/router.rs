//! Axum router wiring.
//!
//! Metric calls live under `/v1/metrics/*`; scrape and health endpoints sit
//! alongside them on the same listener.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport::rpc};

pub fn build_router(state: AppState) -> Router {
    let metrics_path = state.cfg().server.metrics_path.clone();
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route(&metrics_path, get(ops::metrics))
        .route("/v1/metrics/declare", post(rpc::declare))
        .route("/v1/metrics/add", post(rpc::add))
        .route("/v1/metrics/sub", post(rpc::sub))
        .route("/v1/metrics/set", post(rpc::set))
        .route("/v1/metrics/observe", post(rpc::observe))
        .with_state(state)
}
