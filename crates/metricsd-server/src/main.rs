//! metricsd server
//!
//! - Metric RPC: POST /v1/metrics/{declare,add,sub,set,observe}
//! - Scrape endpoint: GET /metrics (configurable)
//! - Config path: first CLI argument, default `metricsd.yaml`

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use metricsd_core::error::{MetricsError, Result};
use metricsd_server::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "metricsd stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "metricsd.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "metricsd starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MetricsError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| MetricsError::Internal(format!("server failed: {e}")))
}
