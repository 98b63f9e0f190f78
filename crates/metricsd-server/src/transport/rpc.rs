//! Metric RPC handlers.
//!
//! - `POST /v1/metrics/declare`  body: `CollectorDescriptor`
//! - `POST /v1/metrics/add`      body: `MetricUpdate`
//! - `POST /v1/metrics/sub`      body: `MetricUpdate`
//! - `POST /v1/metrics/set`      body: `MetricUpdate`
//! - `POST /v1/metrics/observe`  body: `MetricUpdate`
//!
//! Every call answers `{"ok": true}` or `{"ok": false, "error": {...}}`.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use metricsd_core::error::{ClientCode, MetricsError, Result};
use metricsd_core::{CollectorDescriptor, MetricUpdate};

use crate::app_state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Reply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReplyError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReplyError {
    pub code: String,
    pub msg: String,
}

impl Reply {
    pub fn ok() -> Self {
        Self { ok: true, error: None }
    }

    pub fn from_error(e: &MetricsError) -> Self {
        Self {
            ok: false,
            error: Some(ReplyError {
                code: e.client_code().as_str().to_string(),
                msg: e.to_string(),
            }),
        }
    }
}

pub type RpcResponse = (StatusCode, Json<Reply>);

pub async fn declare(State(app): State<AppState>, Json(desc): Json<CollectorDescriptor>) -> RpcResponse {
    respond(app.service().declare(&desc))
}

pub async fn add(State(app): State<AppState>, Json(update): Json<MetricUpdate>) -> RpcResponse {
    respond(app.service().add(&update))
}

pub async fn sub(State(app): State<AppState>, Json(update): Json<MetricUpdate>) -> RpcResponse {
    respond(app.service().sub(&update))
}

pub async fn set(State(app): State<AppState>, Json(update): Json<MetricUpdate>) -> RpcResponse {
    respond(app.service().set(&update))
}

pub async fn observe(State(app): State<AppState>, Json(update): Json<MetricUpdate>) -> RpcResponse {
    respond(app.service().observe(&update))
}

fn respond(result: Result<()>) -> RpcResponse {
    match result {
        Ok(()) => (StatusCode::OK, Json(Reply::ok())),
        Err(e) => {
            let code = e.client_code();
            tracing::warn!(code = code.as_str(), error = %e, "metric call rejected");
            (status_for(code), Json(Reply::from_error(&e)))
        }
    }
}

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::NotFound => StatusCode::NOT_FOUND,
        ClientCode::AlreadyExists | ClientCode::RegistrationConflict => StatusCode::CONFLICT,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}
