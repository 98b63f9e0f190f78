//! Shared error type across metricsd crates.

use thiserror::Error;

use crate::protocol::Operation;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Collector name is not declared.
    NotFound,
    /// Collector name is already declared.
    AlreadyExists,
    /// Declaration names an unknown collector type.
    UnknownKind,
    /// Vector collector called without label values.
    LabelsRequired,
    /// Operation is not defined for the collector's variant.
    UnsupportedOperation,
    /// Exposition registration failed.
    RegistrationConflict,
    /// Declaration rejected by the collector primitive.
    InvalidDescriptor,
    /// Label values rejected by the collector primitive.
    InvalidLabels,
    /// Value not acceptable for the operation.
    InvalidValue,
    /// Invalid input / malformed message.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::AlreadyExists => "ALREADY_EXISTS",
            ClientCode::UnknownKind => "UNKNOWN_KIND",
            ClientCode::LabelsRequired => "LABELS_REQUIRED",
            ClientCode::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            ClientCode::RegistrationConflict => "REGISTRATION_CONFLICT",
            ClientCode::InvalidDescriptor => "INVALID_DESCRIPTOR",
            ClientCode::InvalidLabels => "INVALID_LABELS",
            ClientCode::InvalidValue => "INVALID_VALUE",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and server.
///
/// Every collector-scoped variant carries the operation and the collector
/// name so the caller can tell which request failed and why.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("{op}: undefined collector `{name}`, declare it first")]
    NotFound { op: Operation, name: String },
    #[error("{op}: collector `{name}` is already declared")]
    AlreadyExists { op: Operation, name: String },
    #[error("{op}: unknown collector type `{kind}` for `{name}`")]
    UnknownKind {
        op: Operation,
        name: String,
        kind: String,
    },
    #[error("{op}: collector `{name}` requires label values")]
    LabelsRequired { op: Operation, name: String },
    #[error("{op}: collector `{name}` does not support method `{op}`")]
    UnsupportedOperation { op: Operation, name: String },
    #[error("{op}: exposition of `{name}` failed: {reason}")]
    RegistrationConflict {
        op: Operation,
        name: String,
        reason: String,
    },
    #[error("{op}: invalid declaration of `{name}`: {reason}")]
    InvalidDescriptor {
        op: Operation,
        name: String,
        reason: String,
    },
    #[error("{op}: invalid label values for `{name}`: {reason}")]
    InvalidLabels {
        op: Operation,
        name: String,
        reason: String,
    },
    #[error("{op}: invalid value for `{name}`: {reason}")]
    InvalidValue {
        op: Operation,
        name: String,
        reason: String,
    },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl MetricsError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            MetricsError::NotFound { .. } => ClientCode::NotFound,
            MetricsError::AlreadyExists { .. } => ClientCode::AlreadyExists,
            MetricsError::UnknownKind { .. } => ClientCode::UnknownKind,
            MetricsError::LabelsRequired { .. } => ClientCode::LabelsRequired,
            MetricsError::UnsupportedOperation { .. } => ClientCode::UnsupportedOperation,
            MetricsError::RegistrationConflict { .. } => ClientCode::RegistrationConflict,
            MetricsError::InvalidDescriptor { .. } => ClientCode::InvalidDescriptor,
            MetricsError::InvalidLabels { .. } => ClientCode::InvalidLabels,
            MetricsError::InvalidValue { .. } => ClientCode::InvalidValue,
            MetricsError::BadRequest(_) => ClientCode::BadRequest,
            MetricsError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            MetricsError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Collector name the error refers to, if it is collector-scoped.
    pub fn collector(&self) -> Option<&str> {
        match self {
            MetricsError::NotFound { name, .. }
            | MetricsError::AlreadyExists { name, .. }
            | MetricsError::UnknownKind { name, .. }
            | MetricsError::LabelsRequired { name, .. }
            | MetricsError::UnsupportedOperation { name, .. }
            | MetricsError::RegistrationConflict { name, .. }
            | MetricsError::InvalidDescriptor { name, .. }
            | MetricsError::InvalidLabels { name, .. }
            | MetricsError::InvalidValue { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }
}
