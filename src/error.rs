use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::signup::FieldErrors;

/// Generic body returned whenever a proxy route fails locally.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Configuration errors raised while reading the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("BASE_URL must use https in production (got {0})")]
    InsecureBackend(String),
}

/// Errors that can occur while forwarding a request to the backend
///
/// None of these leak to the caller: everything except a missing
/// `Authorization` header is reported as a generic 500.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Authorization header missing")]
    MissingAuthorization,

    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Backend request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ProxyError::MissingAuthorization => {
                (StatusCode::UNAUTHORIZED, "Authorization header missing")
            }
            ProxyError::MalformedBody(_)
            | ProxyError::Upstream(_)
            | ProxyError::InvalidHeader(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE)
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Errors returned by the client side of the proxy routes
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The route answered with a non-success status. `body` is the JSON the
    /// backend produced, relayed unchanged by the proxy.
    #[error("Request rejected with status {status}")]
    Rejected { status: u16, body: serde_json::Value },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors from the durable key-value storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ClientError),

    #[error("Invalid session data: {0}")]
    Decode(String),
}

/// Errors surfaced by the page flows
#[derive(Debug, Error)]
pub enum FlowError {
    /// Local validation or backend-reported field errors
    #[error("Form has {} invalid field(s)", .0.len())]
    Invalid(FieldErrors),

    #[error("No role has been selected for this signup")]
    MissingRole,

    /// The feature is gated behind verification
    #[error("Verification required before {0}")]
    Restricted(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<StorageError> for FlowError {
    fn from(err: StorageError) -> Self {
        FlowError::Session(SessionError::Storage(err))
    }
}

impl FlowError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            FlowError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}
