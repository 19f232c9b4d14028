//! Gateway error types and the HTTP status of each orchestrator failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hub_04_orchestrator::HubError;
use thiserror::Error;

/// Message key of a missing or unreadable connection request body.
pub const EMPTY_CONNECTION_REQUEST: &str = "wom.emptyConnectionRequest";

/// Message key of a missing or unreadable disconnection request body.
pub const EMPTY_DISCONNECTION_REQUEST: &str = "wom.emptyDisconnectionRequest";

/// Server lifecycle errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Invalid settings.
    #[error("Invalid gateway configuration: {0}")]
    Config(String),

    /// Listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: std::net::SocketAddr,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Server stopped with an error.
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Failed request: a status and a message key sent as a plain text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Message key, empty for bare statuses.
    pub code: String,
}

impl ApiError {
    /// Error with a message key.
    pub fn new(status: StatusCode, code: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
        }
    }

    /// 400 with `code`.
    pub fn bad_request(code: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code)
    }

    /// Bare 404.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "")
    }
}

impl From<HubError> for ApiError {
    fn from(error: HubError) -> Self {
        let status = match &error {
            HubError::Validation { .. }
            | HubError::ReportNotComplete(_)
            | HubError::ReportBeforeJoin(_)
            | HubError::ReportNotSent(_) => StatusCode::BAD_REQUEST,
            HubError::NotConnected
            | HubError::ReportNotFound(_)
            | HubError::ReportNotFoundInWom(_) => StatusCode::NOT_FOUND,
            HubError::AlreadyDisconnected
            | HubError::ReportRejected { .. }
            | HubError::KeyVault(_)
            | HubError::Federation(_)
            | HubError::Identity(_) => StatusCode::SERVICE_UNAVAILABLE,
            HubError::Encoding(_) | HubError::Collaborator(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::debug!(error = %error, code = error.code(), "[hub-gateway] Request failed");
        }
        Self::new(status, error.code())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.code.is_empty() {
            self.status.into_response()
        } else {
            (self.status, self.code).into_response()
        }
    }
}
