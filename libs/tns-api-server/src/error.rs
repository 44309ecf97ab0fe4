use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use tns_registry::{ErrorClass, RegistryError};

/// Error body: `{"error": "<message>"}`.
#[derive(Serialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// Everything a handler can fail with.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("Invalid request payload")]
    InvalidPayload,

    #[error("topic healthcheck is not implemented")]
    NotImplemented,

    /// An extractor refused the request before the handler ran.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl From<PathRejection> for ApiError {
    fn from(r: PathRejection) -> Self {
        ApiError::Rejected { status: r.status(), message: r.body_text() }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(r: BytesRejection) -> Self {
        ApiError::Rejected { status: r.status(), message: r.body_text() }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload => StatusCode::BAD_REQUEST,
            ApiError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Registry(e) => match e.class() {
                ErrorClass::Client => StatusCode::BAD_REQUEST,
                ErrorClass::Server => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let body = ErrorBody { error: self.to_string() };
        (status, axum::Json(body)).into_response()
    }
}
