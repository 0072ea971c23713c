//! Error responses.
//!
//! Every failure is rendered as `{"error": "<message>"}` with a status
//! derived from the runtime's [`ErrorKind`].
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use runtime::{ErrorKind, RuntimeError, StoreError};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Store failure with a client-facing message; the cause is only logged.
    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn store(message: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| ApiError::Store { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Runtime(err) => match err.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::AlreadyOpponent | ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::ExternalLookup => StatusCode::BAD_GATEWAY,
                ErrorKind::StoreUnavailable | ErrorKind::Internal => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Store { message, source } => {
                tracing::error!("{}: {}", message, source);
            }
            err if status.is_server_error() => tracing::error!("{}", err),
            err => tracing::debug!("Request rejected ({}): {}", status, err),
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use game_core::{PlayerId, RosterError};

    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(
            ApiError::bad_request("FID is required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RuntimeError::from(RosterError::AlreadyOpponent(PlayerId(2)))).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(RuntimeError::UnknownSession(PlayerId(1))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(RuntimeError::from(StoreError::Unavailable("down".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
