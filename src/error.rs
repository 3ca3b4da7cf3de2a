use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application-wide error taxonomy.  Errors propagate unmodified to the
/// immediate caller; nothing below the HTTP layer retries or swallows.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input rejected locally, before any I/O was attempted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced file or entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Non-2xx response from the Alto API.  The caller decides whether to
    /// retry.
    #[error("upstream error: status={status}, body={body}")]
    Upstream { status: u16, body: String },

    /// The call store could not be reached, or the query failed.
    #[error("call store unavailable: {0}")]
    StorageUnavailable(#[source] sqlx::Error),

    /// The request never produced an HTTP status (connection, TLS, decode).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("i/o error: {0}")]
    Io(#[source] std::io::Error),

    #[error("timestamp formatting error: {0}")]
    TimeFormat(#[from] time::error::Format),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } | AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Io(_) | AppError::TimeFormat(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
