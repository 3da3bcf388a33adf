use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub type Result<T> = std::result::Result<T, MentorError>;

/// Failures surfaced by the recommendation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum MentorError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Dataset unavailable: {0}")]
    Dataset(#[from] DatasetError),
}

impl MentorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MentorError::Validation(_) => StatusCode::BAD_REQUEST,
            MentorError::NotFound(_) => StatusCode::NOT_FOUND,
            MentorError::Dataset(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for MentorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Recommendation request failed: {}", self);
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Failures talking to the Codeforces API. Never retried; the live fallback
/// reports them to callers as [`MentorError::NotFound`].
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Api(String),

    #[error("user {0} not found")]
    UnknownUser(String),

    #[error("no submissions found for {0}")]
    NoSubmissions(String),
}

/// Missing or malformed dataset artifacts. Fatal for every dependent lookup.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("missing dataset file {0}")]
    MissingFile(String),

    #[error("{file}: header is missing column `{column}`")]
    Schema { file: String, column: String },

    #[error("{file}: line {line}: {message}")]
    Parse {
        file: String,
        line: u64,
        message: String,
    },

    #[error("{file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("dataset loader task failed: {0}")]
    Join(String),
}

/// Result cache failures. Logged and discarded by callers.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
