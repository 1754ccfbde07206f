use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Client-facing message for a lead that could not be persisted.
pub const LEAD_NOT_SAVED: &str = "Failed to save lead info.";
/// Client-facing message for a request over the per-client rate limit.
pub const TOO_MANY_REQUESTS: &str = "Too many requests, please try again later.";
/// Client-facing message for any failure nobody planned for.
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Rejection of a submission by the validator. The message is shown to the
/// caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Failure to durably write a lead. Never disclosed to the caller.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("datastore request failed: {0}")]
    Request(String),
    #[error("datastore returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Failure to deliver the acknowledgement email. Logged and absorbed.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("email request failed: {0}")]
    Request(String),
    #[error("email API returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected email API response: {0}")]
    MalformedResponse(String),
}

/// Terminal outcomes of a submission that change the HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("rejected: {0}")]
    Rejected(#[from] ValidationError),
    #[error("not persisted: {0}")]
    NotPersisted(#[from] StoreError),
}

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Bad request error (invalid input). Message is returned as-is.
    BadRequest(String),
    /// The lead could not be written to the store.
    LeadNotSaved(StoreError),
    /// Resource not found error.
    NotFound,
    /// Body was not sent as JSON.
    UnsupportedMediaType,
    /// Body exceeded the transport limit.
    PayloadTooLarge,
    /// Client exceeded the rate limit.
    TooManyRequests,
    /// Internal server error.
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::LeadNotSaved(e) => write!(f, "Lead not saved: {}", e),
            AppError::NotFound => write!(f, "Not found"),
            AppError::UnsupportedMediaType => write!(f, "Unsupported media type"),
            AppError::PayloadTooLarge => write!(f, "Payload too large"),
            AppError::TooManyRequests => write!(f, "Too many requests"),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each error variant to an HTTP status and a `{"error": ...}` body.
    /// Infrastructure details are logged here and never leave the process.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Already logged with the submitter fingerprint by the pipeline.
            AppError::LeadNotSaved(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, LEAD_NOT_SAVED.to_string())
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::UnsupportedMediaType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Expected a JSON request body".to_string(),
            ),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Payload too large".to_string(),
            ),
            AppError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                TOO_MANY_REQUESTS.to_string(),
            ),
            AppError::InternalError(msg) => {
                tracing::error!("Unexpected server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_SERVER_ERROR.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Rejected(e) => AppError::BadRequest(e.0),
            SubmissionError::NotPersisted(e) => AppError::LeadNotSaved(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        match &rejection {
            JsonRejection::MissingJsonContentType(_) => AppError::UnsupportedMediaType,
            JsonRejection::BytesRejection(_)
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                AppError::PayloadTooLarge
            }
            _ => AppError::BadRequest("Invalid JSON body".to_string()),
        }
    }
}
