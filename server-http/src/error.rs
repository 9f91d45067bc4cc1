use crate::models::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::Error;

/// Maps service errors onto the HTTP error envelope. Each kind gets its own
/// status so the client can tell hard errors from degraded states.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Service(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Service(err)
    }
}

impl ApiError {
    pub fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Service(err) => match err {
                Error::NotFound => (StatusCode::NOT_FOUND, "not_found"),
                Error::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
                Error::AuthFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "auth_failed"),
                Error::ServiceUnavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Service(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let body = ErrorResponse {
            error: kind,
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}
