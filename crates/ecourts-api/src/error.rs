use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ecourts_core::QueryError;
use ecourts_portal::PortalError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error("{0}")]
    Internal(String),
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Portal(PortalError::CaptchaRequired { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Portal(PortalError::DocumentNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Portal(PortalError::InvalidBaseUrl(_) | PortalError::OutputDir { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Portal(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Portal(PortalError::CaptchaRequired {
                endpoint: "cnr".into()
            })
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Portal(PortalError::Ambiguous(3)).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Portal(PortalError::DocumentNotFound("cause list".into())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn portal_errors_keep_their_message() {
        let err: ApiError = PortalError::Ambiguous(2).into();
        assert_eq!(
            err.to_string(),
            "portal returned 2 cases for a query that must match at most one"
        );
    }

    #[test]
    fn query_errors_are_bad_requests() {
        let err: ApiError = QueryError::Empty("CNR").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "CNR must not be empty");
    }
}
