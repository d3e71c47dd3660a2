use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Domain and persistence failures, mapped onto HTTP statuses by the
/// [`ResponseError`] impl so handlers can bubble them up with `?`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A referenced record does not exist (or is soft-deleted).
    #[error("{0}")]
    NotFound(String),

    /// The request itself is invalid: bad dates, overlapping ranges.
    #[error("{0}")]
    InvalidRequest(String),

    /// The record exists but is in a state that forbids the operation.
    #[error("{0}")]
    InvalidState(String),

    /// The caller is authenticated but not allowed to act on this record.
    #[error("{0}")]
    Forbidden(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidState(_) => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Database details stay in the logs, not in the response body.
        if let ApiError::Database(e) = self {
            error!(error = %e, "Database error");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            }));
        }

        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::NotFound("Employee not found".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Employee not found");
    }

    #[test]
    fn invalid_request_maps_to_400() {
        let err = ApiError::InvalidRequest("Start date cannot be after end date".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_state_maps_to_409() {
        let err = ApiError::InvalidState("Can only update status of pending requests".into());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let err = ApiError::Forbidden("You can only cancel your own leave requests".into());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn database_errors_hide_details() {
        let err = ApiError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
