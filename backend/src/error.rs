use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::json;

/// Error taxonomy for the whole API surface. Each variant maps to exactly
/// one HTTP status, and handlers propagate these with `?` so the mapping
/// lives in one place.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// An approval lookup that failed either existence or ownership. The two
    /// cases are intentionally indistinguishable so a caller cannot probe
    /// for the existence of entries belonging to other managers.
    #[error("Approval not found or not authorized")]
    NotFoundOrUnauthorized,

    #[error("Form is not published")]
    UnpublishedForm,

    #[error("{0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn is_internal(&self) -> bool {
        matches!(
            self,
            ApiError::Store(_) | ApiError::Encoding(_) | ApiError::Csv(_) | ApiError::Internal(_)
        )
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::UnpublishedForm => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::NotFoundOrUnauthorized => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Store(_)
            | ApiError::Encoding(_)
            | ApiError::Csv(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal failures are logged with full context server-side but
        // surfaced as an opaque 500 to the caller.
        let message = if self.is_internal() {
            error!("internal error: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::UnpublishedForm.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Authentication("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFoundOrUnauthorized.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("decided".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn store_errors_stay_opaque() {
        let err = ApiError::Store(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.is_internal());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
