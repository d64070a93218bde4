use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TubescopeError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for TubescopeError {
    fn from(err: sqlx::Error) -> Self {
        // ER_DUP_ENTRY surfaces as a unique violation on MySQL
        let duplicate = err
            .as_database_error()
            .map(|e| e.is_unique_violation())
            .unwrap_or(false);
        if duplicate {
            return TubescopeError::Conflict(err.to_string());
        }
        if let sqlx::Error::RowNotFound = err {
            return TubescopeError::NotFound("row not found".to_string());
        }
        TubescopeError::Database(err)
    }
}

pub type Result<T> = std::result::Result<T, TubescopeError>;

// ── HTTP mapping ─────────────────────────────────────────────────────────────

/// Error returned by JSON API handlers.
///
/// Most variants render as `{"message": ...}`. `InvalidParam` renders as
/// `{"error": ...}`, which is what the keyword endpoints have always returned.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    InvalidParam(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[source] TubescopeError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidParam(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TubescopeError> for ApiError {
    fn from(err: TubescopeError) -> Self {
        match err {
            TubescopeError::NotFound(msg) => ApiError::NotFound(msg),
            TubescopeError::Conflict(msg) => ApiError::Conflict(msg),
            TubescopeError::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::from(TubescopeError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::InvalidParam(msg) => json!({ "error": msg }),
            ApiError::Internal(source) => {
                tracing::error!(error = %source, "request failed");
                json!({ "message": self.to_string() })
            }
            _ => json!({ "message": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_renders_message() {
        let resp = ApiError::NotFound("Channel not found".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["message"], "Channel not found");
    }

    #[tokio::test]
    async fn test_invalid_param_uses_error_key() {
        let resp = ApiError::InvalidParam("Invalid ID".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Invalid ID");
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let err = TubescopeError::Config("DB_PASSWORD=hunter2".into());
        let resp = ApiError::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn test_domain_errors_keep_their_status() {
        assert_eq!(
            ApiError::from(TubescopeError::Conflict("dup".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(TubescopeError::InvalidInput("bad".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = TubescopeError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, TubescopeError::NotFound(_)));
    }
}
