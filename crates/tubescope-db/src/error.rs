//! Database error types.

use thiserror::Error;
use tubescope_common::error::{ApiError, TubescopeError};

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQL error: {0}")]
    Sqlx(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound("row not found".to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                DbError::Duplicate(db.message().to_string())
            }
            other => DbError::Sqlx(other),
        }
    }
}

impl From<DbError> for TubescopeError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(e) => TubescopeError::Database(e),
            DbError::NotFound(msg) => TubescopeError::NotFound(msg),
            DbError::Duplicate(msg) => TubescopeError::Conflict(msg),
            DbError::InvalidQuery(msg) => TubescopeError::InvalidInput(msg),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::from(TubescopeError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_becomes_conflict() {
        let api = ApiError::from(DbError::Duplicate("key_words".into()));
        assert!(matches!(api, ApiError::Conflict(_)));
    }

    #[test]
    fn test_row_not_found() {
        assert!(matches!(DbError::from(sqlx::Error::RowNotFound), DbError::NotFound(_)));
    }

    #[test]
    fn test_sql_errors_are_internal() {
        let api = ApiError::from(DbError::from(sqlx::Error::PoolTimedOut));
        assert!(matches!(api, ApiError::Internal(_)));
    }
}
