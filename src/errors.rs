use axum::http::StatusCode;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by repositories, storage and auth. The wrapped message is
/// the backing service's own; only the category is added here.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("Database error: {0}")]
    Database(DbErr),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("Session store error: {0}")]
    SessionStore(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::Database(_)
            | ServiceError::Storage(_)
            | ServiceError::Token(_)
            | ServiceError::Hashing(_)
            | ServiceError::SessionStore(_)
            | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => ServiceError::Conflict(message),
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                ServiceError::Validation(message)
            }
            _ if err.to_string().contains("row-level security") => {
                ServiceError::Forbidden(err.to_string())
            }
            _ => ServiceError::Database(err),
        }
    }
}

impl From<ServiceError> for (StatusCode, String) {
    fn from(err: ServiceError) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        (status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_categories_to_status_codes() {
        assert_eq!(
            ServiceError::NotFound("Student").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Database(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn passes_underlying_message_through() {
        let (status, body): (StatusCode, String) =
            ServiceError::from(DbErr::Custom("connection reset".into())).into();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("connection reset"));

        let (status, body): (StatusCode, String) = ServiceError::NotFound("Class").into();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Class not found");
    }

    #[test]
    fn row_level_security_violations_are_forbidden() {
        let err = ServiceError::from(DbErr::Custom(
            "new row violates row-level security policy for table \"students\"".into(),
        ));
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }
}
