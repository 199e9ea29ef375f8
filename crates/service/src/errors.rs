use models::errors::{FieldErrors, ModelError};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(FieldErrors),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication required")]
    Unauthenticated,
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn invalid(field: &str, msg: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, msg))
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(errs) => ServiceError::Validation(errs),
            ModelError::Db(msg) => ServiceError::Db(msg),
        }
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errs: FieldErrors) -> Self { ServiceError::Validation(errs) }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        // 约束冲突在预检之后仍可能发生（并发写入），按字段错误返回
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                ServiceError::invalid(constraint_field(&detail), "A record with this value already exists.")
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                ServiceError::invalid(constraint_field(&detail), "Referenced object does not exist.")
            }
            _ => ServiceError::Db(e.to_string()),
        }
    }
}

/// Best-effort field name from a driver constraint message.
fn constraint_field(detail: &str) -> &'static str {
    const KNOWN: [&str; 6] = ["username", "cpf", "professional", "ticket", "sender", "user"];
    KNOWN
        .iter()
        .find(|f| detail.contains(*f))
        .copied()
        .unwrap_or("non_field_errors")
}
