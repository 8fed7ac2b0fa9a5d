pub mod admin_service;
pub mod blog_service;

use axum::http::StatusCode;
use sea_orm::DbErr;

/// Status, machine-readable code and message, as carried up to the handlers.
pub type ServiceError = (StatusCode, &'static str, String);

/// Storage failures are not recovered from; they surface as a 500 with the
/// original message attached.
pub fn db_error(code: &'static str, err: DbErr) -> ServiceError {
    tracing::error!(code, error = %err, "database error");
    (StatusCode::INTERNAL_SERVER_ERROR, code, err.to_string())
}
