use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::ServiceError;

/// Envelope shared by every endpoint: `{status, code, message, data?}`.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Serialize, Debug)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub title: String,   // machine key, e.g. "is_required", "length"
    pub message: String,
}

pub struct ApiResponseResult<T>(pub StatusCode, pub ApiResponse<T>);

impl<T> IntoResponse for ApiResponseResult<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

pub struct ResponseBuilder;

impl ResponseBuilder {
    pub fn success<T: Serialize>(code: &str, message: &str, data: T) -> ApiResponseResult<T> {
        Self::build(StatusCode::OK, "success", code, message, Some(data))
    }

    pub fn created<T: Serialize>(code: &str, message: &str, data: T) -> ApiResponseResult<T> {
        Self::build(StatusCode::CREATED, "success", code, message, Some(data))
    }

    pub fn error<T: Serialize>(status_code: StatusCode, code: &str, message: &str) -> ApiResponseResult<T> {
        Self::build(status_code, "error", code, message, None)
    }

    pub fn fail_with_data<T: Serialize>(
        status_code: StatusCode,
        code: &str,
        message: &str,
        data: T,
    ) -> ApiResponseResult<T> {
        Self::build(status_code, "error", code, message, Some(data))
    }

    /// Renders a service-layer error tuple.
    pub fn from_error((status, code, message): ServiceError) -> Response {
        Self::error::<()>(status, code, &message).into_response()
    }

    fn build<T: Serialize>(
        status_code: StatusCode,
        status: &'static str,
        code: &str,
        message: &str,
        data: Option<T>,
    ) -> ApiResponseResult<T> {
        ApiResponseResult(
            status_code,
            ApiResponse {
                status,
                code: code.to_string(),
                message: message.to_string(),
                data,
            },
        )
    }
}
