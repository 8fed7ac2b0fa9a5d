use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::{Validate, ValidationErrors};

use crate::utils::api_response::{ResponseBuilder, ValidationErrorDetail};

/// JSON body extractor that runs `validator` rules before the handler sees it.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| {
                tracing::debug!(error = %err.body_text(), "rejected request body");
                ResponseBuilder::error::<()>(
                    StatusCode::BAD_REQUEST,
                    "INVALID_JSON",
                    &format!("Invalid JSON format: {}", err.body_text()),
                )
                .into_response()
            })?;

        if let Err(e) = payload.validate() {
            return Err(ResponseBuilder::fail_with_data(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Validation failed",
                map_validation_errors(&e),
            )
            .into_response());
        }

        Ok(ValidatedJson(payload))
    }
}

// Flatten field errors, sorted by field so responses are stable
fn map_validation_errors(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| ValidationErrorDetail {
                field: field.to_string(),
                title: err.code.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string()),
            })
        })
        .collect();
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::admin_model::TagRequest;

    #[test]
    fn blank_tag_title_reports_field() {
        let req = TagRequest { title: "   ".to_string() };
        let errors = req.validate().unwrap_err();
        let details = map_validation_errors(&errors);
        assert!(details.iter().all(|d| d.field == "title"));
        assert!(details.iter().any(|d| d.title == "is_required"));
    }

    #[test]
    fn long_tag_title_is_rejected() {
        let req = TagRequest { title: "x".repeat(21) };
        let details = map_validation_errors(&req.validate().unwrap_err());
        assert_eq!(details[0].title, "length");
    }
}
