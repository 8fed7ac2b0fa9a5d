use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;
use crate::admin::{AdminModel, REGISTRY};
use crate::config::AppState;
use crate::models::admin_model::*;
use crate::services::admin_service::AdminService;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::validated_wrapper::ValidatedJson;

// Registered models and their list configuration
pub async fn index_handler() -> impl IntoResponse {
    let models: Vec<_> = REGISTRY
        .iter()
        .map(|m| serde_json::json!({
            "model": m.name,
            "list_display": m.list_display,
            "raw_id_fields": m.raw_id_fields,
        }))
        .collect();
    ResponseBuilder::success("ADMIN_MODELS_FETCHED", "Success", models)
}

pub async fn list_handler(
    State(state): State<AppState>,
    Extension(model): Extension<AdminModel>,
    Query(params): Query<AdminListParams>,
) -> impl IntoResponse {
    match AdminService::list(&state.db, model, params).await {
        Ok(res) => ResponseBuilder::success("ADMIN_LIST_FETCHED", "Success", res).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}

pub async fn lookup_handler(
    State(state): State<AppState>,
    Extension(model): Extension<AdminModel>,
    Path(field): Path<String>,
    Query(params): Query<LookupParams>,
) -> impl IntoResponse {
    match AdminService::lookup(&state.db, model, &field, params).await {
        Ok(res) => ResponseBuilder::success("LOOKUP_FETCHED", "Success", res).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}

pub async fn delete_handler(
    State(state): State<AppState>,
    Extension(model): Extension<AdminModel>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match AdminService::delete(&state.db, model, id).await {
        Ok(()) => ResponseBuilder::success::<()>("DELETED", "Deleted", ()).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}

pub async fn create_post_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePostRequest>,
) -> impl IntoResponse {
    match AdminService::create_post(&state.db, payload).await {
        Ok(row) => ResponseBuilder::created("POST_CREATED", "Post created", row).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}

pub async fn update_post_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePostRequest>,
) -> impl IntoResponse {
    match AdminService::update_post(&state.db, id, payload).await {
        Ok(row) => ResponseBuilder::success("POST_UPDATED", "Post updated", row).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}

pub async fn create_tag_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TagRequest>,
) -> impl IntoResponse {
    match AdminService::create_tag(&state.db, payload).await {
        Ok(row) => ResponseBuilder::created("TAG_CREATED", "Tag created successfully", row).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}

pub async fn update_tag_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<TagRequest>,
) -> impl IntoResponse {
    match AdminService::update_tag(&state.db, id, payload).await {
        Ok(row) => ResponseBuilder::success("TAG_UPDATED", "Tag updated", row).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}

pub async fn create_comment_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCommentRequest>,
) -> impl IntoResponse {
    match AdminService::create_comment(&state.db, payload).await {
        Ok(row) => ResponseBuilder::created("COMMENT_CREATED", "Comment created", row).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}

pub async fn update_comment_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCommentRequest>,
) -> impl IntoResponse {
    match AdminService::update_comment(&state.db, id, payload).await {
        Ok(row) => ResponseBuilder::success("COMMENT_UPDATED", "Comment updated", row).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}
