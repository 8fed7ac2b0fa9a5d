use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use crate::config::AppState;
use crate::models::blog_model::PostListParams;
use crate::services::blog_service::BlogService;
use crate::utils::api_response::ResponseBuilder;

pub async fn list_posts_handler(
    State(state): State<AppState>,
    Query(params): Query<PostListParams>,
) -> impl IntoResponse {
    match BlogService::list_posts(&state.db, params).await {
        Ok(res) => ResponseBuilder::success("POSTS_FETCHED", "Success", res).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}

pub async fn post_detail_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    match BlogService::post_detail(&state.db, &slug).await {
        Ok(res) => ResponseBuilder::success("POST_FETCHED", "Success", res).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}

pub async fn tag_filter_handler(
    State(state): State<AppState>,
    Path(tag_title): Path<String>,
) -> impl IntoResponse {
    match BlogService::tag_filter(&state.db, &tag_title).await {
        Ok(res) => ResponseBuilder::success("TAG_POSTS_FETCHED", "Success", res).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}

pub async fn archive_handler(
    State(state): State<AppState>,
    Path(year): Path<String>,
) -> impl IntoResponse {
    // Parsed here so a bad year gets the JSON envelope instead of a plain rejection
    let Ok(year) = year.parse::<i32>() else {
        return ResponseBuilder::error::<()>(StatusCode::BAD_REQUEST, "INVALID_YEAR", "Year must be a number")
            .into_response();
    };

    match BlogService::archive(&state.db, year).await {
        Ok(res) => ResponseBuilder::success("ARCHIVE_FETCHED", "Success", res).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}

pub async fn popular_handler(State(state): State<AppState>) -> impl IntoResponse {
    match BlogService::popular(&state.db).await {
        Ok(res) => ResponseBuilder::success("POPULAR_FETCHED", "Success", res).into_response(),
        Err(e) => ResponseBuilder::from_error(e),
    }
}
