use axum::{routing::get, Router, middleware};
use crate::config::AppState;
use crate::handlers::blog_handler::*;
use crate::middleware::rate_limiter::rate_limit_middleware;

// Public read views. Paths match post::Model::absolute_url and tag::Model::absolute_url.
pub fn blog_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts_handler))
        .route("/post/{slug}", get(post_detail_handler))
        .route("/tag/{tag_title}", get(tag_filter_handler))
        .route("/archive/{year}", get(archive_handler))
        .route("/popular", get(popular_handler))
        .layer(middleware::from_fn_with_state(state, rate_limit_middleware))
}
