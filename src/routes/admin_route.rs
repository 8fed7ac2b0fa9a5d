use axum::{routing::{get, put}, Extension, Router, middleware};
use crate::admin::AdminModel;
use crate::config::AppState;
use crate::handlers::admin_handler::*;
use crate::middleware::admin_key_middleware::admin_key_middleware;

pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(index_handler))
        .nest("/posts", Router::new()
            .route("/", get(list_handler).post(create_post_handler))
            .route("/{id}", put(update_post_handler).delete(delete_handler))
            .route("/lookup/{field}", get(lookup_handler))
            .layer(Extension(AdminModel::Posts))
        )
        .nest("/tags", Router::new()
            .route("/", get(list_handler).post(create_tag_handler))
            .route("/{id}", put(update_tag_handler).delete(delete_handler))
            .route("/lookup/{field}", get(lookup_handler))
            .layer(Extension(AdminModel::Tags))
        )
        .nest("/comments", Router::new()
            .route("/", get(list_handler).post(create_comment_handler))
            .route("/{id}", put(update_comment_handler).delete(delete_handler))
            .route("/lookup/{field}", get(lookup_handler))
            .layer(Extension(AdminModel::Comments))
        )
        .layer(middleware::from_fn_with_state(state, admin_key_middleware))
}
