use crate::config::AppState;
use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod admin_route;
pub mod blog_route;

pub fn create_routes(state: AppState) -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .merge(blog_route::blog_routes(state.clone()))
        .nest("/admin", admin_route::admin_routes(state))
        .route("/api/health", axum::routing::get(crate::handlers::health_check_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::middleware::rate_limiter::RateLimiter;
    use crate::test_utils::{self, Fixture};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const KEY: &str = "test-admin-key";

    async fn app() -> (Router, sea_orm::DatabaseConnection) {
        app_with_key(KEY).await
    }

    async fn app_with_key(admin_api_key: &str) -> (Router, sea_orm::DatabaseConnection) {
        let db = test_utils::setup_db().await;
        let config = Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            database_url: "sqlite::memory:".to_string(),
            admin_api_key: admin_api_key.to_string(),
            rate_limit_per_minute: 1000,
            trust_forwarded_for: false,
            run_seeders: false,
        };
        let state = AppState {
            db: db.clone(),
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit_per_minute, Duration::from_secs(60))),
            config: Arc::new(config),
        };
        (create_routes(state.clone()).with_state(state), db)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn admin(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", KEY))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_check() {
        let (app, _db) = app().await;
        let (status, body) = send(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "up");
    }

    #[tokio::test]
    async fn post_detail_and_missing_slug() {
        let (app, db) = app().await;
        let mut fx = Fixture::new(&db).await;
        let post = fx.post("hello", "2021-05-01T00:00:00Z").await;

        let (status, body) = send(&app, get(&post.absolute_url())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["slug"], "hello");

        let (status, body) = send(&app, get("/post/missing-slug")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "POST_NOT_FOUND");
    }

    #[tokio::test]
    async fn tag_urls_resolve_for_titles_with_spaces_and_slashes() {
        let (app, db) = app().await;
        let mut fx = Fixture::new(&db).await;
        let post = fx.post("tagged", "2021-05-01T00:00:00Z").await;

        for title in ["c/c++", "web dev"] {
            let tag = fx.tag(title).await;
            fx.link_tag(&post, &tag).await;

            let url = tag.absolute_url();
            assert!(url.parse::<axum::http::Uri>().is_ok(), "{} is not a valid uri", url);

            let (status, body) = send(&app, get(&url)).await;
            assert_eq!(status, StatusCode::OK, "GET {}", url);
            assert_eq!(body["data"]["tag"]["title"], title);
            assert_eq!(body["data"]["tag"]["url"], url);
            assert_eq!(body["data"]["posts"][0]["slug"], "tagged");
        }
    }

    #[tokio::test]
    async fn blank_admin_key_keeps_admin_closed() {
        let (app, _db) = app_with_key("").await;
        let req = Request::builder()
            .uri("/admin/posts")
            .header(header::AUTHORIZATION, "Bearer ")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN_ACCESS");
    }

    #[tokio::test]
    async fn archive_rejects_bad_year() {
        let (app, db) = app().await;
        let mut fx = Fixture::new(&db).await;
        fx.post("in-2021", "2021-05-01T00:00:00Z").await;

        let (status, body) = send(&app, get("/archive/2021")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["posts"][0]["slug"], "in-2021");

        let (status, body) = send(&app, get("/archive/twenty")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_YEAR");
    }

    #[tokio::test]
    async fn admin_requires_key() {
        let (app, _db) = app().await;
        let (status, body) = send(&app, get("/admin/posts")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "AUTH_MISSING");

        let req = Request::builder()
            .uri("/admin/posts")
            .header(header::AUTHORIZATION, "Bearer wrong")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_creates_tag_and_lists_it() {
        let (app, _db) = app().await;

        let (status, body) = send(&app, admin("POST", "/admin/tags", serde_json::json!({ "title": "Python" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["title"], "python");

        let (status, body) = send(&app, admin("POST", "/admin/tags", serde_json::json!({ "title": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = send(&app, admin("GET", "/admin/tags", Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["rows"][0]["title"], "python");
    }

    #[tokio::test]
    async fn admin_post_lookup_is_scoped_to_model() {
        let (app, db) = app().await;
        let _fx = Fixture::new(&db).await;

        let (status, body) = send(&app, admin("GET", "/admin/posts/lookup/author?q=auth", Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["label"], "author");

        let (status, _) = send(&app, admin("GET", "/admin/tags/lookup/author", Value::Null)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
