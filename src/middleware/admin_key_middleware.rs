use crate::config::AppState;
use crate::utils::api_response::ResponseBuilder;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Gates the admin routes behind `Authorization: Bearer <ADMIN_API_KEY>`.
pub async fn admin_key_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let auth_str = match req.headers().get(header::AUTHORIZATION).map(|h| h.to_str()) {
        None => {
            return ResponseBuilder::error::<()>(
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authorization header is missing",
            )
            .into_response();
        }
        Some(Err(_)) => {
            return ResponseBuilder::error::<()>(
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_FORMAT",
                "Invalid Authorization header format",
            )
            .into_response();
        }
        Some(Ok(s)) => s,
    };

    let Some(key) = auth_str.strip_prefix("Bearer ") else {
        return ResponseBuilder::error::<()>(
            StatusCode::UNAUTHORIZED,
            "AUTH_INVALID_SCHEME",
            "Invalid token format. Missing 'Bearer ' prefix",
        )
        .into_response();
    };

    if !key_matches(key, &state.config.admin_api_key) {
        tracing::warn!(path = %req.uri().path(), "rejected admin request with bad key");
        return ResponseBuilder::error::<()>(
            StatusCode::FORBIDDEN,
            "FORBIDDEN_ACCESS",
            "You do not have permission to access this resource",
        )
        .into_response();
    }

    next.run(req).await
}

// A blank key on either side never grants access
fn key_matches(presented: &str, expected: &str) -> bool {
    if presented.trim().is_empty() || expected.trim().is_empty() {
        return false;
    }
    constant_time_eq(presented.as_bytes(), expected.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::{constant_time_eq, key_matches};

    #[test]
    fn compares_keys() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret-longer"));
    }

    #[test]
    fn blank_keys_never_match() {
        assert!(key_matches("secret", "secret"));
        assert!(!key_matches("", ""));
        assert!(!key_matches("  ", "  "));
        assert!(!key_matches("", "secret"));
    }
}
