pub mod admin_key_middleware;
pub mod rate_limiter;
