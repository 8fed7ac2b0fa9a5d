use std::env;
use std::sync::Arc;
use sea_orm::DatabaseConnection;
use crate::middleware::rate_limiter::RateLimiter;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub admin_api_key: String,
    pub rate_limit_per_minute: usize,
    // Only behind a proxy that overwrites X-Forwarded-For
    pub trust_forwarded_for: bool,
    pub run_seeders: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl Config {
    pub fn init() -> Config {
        let server_host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .expect("PORT must be a number");

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let admin_api_key = env::var("ADMIN_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .expect("ADMIN_API_KEY must be set and not blank");

        let rate_limit_per_minute = env::var("RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<usize>()
            .expect("RATE_LIMIT_PER_MINUTE must be a number");

        let run_seeders = env_flag("RUN_SEEDERS");
        let trust_forwarded_for = env_flag("TRUST_FORWARDED_FOR");

        Config {
            server_host,
            server_port,
            database_url,
            admin_api_key,
            rate_limit_per_minute,
            trust_forwarded_for,
            run_seeders,
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
