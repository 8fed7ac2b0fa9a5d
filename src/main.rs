mod admin;
mod config;
mod entities;
mod services;
mod handlers;
mod routes;
mod repositories;
mod utils;
mod models;
mod seeders;
mod middleware;
#[cfg(test)]
mod test_utils;

use config::{Config, AppState};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let cfg = Config::init();
    println!("🚀 Starting Kopiblog Backend...");

    // 1. Database Connection
    println!("📡 Connecting to Database...");
    let db = Database::connect(&cfg.database_url)
        .await
        .expect("🔥 Failed to connect to Database!");
    println!("✅ Database Connected!");

    // 2. Schema
    println!("🧱 Applying migrations...");
    Migrator::up(&db, None)
        .await
        .expect("🔥 Failed to apply migrations!");

    // 3. Database Seeding
    if cfg.run_seeders {
        println!("🌱 Running Seeders...");
        if let Err(e) = seeders::run_seeders(&db).await {
            tracing::error!("❌ Seeding failed: {}", e);
        } else {
            println!("✅ Seeding Successful!");
        }
    }

    // 4. Build App State
    let rate_limiter = Arc::new(
        middleware::rate_limiter::RateLimiter::new(cfg.rate_limit_per_minute, Duration::from_secs(60))
    );

    let addr_str = format!("{}:{}", cfg.server_host, cfg.server_port);
    let state = AppState {
        db,
        config: Arc::new(cfg),
        rate_limiter,
    };

    // 5. Initialize Router
    let app = routes::create_routes(state.clone()).with_state(state);

    // 6. Start Server
    let addr: SocketAddr = addr_str.parse().expect("Invalid address");

    println!("🎯 Server ready! Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .unwrap();
}
