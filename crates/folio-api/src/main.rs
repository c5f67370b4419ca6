//! folio-api - HTTP API server for folio manuscript search.

use std::net::SocketAddr;

use axum::http::{header, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_api::{build_router, AppState};
use folio_db::{Database, PoolConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT - "json" or "text" (default: "text")
    //   RUST_LOG   - standard env filter (default: "folio_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "folio_api=debug,folio_search=debug,folio_db=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Configuration from environment
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/folio".to_string());
    let categories: Vec<String> = std::env::var("FOLIO_CATEGORIES")
        .map_err(|_| {
            anyhow::anyhow!("FOLIO_CATEGORIES must list the category partitions (comma-separated)")
        })?
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    let bind = std::env::var("FOLIO_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let max_connections: u32 = std::env::var("FOLIO_DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    info!(
        subsystem = "api",
        categories = ?categories,
        bind = %bind,
        "Starting folio-api"
    );

    let pool_config = PoolConfig::new().max_connections(max_connections);
    let db = Database::connect_with_config(&database_url, pool_config, &categories).await?;
    let state = AppState::new(db.partitions.clone(), db.bookmarks.clone(), db.history.clone());

    // Periodic pool health logging
    let metrics_pool = db.pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            folio_db::log_pool_metrics(&metrics_pool);
        }
    });

    let cors = match std::env::var("FOLIO_ALLOWED_ORIGINS") {
        Ok(origins) => {
            let parsed = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect::<Vec<_>>();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parsed))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        }
        Err(_) => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = build_router(state).layer(cors);

    let addr: SocketAddr = bind.parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
