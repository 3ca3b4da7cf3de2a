use propdash_rs::handlers;
use propdash_rs::types::AppState;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::filter::Targets::new().with_targets([
            ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
            ("propdash_rs", tracing_subscriber::filter::LevelFilter::DEBUG),
        ]));
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL not set!");
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to the call store");
    sqlx::migrate!()
        .run(&db_pool)
        .await
        .expect("failed to run migrations");

    let app_state = Arc::new(AppState { db_pool });

    let app = Router::new()
        .route(
            "/api/v1/calls",
            post(handlers::create_call).get(handlers::get_calls),
        )
        .route("/api/v1/call-stats", get(handlers::get_call_stats))
        .route("/", get(|| async { "propdash" }))
        .layer(cors_layer())
        .with_state(app_state);

    axum::Server::bind(&bind_addr.parse().expect("invalid BIND_ADDR"))
        .serve(app.into_make_service())
        .await
        .unwrap();
}

/// Origins come from CORS_ORIGINS, comma separated; an empty list opens the
/// API up for local development.
fn cors_layer() -> CorsLayer {
    let raw = env::var("CORS_ORIGINS").unwrap_or_default();
    let mut origins: Vec<HeaderValue> = Vec::new();
    for origin in raw.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        match origin.parse() {
            Ok(value) => origins.push(value),
            Err(_) => warn!(origin, "ignoring malformed cors origin"),
        }
    }

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
