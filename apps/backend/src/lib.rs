pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::game::GameRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub games: GameRegistry,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            db: Arc::new(db),
            games: GameRegistry::new(),
            config: Arc::new(config),
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.max_connections).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let addr = config.bind_addr();
    let state = AppState::new(db, config);
    state.games.spawn_sweeper();
    let app = router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the full router with all routes
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // Auth routes
        .route("/api/auth/me", get(routes::auth::me))
        // Subject routes
        .route(
            "/api/subjects",
            get(routes::subjects::list).post(routes::subjects::create),
        )
        .route(
            "/api/subjects/{id}",
            patch(routes::subjects::update).delete(routes::subjects::delete),
        )
        // Card routes
        .route(
            "/api/cards",
            get(routes::cards::list).post(routes::cards::create),
        )
        .route(
            "/api/cards/{id}",
            patch(routes::cards::update).delete(routes::cards::delete),
        )
        // Game routes
        .route("/api/game/start", post(routes::game::start))
        .route("/api/game/history", get(routes::game::history))
        .route(
            "/api/game/{id}",
            get(routes::game::show).delete(routes::game::abandon),
        )
        .route("/api/game/{id}/draft", put(routes::game::draft))
        .route("/api/game/{id}/answer", post(routes::game::answer))
        .route("/api/game/{id}/next", post(routes::game::next))
        // Stats routes
        .route("/api/stats", get(routes::stats::stats))
        .route("/api/dashboard", get(routes::stats::dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/sign-in", post(routes::auth::sign_in))
        .route("/api/auth/sign-out", post(routes::auth::sign_out))
        .route("/api/rankings", get(routes::stats::rankings))
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
