//! HTTP API server for the orders service.
//!
//! Two routes carry the domain: `POST /orders` creates an order and
//! publishes its `OrderCreated` event, `GET /order/{order_id}` reads it back.
//! Runs on PostgreSQL (store plus `NOTIFY` bus) when `DATABASE_URL` is set,
//! otherwise fully in memory.

pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::OrderService;
use metrics_exporter_prometheus::PrometheusHandle;
use notifier::{EventNotifier, InMemoryNotifier, PgNotifyNotifier, Topic};
use order_store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use error::StartupError;
use routes::orders::AppState;

/// Infrastructure the order service runs on.
#[derive(Clone)]
pub enum Backend {
    InMemory,
    Postgres(PgPool),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::InMemory => "memory",
            Backend::Postgres(_) => "postgres",
        }
    }

    /// Releases pooled connections. Called once at shutdown.
    pub async fn close(&self) {
        if let Backend::Postgres(pool) = self {
            pool.close().await;
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create))
        .route("/order/{order_id}", get(routes::orders::get))
        .route("/order/{order_id}/", get(routes::orders::get))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds state backed by the in-memory store and bus.
///
/// The concrete store and notifier are returned too so callers can inspect
/// them.
pub fn create_in_memory_state(
    config: &Config,
) -> (Arc<AppState>, InMemoryOrderStore, InMemoryNotifier) {
    let store = InMemoryOrderStore::new();
    let notifier = InMemoryNotifier::new(config.service_name.clone());

    let order_service = OrderService::new(
        Arc::new(store.clone()) as Arc<dyn OrderStore>,
        Arc::new(notifier.clone()) as Arc<dyn EventNotifier>,
        Topic::order_created(&config.topic_prefix),
    );

    let state = Arc::new(AppState {
        order_service,
        backend: Backend::InMemory,
    });

    (state, store, notifier)
}

/// Connects to PostgreSQL and builds state backed by it.
pub async fn create_postgres_state(
    config: &Config,
    database_url: &str,
) -> Result<Arc<AppState>, StartupError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.database_acquire_timeout)
        .connect(database_url)
        .await?;

    let store =
        PostgresOrderStore::new(pool.clone()).with_query_timeout(config.database_query_timeout);
    if config.run_migrations {
        store.run_migrations().await?;
        tracing::info!("orders table ready");
    }

    let notifier = PgNotifyNotifier::new(pool.clone())
        .with_service_name(config.service_name.clone())
        .with_publish_timeout(config.publish_timeout);

    let order_service = OrderService::new(
        Arc::new(store) as Arc<dyn OrderStore>,
        Arc::new(notifier) as Arc<dyn EventNotifier>,
        Topic::order_created(&config.topic_prefix),
    );

    Ok(Arc::new(AppState {
        order_service,
        backend: Backend::Postgres(pool),
    }))
}

/// Builds state for whichever backend the configuration selects.
pub async fn create_state(config: &Config) -> Result<Arc<AppState>, StartupError> {
    match &config.database_url {
        Some(url) => create_postgres_state(config, url).await,
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory only");
            Ok(create_in_memory_state(config).0)
        }
    }
}
