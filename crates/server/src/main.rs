use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_db::repositories::{ContentRepo, ScheduleRepo, SyncGroupRepo};
use marquee_db::DbPool;
use marquee_events::EventBus;
use marquee_resolver::{ContentCatalog, ContentResolver, PgCatalog, ScheduleChecker};
use marquee_sync::{SyncRuntimeStore, TickBroadcaster};

mod config;
mod error;
mod routes;
mod state;

use config::ServerConfig;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = marquee_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    marquee_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    marquee_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let bus = Arc::new(EventBus::default());

    // --- Sync runtime ---
    let sync = Arc::new(SyncRuntimeStore::new(Arc::clone(&bus)));
    hydrate_groups(&pool, &sync).await;

    // --- Resolver ---
    let catalog: Arc<dyn ContentCatalog> = Arc::new(PgCatalog::new(pool.clone()));
    let resolver = Arc::new(ContentResolver::new(
        Arc::clone(&catalog),
        Arc::clone(&sync),
    ));

    // --- Background services ---
    let cancel = CancellationToken::new();

    let broadcaster = TickBroadcaster::with_interval(
        Arc::clone(&sync),
        Arc::clone(&bus),
        Duration::from_millis(config.tick_interval_ms),
    );
    let tick_handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { broadcaster.run(cancel).await }
    });

    let checker = ScheduleChecker::with_interval(
        Arc::clone(&resolver),
        Arc::clone(&catalog),
        Arc::clone(&bus),
        Duration::from_secs(config.schedule_check_interval_secs),
    );
    let checker_handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { checker.run(cancel).await }
    });

    tracing::info!("Background services started (tick broadcaster, schedule checker)");

    // --- App state ---
    let app_state = AppState {
        pool: pool.clone(),
        resolver,
        sync: Arc::clone(&sync),
    };

    // --- Router ---
    let app = Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router())
        // API v1 routes.
        .nest("/api/v1", routes::api_routes())
        // -- Middleware stack (applied bottom-up) --
        // Request timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS.
        .layer(build_cors_layer(&config))
        // Shared state.
        .with_state(app_state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), tick_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), checker_handle).await;
    tracing::info!("Background services stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Load persisted group definitions into the runtime store.
///
/// Runtime state is not durable: every group comes back Stopped after a
/// restart. A failure here leaves the store empty rather than killing the
/// process; groups reappear once the database is reachable and the
/// process restarts.
async fn hydrate_groups(pool: &DbPool, sync: &SyncRuntimeStore) {
    let configs = match SyncGroupRepo::list(pool).await {
        Ok(configs) => configs,
        Err(err) => {
            tracing::error!(error = %err, "Failed to load sync group configurations");
            return;
        }
    };

    let mut count = 0;
    for config in configs {
        let members = match SyncGroupRepo::members(pool, config.id).await {
            Ok(members) => members,
            Err(err) => {
                tracing::warn!(group_id = config.id, error = %err, "Failed to load group members");
                continue;
            }
        };
        let content = match config.content_id {
            Some(content_id) => ContentRepo::get(pool, content_id)
                .await
                .ok()
                .flatten()
                .map(|item| item.content_ref()),
            None => None,
        };
        let window = match config.schedule_id {
            Some(schedule_id) => ScheduleRepo::get(pool, schedule_id)
                .await
                .ok()
                .flatten()
                .map(|schedule| schedule.window()),
            None => None,
        };
        sync.create_group(config.id, config.name, members, content, window)
            .await;
        count += 1;
    }
    tracing::info!(count, "Hydrated sync groups");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Build the CORS middleware layer from server configuration.
///
/// Panics at startup if any configured origin is invalid, which is the
/// desired behaviour -- we want misconfiguration to fail fast.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
