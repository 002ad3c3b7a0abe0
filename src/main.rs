use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkmender::{
    app_state::AppState,
    config::Config,
    content::MemoryContentStore,
    http,
    notify::LogNotifier,
    repositories,
    scheduler::Scheduler,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    let pool = repositories::connect(config.database_url())
        .await
        .expect("Failed to open database");
    repositories::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    // Content store adapter. The in-memory store serves development and
    // demos; a real deployment wires in its CMS-backed implementation here.
    let content_store = MemoryContentStore::new([]);
    let notifier = Arc::new(LogNotifier);

    let state = AppState::new(pool, content_store, notifier, config.audit().clone());

    let schedule = Scheduler::start(state.auditor.clone(), state.audit_config.clone());

    let app = http::router(state).layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .expect("Failed to bind to address");
    info!(addr = config.bind_addr(), "linkmender listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .expect("server error");

    schedule.shutdown().await;
}
