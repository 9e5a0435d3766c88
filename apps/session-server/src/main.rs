use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use session_api::{router, AppState};
use session_infrastructure::build_session_manager;
use session_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    session_shared::telemetry::init_telemetry("session_server=info,session_core=info,tower_http=info");

    info!("Session server starting...");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Session manager and backend
    let components = build_session_manager(&config).await?;

    let sweeper = match (&components.memory_store, config.session.sweep_interval_seconds) {
        (Some(store), secs) if secs > 0 => {
            info!("Sweeping expired sessions every {}s", secs);
            Some(store.spawn_sweeper(Duration::from_secs(secs)))
        }
        _ => None,
    };

    let state = AppState {
        sessions: components.manager,
        memory_store: components.memory_store,
        config: config.clone(),
    };

    // Cookies require credentialed CORS with an explicit origin
    let origin = format!("http://{}:{}", config.app.host, config.app.port);
    let app = router(state).layer(
        CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]),
    );

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("Session server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
