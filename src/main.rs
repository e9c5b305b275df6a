use std::net::SocketAddr;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sportzy_api::{config::AppConfig, create_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    init_tracing(&config.logging.format);

    let addr = config.bind_address();
    let port = config.server.port;
    let state = AppState::from_config(config);
    let logger = state.logger.clone();

    info!(
        environment = ?logger.mode(),
        request_log = state.sink.name(),
        "Configuration loaded"
    );

    let app = create_app(state);

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            logger.error(format_args!("Failed to bind {}: {}", addr, e));
            return Err(e.into());
        }
    };

    logger.success(format_args!("Server running at http://localhost:{}", port));
    logger.debug(format_args!("Listening on {}", addr));

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    logger.info("Server stopped");
    Ok(())
}

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sportzy_api=info,tower_http=info"));

    let subscriber = tracing_subscriber::registry().with(filter);

    match log_format {
        "json" => subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        _ => subscriber.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
