use std::{sync::Arc, time::Duration};

use axum::{middleware::from_fn_with_state, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod routes;

use crate::config::AppConfig;
use crate::logger::{
    sink::{ConsoleSink, RecordSink, TracingSink},
    Logger,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sink: Arc<dyn RecordSink>,
    pub logger: Logger,
}

impl AppState {
    /// State with the request sink and logger chosen by `config`.
    pub fn from_config(config: AppConfig) -> Self {
        let sink: Arc<dyn RecordSink> = match config.logging.request_log.as_str() {
            "tracing" => Arc::new(TracingSink),
            _ => Arc::new(ConsoleSink::new(config.logging.color)),
        };
        let logger = Logger::new(config.environment, config.logging.color);

        Self::new(config, sink, logger)
    }

    pub fn new(config: AppConfig, sink: Arc<dyn RecordSink>, logger: Logger) -> Self {
        Self {
            config: Arc::new(config),
            sink,
            logger,
        }
    }
}

/// Routes with the request logger in front of every one of them, fallback included.
pub fn logged_router(state: AppState) -> Router {
    routes::router()
        .layer(from_fn_with_state(state.clone(), middleware::logging::api_logger))
        .with_state(state)
}

/// The full application: logged routes plus the HTTP middleware stack.
pub fn create_app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.timeout_seconds);

    logged_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::new(timeout)),
    )
}
