use axum::{routing::get, Router};

use crate::AppState;

pub mod commentary;
pub mod health;
pub mod matches;

/// All API routes, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .nest("/matches", matches::router())
        .nest("/matches/:id/commentary", commentary::router())
}
