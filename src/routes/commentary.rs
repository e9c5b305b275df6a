use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{error::AppError, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCommentaryRequest {
    pub message: String,
    #[serde(default)]
    pub minute: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Commentary {
    pub id: String,
    pub match_id: String,
    pub message: String,
    pub minute: Option<u32>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentaryPath {
    pub id: String,
    pub commentary_id: String,
}

/// Mounted under `/matches/:id/commentary`, so every handler sees `id`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_commentary).post(create_commentary))
        .route("/:commentary_id", delete(delete_commentary))
}

pub async fn list_commentary(Path(match_id): Path<String>) -> Json<Value> {
    Json(json!({
        "match_id": match_id,
        "commentary": Vec::<Commentary>::new(),
        "total": 0,
    }))
}

pub async fn create_commentary(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Json(payload): Json<CreateCommentaryRequest>,
) -> Result<(StatusCode, Json<Commentary>), AppError> {
    if payload.message.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    let entry = Commentary {
        id: uuid::Uuid::new_v4().to_string(),
        match_id,
        message: payload.message,
        minute: payload.minute,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state
        .logger
        .debug(format_args!("Commentary {} added to match {}", entry.id, entry.match_id));

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn delete_commentary(Path(path): Path<CommentaryPath>) -> Result<StatusCode, AppError> {
    Err(AppError::NotFound(format!(
        "commentary {} for match {}",
        path.commentary_id, path.id
    )))
}
