use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{error::AppError, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMatchRequest {
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub sport: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub sport: String,
    pub created_at: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_matches).post(create_match))
        .route("/:id", get(get_match))
}

pub async fn list_matches(Query(filters): Query<BTreeMap<String, String>>) -> Json<Value> {
    Json(json!({
        "matches": Vec::<Match>::new(),
        "total": 0,
        "filters": filters,
    }))
}

pub async fn create_match(
    State(state): State<AppState>,
    Json(payload): Json<CreateMatchRequest>,
) -> Result<(StatusCode, Json<Match>), AppError> {
    if payload.home_team.trim().is_empty() || payload.away_team.trim().is_empty() {
        state.logger.warn("Rejected match without both team names");
        return Err(AppError::BadRequest(
            "home_team and away_team are required".to_string(),
        ));
    }

    let created = Match {
        id: uuid::Uuid::new_v4().to_string(),
        home_team: payload.home_team,
        away_team: payload.away_team,
        sport: payload.sport.unwrap_or_else(|| "cricket".to_string()),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state.logger.debug(format_args!(
        "Created match {} ({} vs {})",
        created.id, created.home_team, created.away_team
    ));

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_match(Path(id): Path<String>) -> Result<Json<Match>, AppError> {
    Err(AppError::NotFound(format!("match {}", id)))
}
