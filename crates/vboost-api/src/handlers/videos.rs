//! Video status handler.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use vboost_models::VideoStatusResponse;

use crate::error::ApiResult;
use crate::services::StatusService;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct VideoStatusQuery {
    pub id: Option<String>,
}

/// `GET /api/videos?id=`
pub async fn get_video_status(
    State(state): State<AppState>,
    Query(query): Query<VideoStatusQuery>,
) -> ApiResult<Json<VideoStatusResponse>> {
    let status = StatusService::new(&state).lookup(query.id.as_deref()).await?;
    Ok(Json(status))
}
