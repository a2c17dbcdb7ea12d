use axum::{Json, extract::State, response::IntoResponse};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::prediction_dto::*, extract::AppJson},
    error::AppError,
};

pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Cadence spaced repetition API is running" }))
}

pub async fn predict_interval(
    State(state): State<AppState>,
    AppJson(request): AppJson<PredictionRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Predicting interval for difficulty={:?}", request.difficulty);

    let result = state.study_service.predict(request).await?;

    Ok(Json(PredictionResponse::from(result)))
}
