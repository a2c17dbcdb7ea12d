use axum::{Json, extract::State, response::IntoResponse};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::ease_dto::*, extract::AppQuery},
    error::AppError,
};

pub async fn update_ease_factor(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<UpdateEaseFactorParams>,
) -> Result<impl IntoResponse, AppError> {
    debug!(
        "Updating ease factor: current={}, performance={}",
        params.current_ease, params.performance
    );

    let new_ease = state
        .study_service
        .update_ease_factor(params.current_ease, params.performance)?;

    Ok(Json(UpdateEaseFactorResponse::new(
        params.current_ease,
        new_ease,
    )))
}
