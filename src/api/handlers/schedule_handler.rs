use axum::{Json, extract::State, response::IntoResponse};
use tracing::debug;
use validator::Validate;

use crate::{
    api::{app_state::AppState, dto::schedule_dto::*, extract::AppJson},
    error::AppError,
};

pub async fn generate_schedule(
    State(state): State<AppState>,
    AppJson(request): AppJson<ScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let config = &state.scheduler_config;
    let days_ahead = match request.days_ahead {
        Some(days) => u32::try_from(days)
            .map_err(|_| AppError::Validation(format!("days_ahead out of range: {}", days)))?,
        None => config.default_days_ahead,
    };
    if days_ahead > config.max_days_ahead {
        return Err(AppError::Validation(format!(
            "days_ahead must be at most {}, got {}",
            config.max_days_ahead, days_ahead
        )));
    }

    debug!(
        "Generating schedule for {} items, days_ahead={}",
        request.items.len(),
        days_ahead
    );

    let schedule = state
        .study_service
        .schedule(request.items, days_ahead)
        .await?;

    Ok(Json(ScheduleResponse::from(schedule)))
}
