use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::controllers::poll_controllers::models::{CreatePollRequest, PollResponse};
use crate::models::user_models::CurrentUser;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn create_poll(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    WithRejection(Json(payload), _): WithRejection<Json<CreatePollRequest>, AppError>,
) -> AppResult<(StatusCode, Json<PollResponse>)> {
    let poll = state
        .polls
        .create_poll(&payload.question, &payload.options, &caller)
        .await?;

    Ok((StatusCode::CREATED, Json(poll.into())))
}
