use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;

use crate::controllers::poll_controllers::models::PollResponse;
use crate::models::poll_models::PollId;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn get_poll(
    WithRejection(Path(poll_id), _): WithRejection<Path<PollId>, AppError>,
    State(state): State<AppState>,
) -> AppResult<Json<PollResponse>> {
    let poll = state.polls.get_poll(poll_id).await?;

    Ok(Json(poll.into()))
}
