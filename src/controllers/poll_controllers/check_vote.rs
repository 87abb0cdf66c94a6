use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::extract::WithRejection;

use crate::controllers::poll_controllers::models::CheckVoteResponse;
use crate::models::{poll_models::PollId, user_models::CurrentUser};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn check_user_vote(
    WithRejection(Path(poll_id), _): WithRejection<Path<PollId>, AppError>,
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
) -> AppResult<Json<CheckVoteResponse>> {
    let vote = state.polls.caller_vote(poll_id, &caller).await?;

    Ok(Json(vote.into()))
}
