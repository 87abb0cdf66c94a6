use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::extract::WithRejection;

use crate::controllers::poll_controllers::models::CastVoteRequest;
use crate::models::{poll_models::PollId, user_models::CurrentUser, vote_record_models::Vote};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn cast_vote(
    WithRejection(Path(poll_id), _): WithRejection<Path<PollId>, AppError>,
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    WithRejection(Json(payload), _): WithRejection<Json<CastVoteRequest>, AppError>,
) -> AppResult<Json<Vote>> {
    let vote = state
        .polls
        .cast_vote(poll_id, payload.option_id, &caller)
        .await?;

    Ok(Json(vote))
}
