use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;

use crate::controllers::poll_controllers::models::{ListPollsQuery, PollResponse};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn get_all_polls(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ListPollsQuery>, AppError>,
) -> AppResult<Json<Vec<PollResponse>>> {
    let polls = state.polls.list_polls(query.page()).await?;

    Ok(Json(polls.into_iter().map(PollResponse::from).collect()))
}
