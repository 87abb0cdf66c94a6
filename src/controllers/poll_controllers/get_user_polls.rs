use axum::{
    extract::{Extension, Query, State},
    Json,
};
use axum_extra::extract::WithRejection;

use crate::controllers::poll_controllers::models::{ListPollsQuery, PollResponse};
use crate::models::user_models::CurrentUser;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn get_polls_by_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    WithRejection(Query(query), _): WithRejection<Query<ListPollsQuery>, AppError>,
) -> AppResult<Json<Vec<PollResponse>>> {
    let polls = state.polls.list_owned_polls(&caller, query.page()).await?;

    Ok(Json(polls.into_iter().map(PollResponse::from).collect()))
}
