use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;

use crate::controllers::poll_controllers::models::ResultsResponse;
use crate::models::poll_models::PollId;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn get_results(
    WithRejection(Path(poll_id), _): WithRejection<Path<PollId>, AppError>,
    State(state): State<AppState>,
) -> AppResult<Json<ResultsResponse>> {
    let results = state.polls.get_results(poll_id).await?;

    Ok(Json(results.into()))
}
