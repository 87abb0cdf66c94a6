use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::models::{poll_models::PollId, user_models::CurrentUser};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn delete_poll(
    WithRejection(Path(poll_id), _): WithRejection<Path<PollId>, AppError>,
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
) -> AppResult<StatusCode> {
    state.polls.delete_poll(poll_id, &caller).await?;

    Ok(StatusCode::NO_CONTENT)
}
