use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;

use crate::controllers::auth_controllers::models::{RegisterRequest, UserResponse};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .auth
        .register(&body.username, &body.password)
        .await
        .map_err(|e| match e {
            AppError::Conflict(_) => {
                AppError::BadRequest("Username already registered".to_string())
            }
            other => other,
        })?;

    Ok(Json(user.into()))
}
