use axum::{extract::State, Form, Json};
use axum_extra::extract::WithRejection;

use crate::controllers::auth_controllers::models::LoginForm;
use crate::state::AppState;
use crate::utils::auth::TokenResponse;
use crate::utils::error::{AppError, AppResult};

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Form(form), _): WithRejection<Form<LoginForm>, AppError>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.auth.login(&form.username, &form.password).await?;

    Ok(Json(token))
}
