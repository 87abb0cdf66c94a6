use axum::{extract::Extension, Json};

use crate::controllers::auth_controllers::models::UserResponse;
use crate::models::user_models::CurrentUser;

pub async fn me(Extension(caller): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(caller.into())
}
