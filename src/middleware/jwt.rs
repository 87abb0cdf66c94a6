use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::state::AppState;
use crate::utils::error::AppError;

/// Resolves the bearer token into a [`CurrentUser`](crate::models::user_models::CurrentUser)
/// request extension, or rejects the request with 401.
pub async fn jwt_auth(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer
        .ok_or_else(|| AppError::AuthenticationError("Not authenticated".to_string()))?;

    let caller = state.auth.resolve_caller(bearer.token()).await?;

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
