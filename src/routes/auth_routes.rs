use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::controllers::auth_controllers::{login, me, register};
use crate::middleware::jwt::jwt_auth;
use crate::state::AppState;

pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register::register))
        .route("/login", post(login::login))
        .route(
            "/users/me",
            get(me::me).route_layer(middleware::from_fn_with_state(state, jwt_auth)),
        )
}
