use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::controllers::poll_controllers::{
    cast_vote, check_vote, create_poll, delete_poll, get_poll, get_results, get_user_polls, polls,
};
use crate::middleware::jwt::jwt_auth;
use crate::state::AppState;

/// Reads are public; every mutation and caller-specific read goes through
/// `jwt_auth`. Protected methods are registered before `route_layer` so the
/// layer never wraps the public ones.
pub fn poll_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/polls",
            post(create_poll::create_poll)
                .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth))
                .get(polls::get_all_polls),
        )
        .route(
            "/polls/:poll_id",
            delete(delete_poll::delete_poll)
                .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth))
                .get(get_poll::get_poll),
        )
        .route(
            "/polls/:poll_id/vote",
            post(cast_vote::cast_vote)
                .get(check_vote::check_user_vote)
                .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth)),
        )
        .route("/polls/:poll_id/results", get(get_results::get_results))
        .route(
            "/users/me/polls",
            get(get_user_polls::get_polls_by_user)
                .route_layer(middleware::from_fn_with_state(state, jwt_auth)),
        )
}
