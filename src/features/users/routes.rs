use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::users::handlers;
use crate::features::users::services::UserService;

/// Public route: citizen self-registration
pub fn public_routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users", post(handlers::register))
        .with_state(service)
}

/// Protected routes (auth middleware applied by caller)
pub fn protected_routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users", get(handlers::search_users))
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/api/users/{id}/roles", axum::routing::put(handlers::set_roles))
        .with_state(service)
}
