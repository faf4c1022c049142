use axum::{
    routing::{get, post},
    Router,
};

use crate::features::auth::handlers::{self, AuthState};

/// Public route: login
pub fn public_routes(state: AuthState) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .with_state(state)
}

/// Protected routes (auth middleware applied by caller)
pub fn protected_routes(state: AuthState) -> Router {
    Router::new()
        .route("/api/auth/me", get(handlers::me))
        .with_state(state)
}
