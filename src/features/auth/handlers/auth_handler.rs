use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{LoginDto, LoginResponseDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::password;
use crate::features::auth::token::TokenService;
use crate::features::users::dtos::UserResponseDto;
use crate::features::users::services::UserService;
use crate::shared::types::ApiResponse;

/// State for auth handlers
#[derive(Clone)]
pub struct AuthState {
    pub user_service: Arc<UserService>,
    pub token_service: Arc<TokenService>,
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponseDto>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    AppJson(dto): AppJson<LoginDto>,
) -> Result<Json<ApiResponse<LoginResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // A missing account and a wrong password answer identically
    let (user, roles) = state
        .user_service
        .get_by_username(&dto.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

    if !password::verify_password(&dto.password, &user.password_hash) {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let access_token = state.token_service.issue(&user, &roles)?;
    tracing::info!("User {} logged in", user.id);

    Ok(Json(ApiResponse::success(
        Some(LoginResponseDto {
            access_token,
            token_type: "Bearer".to_string(),
            user: UserResponseDto::from_parts(user, roles),
        }),
        None,
    )))
}

/// Get the calling user's own account
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Caller account", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(
    caller: AuthenticatedUser,
    State(state): State<AuthState>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let (user, roles) = state.user_service.get_by_id(caller.id).await?;
    Ok(Json(ApiResponse::success(
        Some(UserResponseDto::from_parts(user, roles)),
        None,
    )))
}
