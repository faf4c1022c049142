use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireAdmin, RequireStaff};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{
    RegisterUserDto, UpdateRolesDto, UpdateUserDto, UserFilterQuery, UserResponseDto,
};
use crate::features::users::services::UserService;
use crate::shared::types::{ApiResponse, Page, PaginationQuery};

/// Register a new citizen account
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUserDto,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username already taken")
    ),
    tag = "users"
)]
pub async fn register(
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<RegisterUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.register(&dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(user), None)),
    ))
}

/// Paginated user search (staff only)
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Page of users", body = ApiResponse<Page<UserResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn search_users(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<UserService>>,
    Query(filter): Query<UserFilterQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Page<UserResponseDto>>>> {
    let page = service.search(&filter, &pagination).await?;
    Ok(Json(ApiResponse::success(Some(page), None)))
}

/// Get a user by id (self or admin)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    actor: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    if actor.id != id && !actor.is_admin() {
        return Err(AppError::Unauthorized(
            "You may only view your own account".to_string(),
        ));
    }

    let (user, roles) = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(
        Some(UserResponseDto::from_parts(user, roles)),
        None,
    )))
}

/// Update a user (self or admin; tier changes admin-only)
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    actor: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateUserDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.update(id, &dto, &actor).await?;
    Ok(Json(ApiResponse::success(Some(user), None)))
}

/// Replace a user's role grants (admin only)
#[utoipa::path(
    put,
    path = "/api/users/{id}/roles",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRolesDto,
    responses(
        (status = 200, description = "Roles replaced", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Target is not a municipality account"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn set_roles(
    RequireAdmin(actor): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateRolesDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.set_roles(id, &dto, &actor).await?;
    Ok(Json(ApiResponse::success(Some(user), None)))
}

/// Delete a user (self or admin; admin accounts are never deletable)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    actor: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id, &actor).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("User deleted".to_string()),
    )))
}
