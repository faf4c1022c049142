use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireStaff;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{CommentBodyDto, ReportCommentDto};
use crate::features::reports::services::CommentService;
use crate::shared::types::ApiResponse;

/// Add a comment to a report (staff only)
#[utoipa::path(
    post,
    path = "/api/reports/{id}/comments",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = CommentBodyDto,
    responses(
        (status = 201, description = "Comment added", body = ApiResponse<ReportCommentDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn add_comment(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CommentBodyDto>,
) -> Result<(StatusCode, Json<ApiResponse<ReportCommentDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let comment = service.add(id, &dto.body, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(comment), None)),
    ))
}

/// Edit a comment (author only)
#[utoipa::path(
    patch,
    path = "/api/reports/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Report ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    request_body = CommentBodyDto,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<ReportCommentDto>),
        (status = 401, description = "Not the comment author"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn update_comment(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path((id, comment_id)): Path<(Uuid, Uuid)>,
    AppJson(dto): AppJson<CommentBodyDto>,
) -> Result<Json<ApiResponse<ReportCommentDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let comment = service.update(id, comment_id, &dto.body, &user).await?;
    Ok(Json(ApiResponse::success(Some(comment), None)))
}

/// Delete a comment (author only)
#[utoipa::path(
    delete,
    path = "/api/reports/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Report ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 401, description = "Not the comment author"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn delete_comment(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path((id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id, comment_id, &user).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Comment deleted".to_string()),
    )))
}
