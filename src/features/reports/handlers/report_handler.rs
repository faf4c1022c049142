use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{
    RequireCitizen, RequireExternalMaintainer, RequireStaff, RequireTechnicalOfficer,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    AssignMaintainerDto, CreateReportDto, ReportDetailResponseDto, ReportFilterQuery,
    ReportResponseDto, UpdateReportStatusDto,
};
use crate::features::reports::services::{PhotoUpload, ReportService};
use crate::shared::constants::{MAX_PHOTO_SIZE, MAX_REPORT_PHOTOS};
use crate::shared::types::{ApiResponse, Page, PaginationQuery};

/// Submit a new report (citizen only)
///
/// Accepts multipart/form-data with text fields `title`, `description`,
/// `category_id`, `latitude`, `longitude`, `is_public` and up to five
/// repeated `photo` file parts.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body(content = CreateReportDto, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Report submitted", body = ApiResponse<ReportDetailResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Citizen account required"),
        (status = 503, description = "Photo upload failed")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create_report(
    RequireCitizen(user): RequireCitizen,
    State(service): State<Arc<ReportService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ReportDetailResponseDto>>)> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut category_id: Option<Uuid> = None;
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;
    let mut is_public = true;
    let mut photos: Vec<PhotoUpload> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "title" => title = Some(read_text(field, "title").await?),
            "description" => description = Some(read_text(field, "description").await?),
            "category_id" => {
                let text = read_text(field, "category_id").await?;
                category_id = Some(text.parse().map_err(|_| {
                    AppError::BadRequest("category_id must be a valid UUID".to_string())
                })?);
            }
            "latitude" => {
                let text = read_text(field, "latitude").await?;
                latitude = Some(text.parse().map_err(|_| {
                    AppError::BadRequest("latitude must be a number".to_string())
                })?);
            }
            "longitude" => {
                let text = read_text(field, "longitude").await?;
                longitude = Some(text.parse().map_err(|_| {
                    AppError::BadRequest("longitude must be a number".to_string())
                })?);
            }
            "is_public" => {
                let text = read_text(field, "is_public").await?;
                is_public = text.parse().map_err(|_| {
                    AppError::BadRequest("is_public must be true or false".to_string())
                })?;
            }
            "photo" => {
                if photos.len() >= MAX_REPORT_PHOTOS {
                    return Err(AppError::BadRequest(format!(
                        "At most {} photos are allowed",
                        MAX_REPORT_PHOTOS
                    )));
                }

                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                if !content_type.starts_with("image/") {
                    return Err(AppError::BadRequest(
                        "Photos must be image files".to_string(),
                    ));
                }

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read photo bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read photo data: {}", e))
                })?;
                if data.len() > MAX_PHOTO_SIZE {
                    return Err(AppError::BadRequest(format!(
                        "Photos must not exceed {} bytes",
                        MAX_PHOTO_SIZE
                    )));
                }

                photos.push(PhotoUpload {
                    data: data.to_vec(),
                    content_type,
                });
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let dto = CreateReportDto {
        title: title.ok_or_else(|| AppError::BadRequest("title is required".to_string()))?,
        description: description
            .ok_or_else(|| AppError::BadRequest("description is required".to_string()))?,
        category_id: category_id
            .ok_or_else(|| AppError::BadRequest("category_id is required".to_string()))?,
        latitude: latitude
            .ok_or_else(|| AppError::BadRequest("latitude is required".to_string()))?,
        longitude: longitude
            .ok_or_else(|| AppError::BadRequest("longitude is required".to_string()))?,
        is_public,
    };
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = service.create(&dto, photos, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(report), None)),
    ))
}

/// Get a report by id with photos and comments (public)
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportDetailResponseDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportDetailResponseDto>>> {
    let report = service.get_detail(id).await?;
    Ok(Json(ApiResponse::success(Some(report), None)))
}

/// Paginated report search (staff only)
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Page of reports", body = ApiResponse<Page<ReportResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn search_reports(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<ReportService>>,
    Query(filter): Query<ReportFilterQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Page<ReportResponseDto>>>> {
    let page = service.search(&filter, &pagination).await?;
    Ok(Json(ApiResponse::success(Some(page), None)))
}

/// Triage a pending report: assign to a technical officer or reject (staff only)
#[utoipa::path(
    patch,
    path = "/api/reports/{id}/status",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid transition or missing rejection reason"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report_status(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    // Validation happens before the state machine is consulted
    let request = dto.triage_request()?;
    let report = service.triage(id, &request, &user).await?;
    Ok(Json(ApiResponse::success(Some(report), None)))
}

/// Hand an assigned report to an external maintainer (technical officer only)
#[utoipa::path(
    post,
    path = "/api/reports/{id}/maintainer",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = AssignMaintainerDto,
    responses(
        (status = 200, description = "Maintainer assigned", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid transition or maintainer"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn assign_maintainer(
    RequireTechnicalOfficer(user): RequireTechnicalOfficer,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AssignMaintainerDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service
        .assign_maintainer(id, dto.maintainer_id, &user)
        .await?;
    Ok(Json(ApiResponse::success(Some(report), None)))
}

/// Resolve an in-progress report (assigned maintainer only)
#[utoipa::path(
    post,
    path = "/api/reports/{id}/resolve",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report resolved", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid transition"),
        (status = 401, description = "Not the assigned maintainer"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn resolve_report(
    user: AuthenticatedUser,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    // Ownership of the specific report is the real gate here; the service
    // checks maintainer_id against the caller.
    let report = service.resolve(id, &user).await?;
    Ok(Json(ApiResponse::success(Some(report), None)))
}

/// List reports assigned to the calling technical officer
#[utoipa::path(
    get,
    path = "/api/reports/assigned",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of reports", body = ApiResponse<Page<ReportResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_assigned(
    RequireTechnicalOfficer(user): RequireTechnicalOfficer,
    State(service): State<Arc<ReportService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Page<ReportResponseDto>>>> {
    let page = service.list_assigned_to(user.id, &pagination).await?;
    Ok(Json(ApiResponse::success(Some(page), None)))
}

/// List reports handled by the calling external maintainer
#[utoipa::path(
    get,
    path = "/api/reports/maintained",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of reports", body = ApiResponse<Page<ReportResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_maintained(
    RequireExternalMaintainer(user): RequireExternalMaintainer,
    State(service): State<Arc<ReportService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Page<ReportResponseDto>>>> {
    let page = service.list_maintained_by(user.id, &pagination).await?;
    Ok(Json(ApiResponse::success(Some(page), None)))
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read {} field: {}", name, e)))
}
