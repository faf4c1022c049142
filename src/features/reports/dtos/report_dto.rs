use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{Report, ReportPhoto, ReportStatus};
use crate::shared::validation::is_blank;

/// Text fields of a multipart report submission. Photos arrive as separate
/// file parts and are validated by the handler.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    #[validate(length(min = 3, max = 255, message = "Title must be 3-255 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub category_id: Uuid,

    pub is_public: bool,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be within -90..90"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be within -180..180"))]
    pub longitude: f64,
}

/// Request DTO for the triage PATCH: either assign to a technical officer or
/// reject with a reason.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,
    pub assigned_to_id: Option<Uuid>,
    pub status_reason: Option<String>,
}

/// A triage request resolved to exactly one action, with its required
/// payload present and well-formed.
#[derive(Debug, PartialEq, Eq)]
pub enum TriageRequest {
    Assign { officer_id: Uuid },
    Reject { reason: String },
}

impl UpdateReportStatusDto {
    /// Resolve the DTO into a triage action. Rejections without a
    /// non-blank reason fail here, before any state is touched.
    pub fn triage_request(&self) -> Result<TriageRequest> {
        match self.status {
            ReportStatus::Assigned => {
                let officer_id = self.assigned_to_id.ok_or_else(|| {
                    AppError::Validation(
                        "assigned_to_id is required when assigning a report".to_string(),
                    )
                })?;
                Ok(TriageRequest::Assign { officer_id })
            }
            ReportStatus::Rejected => {
                let reason = self.status_reason.as_deref().unwrap_or_default();
                if is_blank(reason) {
                    return Err(AppError::Validation(
                        "status_reason is required when rejecting a report".to_string(),
                    ));
                }
                Ok(TriageRequest::Reject {
                    reason: reason.trim().to_string(),
                })
            }
            other => Err(AppError::Validation(format!(
                "Triage can only set status to 'assigned' or 'rejected', not '{}'",
                other
            ))),
        }
    }
}

/// Request DTO handing an assigned report to an external maintainer
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignMaintainerDto {
    pub maintainer_id: Uuid,
}

/// Query filters for the paginated report search. Conjunctive; omitted
/// filters are unconstrained.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportFilterQuery {
    pub status: Option<ReportStatus>,
    pub is_public: Option<bool>,
    pub category_id: Option<Uuid>,
}

/// Response DTO for a report photo
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportPhotoDto {
    pub id: Uuid,
    pub position: i32,
    pub public_url: String,
}

impl From<ReportPhoto> for ReportPhotoDto {
    fn from(p: ReportPhoto) -> Self {
        Self {
            id: p.id,
            position: p.position,
            public_url: p.public_url,
        }
    }
}

/// Summary projection of a report, used by list and search endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: String,
    pub is_public: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ReportStatus,
    pub status_reason: Option<String>,
    pub reporter_id: Uuid,
    pub assigned_from_id: Option<Uuid>,
    pub assigned_to_id: Option<Uuid>,
    pub maintainer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            category_id: r.category_id,
            title: r.title,
            description: r.description,
            is_public: r.is_public,
            latitude: r.latitude,
            longitude: r.longitude,
            status: r.status,
            status_reason: r.status_reason,
            reporter_id: r.reporter_id,
            assigned_from_id: r.assigned_from_id,
            assigned_to_id: r.assigned_to_id,
            maintainer_id: r.maintainer_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Detail projection: the report with its photos and comments eagerly
/// fetched. Served by GET by id.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportDetailResponseDto {
    #[serde(flatten)]
    pub report: ReportResponseDto,
    pub photos: Vec<ReportPhotoDto>,
    pub comments: Vec<super::ReportCommentDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(
        status: ReportStatus,
        assigned_to_id: Option<Uuid>,
        status_reason: Option<&str>,
    ) -> UpdateReportStatusDto {
        UpdateReportStatusDto {
            status,
            assigned_to_id,
            status_reason: status_reason.map(String::from),
        }
    }

    #[test]
    fn test_assign_requires_officer() {
        let officer = Uuid::new_v4();
        assert_eq!(
            dto(ReportStatus::Assigned, Some(officer), None)
                .triage_request()
                .unwrap(),
            TriageRequest::Assign {
                officer_id: officer
            }
        );
        assert!(dto(ReportStatus::Assigned, None, None)
            .triage_request()
            .is_err());
    }

    #[test]
    fn test_reject_requires_nonblank_reason() {
        assert!(dto(ReportStatus::Rejected, None, None)
            .triage_request()
            .is_err());
        assert!(dto(ReportStatus::Rejected, None, Some(""))
            .triage_request()
            .is_err());
        assert!(dto(ReportStatus::Rejected, None, Some("   \t"))
            .triage_request()
            .is_err());

        let request = dto(ReportStatus::Rejected, None, Some("  duplicate of another report "))
            .triage_request()
            .unwrap();
        assert_eq!(
            request,
            TriageRequest::Reject {
                reason: "duplicate of another report".to_string()
            }
        );
    }

    #[test]
    fn test_triage_accepts_only_assign_or_reject() {
        for status in [
            ReportStatus::PendingApproval,
            ReportStatus::InProgress,
            ReportStatus::Resolved,
        ] {
            assert!(dto(status, None, None).triage_request().is_err());
        }
    }

    #[test]
    fn test_create_report_dto_bounds() {
        let valid = CreateReportDto {
            title: "Pothole on main street".to_string(),
            description: "Deep pothole near the crossing".to_string(),
            category_id: Uuid::new_v4(),
            is_public: true,
            latitude: 45.0,
            longitude: 7.0,
        };
        assert!(valid.validate().is_ok());

        let bad_lat = CreateReportDto {
            latitude: 91.0,
            ..valid
        };
        assert!(bad_lat.validate().is_err());
    }
}
