use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Report status enum matching the database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    PendingApproval,
    Assigned,
    Rejected,
    InProgress,
    Resolved,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::PendingApproval => write!(f, "pending_approval"),
            ReportStatus::Assigned => write!(f, "assigned"),
            ReportStatus::Rejected => write!(f, "rejected"),
            ReportStatus::InProgress => write!(f, "in_progress"),
            ReportStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// Database model for a citizen report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
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
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for a report photo. Owned by its report; `position` is
/// 1-based and order-significant.
#[derive(Debug, Clone, FromRow)]
pub struct ReportPhoto {
    pub id: Uuid,
    pub report_id: Uuid,
    pub position: i32,
    pub public_url: String,
    pub storage_path: String,
}

/// Database model for a report comment
#[derive(Debug, Clone, FromRow)]
pub struct ReportComment {
    pub id: Uuid,
    pub report_id: Uuid,
    pub commenter_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
