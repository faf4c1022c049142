use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::reports::models::ReportComment;

/// Request DTO for adding or editing a comment
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommentBodyDto {
    #[validate(length(min = 1, max = 4000, message = "Comment body must be 1-4000 characters"))]
    pub body: String,
}

/// Response DTO for a report comment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportCommentDto {
    pub id: Uuid,
    pub report_id: Uuid,
    pub commenter_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReportComment> for ReportCommentDto {
    fn from(c: ReportComment) -> Self {
        Self {
            id: c.id,
            report_id: c.report_id,
            commenter_id: c.commenter_id,
            body: c.body,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
