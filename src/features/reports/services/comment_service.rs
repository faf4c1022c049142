use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::ReportCommentDto;
use crate::features::reports::models::ReportComment;

const COMMENT_COLUMNS: &str = "id, report_id, commenter_id, body, created_at, updated_at";

/// Service for report comments. Adding is open to staff; editing and
/// deleting belong to the comment's author alone.
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn add(
        &self,
        report_id: Uuid,
        body: &str,
        actor: &AuthenticatedUser,
    ) -> Result<ReportCommentDto> {
        let report_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM reports WHERE id = $1)")
                .bind(report_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

        if !report_exists {
            return Err(AppError::NotFound(format!(
                "Report {} not found",
                report_id
            )));
        }

        let comment = sqlx::query_as::<_, ReportComment>(&format!(
            r#"
            INSERT INTO report_comments (report_id, commenter_id, body)
            VALUES ($1, $2, $3)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(report_id)
        .bind(actor.id)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to add comment: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Comment {} added to report {} by {}", comment.id, report_id, actor.id);
        Ok(comment.into())
    }

    pub async fn update(
        &self,
        report_id: Uuid,
        comment_id: Uuid,
        body: &str,
        actor: &AuthenticatedUser,
    ) -> Result<ReportCommentDto> {
        let comment = self.get_owned(report_id, comment_id, actor).await?;

        let updated = sqlx::query_as::<_, ReportComment>(&format!(
            r#"
            UPDATE report_comments
            SET body = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(comment.id)
        .bind(body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update comment: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(updated.into())
    }

    pub async fn delete(
        &self,
        report_id: Uuid,
        comment_id: Uuid,
        actor: &AuthenticatedUser,
    ) -> Result<()> {
        let comment = self.get_owned(report_id, comment_id, actor).await?;

        sqlx::query("DELETE FROM report_comments WHERE id = $1")
            .bind(comment.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete comment: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Comment {} deleted by {}", comment.id, actor.id);
        Ok(())
    }

    /// Fetch a comment and enforce author ownership. Ownership, not tier:
    /// even an admin may not edit someone else's comment.
    async fn get_owned(
        &self,
        report_id: Uuid,
        comment_id: Uuid,
        actor: &AuthenticatedUser,
    ) -> Result<ReportComment> {
        let comment = sqlx::query_as::<_, ReportComment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM report_comments WHERE id = $1 AND report_id = $2"
        ))
        .bind(comment_id)
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))?;

        if comment.commenter_id != actor.id {
            return Err(AppError::Unauthorized(
                "Only the comment's author may modify it".to_string(),
            ));
        }

        Ok(comment)
    }
}
