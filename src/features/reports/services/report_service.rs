use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    CreateReportDto, ReportCommentDto, ReportDetailResponseDto, ReportFilterQuery,
    ReportPhotoDto, ReportResponseDto, TriageRequest,
};
use crate::features::reports::models::{Report, ReportComment, ReportPhoto};
use crate::features::reports::workflow::{self, ReportAction};
use crate::features::users::models::UserType;
use crate::modules::storage::PhotoStore;
use crate::shared::types::{Page, PaginationQuery};

const REPORT_COLUMNS: &str = "id, category_id, title, description, is_public, latitude, longitude, \
     status, status_reason, reporter_id, assigned_from_id, assigned_to_id, maintainer_id, \
     updated_by, created_at, updated_at";

/// One photo part taken from the multipart submission
pub struct PhotoUpload {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Service for the report lifecycle: submission, triage, assignment chain,
/// resolution, and read-side queries.
pub struct ReportService {
    pool: PgPool,
    photo_store: Arc<PhotoStore>,
}

impl ReportService {
    pub fn new(pool: PgPool, photo_store: Arc<PhotoStore>) -> Self {
        Self { pool, photo_store }
    }

    /// Submit a new report with its photos.
    ///
    /// Photos go to the object store first; the report row and its photo
    /// rows are then written in one transaction, so a failed photo insert
    /// can never leave a photo-less report behind. If the transaction fails
    /// after uploads succeeded, the uploaded objects are deleted best-effort.
    pub async fn create(
        &self,
        dto: &CreateReportDto,
        photos: Vec<PhotoUpload>,
        reporter: &AuthenticatedUser,
    ) -> Result<ReportDetailResponseDto> {
        self.ensure_category_active(dto.category_id).await?;

        let report_id = Uuid::new_v4();

        let mut stored = Vec::with_capacity(photos.len());
        for (index, photo) in photos.iter().enumerate() {
            let position = index + 1;
            let key = self
                .photo_store
                .photo_key(report_id, position, &photo.content_type);
            let object = self
                .photo_store
                .upload(&key, photo.data.clone(), &photo.content_type)
                .await?;
            stored.push(object);
        }

        let result = self
            .insert_report_with_photos(report_id, dto, &stored, reporter.id)
            .await;

        match result {
            Ok((report, photo_rows)) => {
                tracing::info!(
                    "Created report {} by {} ({} photos)",
                    report.id,
                    reporter.id,
                    photo_rows.len()
                );
                Ok(ReportDetailResponseDto {
                    report: report.into(),
                    photos: photo_rows.into_iter().map(ReportPhotoDto::from).collect(),
                    comments: Vec::new(),
                })
            }
            Err(e) => {
                // The report row rolled back; orphaned objects are the only
                // residue worth cleaning up.
                for object in &stored {
                    if let Err(cleanup) = self.photo_store.delete(&object.storage_path).await {
                        tracing::warn!(
                            "Failed to clean up photo '{}' after rollback: {}",
                            object.storage_path,
                            cleanup
                        );
                    }
                }
                Err(e)
            }
        }
    }

    async fn insert_report_with_photos(
        &self,
        report_id: Uuid,
        dto: &CreateReportDto,
        stored: &[crate::modules::storage::StoredPhoto],
        reporter_id: Uuid,
    ) -> Result<(Report, Vec<ReportPhoto>)> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports
                (id, category_id, title, description, is_public, latitude, longitude, reporter_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(report_id)
        .bind(dto.category_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.is_public)
        .bind(dto.latitude)
        .bind(dto.longitude)
        .bind(reporter_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert report: {:?}", e);
            AppError::Database(e)
        })?;

        let mut photo_rows = Vec::with_capacity(stored.len());
        for (index, object) in stored.iter().enumerate() {
            let photo = sqlx::query_as::<_, ReportPhoto>(
                r#"
                INSERT INTO report_photos (report_id, position, public_url, storage_path)
                VALUES ($1, $2, $3, $4)
                RETURNING id, report_id, position, public_url, storage_path
                "#,
            )
            .bind(report_id)
            .bind((index + 1) as i32)
            .bind(&object.public_url)
            .bind(&object.storage_path)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert report photo: {:?}", e);
                AppError::Database(e)
            })?;
            photo_rows.push(photo);
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok((report, photo_rows))
    }

    async fn ensure_category_active(&self, category_id: Uuid) -> Result<()> {
        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM categories WHERE id = $1")
                .bind(category_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)?;

        match active {
            Some(true) => Ok(()),
            Some(false) => Err(AppError::Validation(format!(
                "Category {} is no longer active",
                category_id
            ))),
            None => Err(AppError::Validation(format!(
                "Category {} does not exist",
                category_id
            ))),
        }
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch report: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    /// Detail projection: report with photos and comments eagerly fetched.
    /// Public; report reads never hide existence.
    pub async fn get_detail(&self, id: Uuid) -> Result<ReportDetailResponseDto> {
        let report = self.get_by_id(id).await?;

        let photos = sqlx::query_as::<_, ReportPhoto>(
            r#"
            SELECT id, report_id, position, public_url, storage_path
            FROM report_photos
            WHERE report_id = $1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let comments = sqlx::query_as::<_, ReportComment>(
            r#"
            SELECT id, report_id, commenter_id, body, created_at, updated_at
            FROM report_comments
            WHERE report_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(ReportDetailResponseDto {
            report: report.into(),
            photos: photos.into_iter().map(ReportPhotoDto::from).collect(),
            comments: comments.into_iter().map(ReportCommentDto::from).collect(),
        })
    }

    /// Paginated, conjunctively filtered report search, most recently
    /// updated first.
    pub async fn search(
        &self,
        filter: &ReportFilterQuery,
        pagination: &PaginationQuery,
    ) -> Result<Page<ReportResponseDto>> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM reports");
        let mut page_query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {REPORT_COLUMNS} FROM reports"));

        push_report_filters(&mut count_query, filter);
        push_report_filters(&mut page_query, filter);

        let total_items: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count reports: {:?}", e);
                AppError::Database(e)
            })?;

        page_query
            .push(" ORDER BY updated_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let reports: Vec<Report> = page_query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search reports: {:?}", e);
                AppError::Database(e)
            })?;

        let items = reports.into_iter().map(ReportResponseDto::from).collect();
        Ok(Page::new(items, total_items, pagination))
    }

    /// Triage a pending report: assign it to a technical officer or reject
    /// it with a reason. Staff-only (route guard).
    pub async fn triage(
        &self,
        id: Uuid,
        request: &TriageRequest,
        actor: &AuthenticatedUser,
    ) -> Result<ReportResponseDto> {
        let report = self.get_by_id(id).await?;

        let report = match request {
            TriageRequest::Assign { officer_id } => {
                let next = workflow::apply(report.status, ReportAction::Assign)
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                self.ensure_assignable_officer(*officer_id).await?;

                sqlx::query_as::<_, Report>(&format!(
                    r#"
                    UPDATE reports
                    SET status = $2,
                        assigned_to_id = $3,
                        assigned_from_id = $4,
                        updated_by = $4,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING {REPORT_COLUMNS}
                    "#
                ))
                .bind(id)
                .bind(next)
                .bind(officer_id)
                .bind(actor.id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to assign report: {:?}", e);
                    AppError::Database(e)
                })?
            }
            TriageRequest::Reject { reason } => {
                let next = workflow::apply(report.status, ReportAction::Reject)
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;

                sqlx::query_as::<_, Report>(&format!(
                    r#"
                    UPDATE reports
                    SET status = $2,
                        status_reason = $3,
                        updated_by = $4,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING {REPORT_COLUMNS}
                    "#
                ))
                .bind(id)
                .bind(next)
                .bind(reason)
                .bind(actor.id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to reject report: {:?}", e);
                    AppError::Database(e)
                })?
            }
        };

        tracing::info!("Report {} triaged to '{}' by {}", id, report.status, actor.id);
        Ok(report.into())
    }

    /// Hand an assigned report to an external maintainer, moving it to
    /// in_progress. Requires the technical_officer role (route guard).
    pub async fn assign_maintainer(
        &self,
        id: Uuid,
        maintainer_id: Uuid,
        actor: &AuthenticatedUser,
    ) -> Result<ReportResponseDto> {
        let report = self.get_by_id(id).await?;
        let next = workflow::apply(report.status, ReportAction::AssignMaintainer)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        self.ensure_maintainer(maintainer_id).await?;

        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET status = $2,
                maintainer_id = $3,
                updated_by = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(next)
        .bind(maintainer_id)
        .bind(actor.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to assign maintainer: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Report {} handed to maintainer {} by {}",
            id,
            maintainer_id,
            actor.id
        );
        Ok(report.into())
    }

    /// Close out an in-progress report. Only the assigned maintainer may
    /// resolve it; the check is on ownership, not just role.
    pub async fn resolve(&self, id: Uuid, actor: &AuthenticatedUser) -> Result<ReportResponseDto> {
        let report = self.get_by_id(id).await?;

        if report.maintainer_id != Some(actor.id) {
            return Err(AppError::Unauthorized(
                "Only the assigned maintainer may resolve this report".to_string(),
            ));
        }

        let next = workflow::apply(report.status, ReportAction::Resolve)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET status = $2,
                updated_by = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(next)
        .bind(actor.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve report: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Report {} resolved by maintainer {}", id, actor.id);
        Ok(report.into())
    }

    /// Reports currently assigned to a technical officer
    pub async fn list_assigned_to(
        &self,
        officer_id: Uuid,
        pagination: &PaginationQuery,
    ) -> Result<Page<ReportResponseDto>> {
        self.list_by_column("assigned_to_id", officer_id, pagination)
            .await
    }

    /// Reports currently handled by an external maintainer
    pub async fn list_maintained_by(
        &self,
        maintainer_id: Uuid,
        pagination: &PaginationQuery,
    ) -> Result<Page<ReportResponseDto>> {
        self.list_by_column("maintainer_id", maintainer_id, pagination)
            .await
    }

    async fn list_by_column(
        &self,
        column: &str,
        user_id: Uuid,
        pagination: &PaginationQuery,
    ) -> Result<Page<ReportResponseDto>> {
        let total_items: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM reports WHERE {column} = $1"))
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

        let reports = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE {column} = $1
            ORDER BY updated_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list reports by {}: {:?}", column, e);
            AppError::Database(e)
        })?;

        let items = reports.into_iter().map(ReportResponseDto::from).collect();
        Ok(Page::new(items, total_items, pagination))
    }

    /// The assignment target must be able to act as a technical officer;
    /// see [`can_receive_assignment`].
    async fn ensure_assignable_officer(&self, user_id: Uuid) -> Result<()> {
        let row: Option<(UserType, bool)> = sqlx::query_as(
            r#"
            SELECT u.user_type,
                   EXISTS (
                       SELECT 1 FROM user_roles r
                       WHERE r.user_id = u.id AND r.role_type = 'technical_officer'
                   )
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        match row {
            Some((user_type, holds_role)) if can_receive_assignment(user_type, holds_role) => {
                Ok(())
            }
            Some(_) => Err(AppError::Validation(
                "assigned_to_id must reference a technical officer".to_string(),
            )),
            None => Err(AppError::Validation(
                "assigned_to_id references a user that does not exist".to_string(),
            )),
        }
    }

    /// The maintainer target must hold the external_maintainer role
    async fn ensure_maintainer(&self, user_id: Uuid) -> Result<()> {
        let holds_role: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM user_roles
                WHERE user_id = $1 AND role_type = 'external_maintainer'
            )
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if holds_role {
            Ok(())
        } else {
            Err(AppError::Validation(
                "maintainer_id must reference a user holding the external_maintainer role"
                    .to_string(),
            ))
        }
    }
}

/// Whether an account can receive a triage assignment: a municipality
/// account holding the technical_officer grant, or an admin, who passes
/// role checks by tier. Mirrors the maintainer-handoff rule.
fn can_receive_assignment(user_type: UserType, holds_technical_officer: bool) -> bool {
    match user_type {
        UserType::Admin => true,
        UserType::Municipality => holds_technical_officer,
        UserType::Citizen => false,
    }
}

/// Append the search filters to a query. Filters are conjunctive; omitted
/// filters add no predicate. Both the count and the page query go through
/// here so the two can never disagree.
fn push_report_filters(query: &mut QueryBuilder<Postgres>, filter: &ReportFilterQuery) {
    query.push(" WHERE 1=1");
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(is_public) = filter.is_public {
        query.push(" AND is_public = ").push_bind(is_public);
    }
    if let Some(category_id) = filter.category_id {
        query.push(" AND category_id = ").push_bind(category_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::ReportStatus;

    #[test]
    fn test_assignment_target_rules() {
        // admins pass by tier alone
        assert!(can_receive_assignment(UserType::Admin, false));
        // municipality accounts need the grant
        assert!(can_receive_assignment(UserType::Municipality, true));
        assert!(!can_receive_assignment(UserType::Municipality, false));
        // citizens never receive assignments, role grant or not
        assert!(!can_receive_assignment(UserType::Citizen, true));
        assert!(!can_receive_assignment(UserType::Citizen, false));
    }

    #[test]
    fn test_each_set_filter_adds_a_predicate() {
        let filter = ReportFilterQuery {
            status: Some(ReportStatus::Assigned),
            is_public: Some(true),
            category_id: Some(Uuid::new_v4()),
        };

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM reports");
        push_report_filters(&mut query, &filter);
        let sql = query.into_sql();

        assert!(sql.contains("status = $1"));
        assert!(sql.contains("is_public = $2"));
        assert!(sql.contains("category_id = $3"));
    }

    #[test]
    fn test_filters_compose_conjunctively() {
        let filter = ReportFilterQuery {
            status: Some(ReportStatus::Resolved),
            is_public: None,
            category_id: Some(Uuid::new_v4()),
        };

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM reports");
        push_report_filters(&mut query, &filter);
        let sql = query.into_sql();

        // only the set filters appear, each joined with AND
        assert_eq!(sql.matches(" AND ").count(), 2);
        assert!(sql.contains("status = $1"));
        assert!(!sql.contains("is_public"));
        assert!(sql.contains("category_id = $2"));
    }

    #[test]
    fn test_empty_filter_is_unconstrained() {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM reports");
        push_report_filters(&mut query, &ReportFilterQuery::default());
        let sql = query.into_sql();

        assert!(sql.ends_with("WHERE 1=1"));
        assert!(!sql.contains(" AND "));
    }
}
