use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::categories::models::Category;

/// Service for category lookups
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all active categories
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, icon, description, is_active
            FROM categories
            WHERE is_active = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Get an active category by id
    pub async fn get_by_id(&self, id: Uuid) -> Result<CategoryResponseDto> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, icon, description, is_active
            FROM categories
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category: {:?}", e);
            AppError::Database(e)
        })?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }
}
