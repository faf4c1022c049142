use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a report category
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}
