use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Coarse account tier, matching the `user_type` database enum.
/// Exactly one per user, assigned at creation, mutable only by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Citizen,
    Municipality,
    Admin,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserType::Citizen => write!(f, "citizen"),
            UserType::Municipality => write!(f, "municipality"),
            UserType::Admin => write!(f, "admin"),
        }
    }
}

/// Fine-grained municipality capability grant, matching the `role_type`
/// database enum. Only meaningful for municipality-tier users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "role_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    PublicRelationsOfficer,
    TechnicalOfficer,
    ExternalMaintainer,
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleType::PublicRelationsOfficer => write!(f, "public_relations_officer"),
            RoleType::TechnicalOfficer => write!(f, "technical_officer"),
            RoleType::ExternalMaintainer => write!(f, "external_maintainer"),
        }
    }
}

/// Database model for a user account
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for a role grant
#[derive(Debug, Clone, FromRow)]
pub struct UserRole {
    pub user_id: Uuid,
    pub role_type: RoleType,
    pub label: String,
    pub description: Option<String>,
}
