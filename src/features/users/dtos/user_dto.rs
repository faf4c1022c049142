use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::{RoleType, User, UserRole, UserType};
use crate::shared::validation::USERNAME_REGEX;

/// Request DTO for public registration. Always creates a citizen account;
/// tier upgrades are a separate admin operation.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserDto {
    #[validate(
        length(min = 3, max = 64, message = "Username must be 3-64 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may contain letters, digits and underscores, and must not start with a digit"
        )
    )]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 128, message = "Last name is required"))]
    pub last_name: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Request DTO for profile updates. `user_type` is honored only when the
/// caller is an admin editing somebody else's account.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 128, message = "First name must not be empty"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 128, message = "Last name must not be empty"))]
    pub last_name: Option<String>,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: Option<String>,

    pub user_type: Option<UserType>,
}

/// One role grant in a PUT roles request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RoleGrantDto {
    pub role_type: RoleType,

    #[validate(length(min = 1, max = 128, message = "Role label is required"))]
    pub label: String,

    pub description: Option<String>,
}

/// Request DTO replacing a user's role set (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRolesDto {
    #[validate(nested)]
    pub roles: Vec<RoleGrantDto>,
}

/// Query filters for the paginated user search. All filters are conjunctive;
/// omitted filters are unconstrained.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserFilterQuery {
    /// Case-insensitive substring match on first name
    pub first_name: Option<String>,
    /// Case-insensitive substring match on last name
    pub last_name: Option<String>,
    /// Case-insensitive substring match on email
    pub email: Option<String>,
    /// Users holding this role
    pub role: Option<RoleType>,
}

/// Response DTO for a role grant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRoleDto {
    pub role_type: RoleType,
    pub label: String,
    pub description: Option<String>,
}

impl From<UserRole> for UserRoleDto {
    fn from(r: UserRole) -> Self {
        Self {
            role_type: r.role_type,
            label: r.label,
            description: r.description,
        }
    }
}

/// Response DTO for a user account
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub roles: Vec<UserRoleDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserResponseDto {
    pub fn from_parts(user: User, roles: Vec<UserRole>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            user_type: user.user_type,
            roles: roles.into_iter().map(UserRoleDto::from).collect(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    fn register_dto(username: &str, password: &str) -> RegisterUserDto {
        RegisterUserDto {
            username: username.to_string(),
            email: SafeEmail().fake(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_register_dto_accepts_valid_input() {
        assert!(register_dto("ada_l", "s3cret-passw0rd").validate().is_ok());
    }

    #[test]
    fn test_register_dto_rejects_bad_username() {
        assert!(register_dto("1ada", "s3cret-passw0rd").validate().is_err());
        assert!(register_dto("ada lovelace", "s3cret-passw0rd")
            .validate()
            .is_err());
    }

    #[test]
    fn test_register_dto_rejects_short_password() {
        assert!(register_dto("ada_l", "short").validate().is_err());
    }
}
