use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::password;
use crate::features::users::dtos::{
    RegisterUserDto, UpdateRolesDto, UpdateUserDto, UserFilterQuery, UserResponseDto,
};
use crate::features::users::models::{User, UserRole, UserType};
use crate::shared::types::{Page, PaginationQuery};

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, user_type, password_hash, created_at, updated_at";

/// Service for user account and role-grant operations
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new citizen account. Tier upgrades are admin-only and go
    /// through `update`.
    pub async fn register(&self, dto: &RegisterUserDto) -> Result<UserResponseDto> {
        let password_hash = password::hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, user_type, password_hash)
            VALUES ($1, $2, $3, $4, 'citizen', $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if AppError::is_unique_violation(&e) {
                AppError::Conflict(format!("Username '{}' is already taken", dto.username))
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tracing::info!("Registered citizen account: {} ({})", user.username, user.id);

        Ok(UserResponseDto::from_parts(user, Vec::new()))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<(User, Vec<UserRole>)> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        let roles = self.roles_for(id).await?;
        Ok((user, roles))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<(User, Vec<UserRole>)>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user by username: {:?}", e);
            AppError::Database(e)
        })?;

        match user {
            Some(user) => {
                let roles = self.roles_for(user.id).await?;
                Ok(Some((user, roles)))
            }
            None => Ok(None),
        }
    }

    async fn roles_for(&self, user_id: Uuid) -> Result<Vec<UserRole>> {
        sqlx::query_as::<_, UserRole>(
            "SELECT user_id, role_type, label, description FROM user_roles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch user roles: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Paginated, conjunctively filtered user search. Name and email filters
    /// are case-insensitive substring matches; the role filter keeps users
    /// holding that grant. Ordering is by username, which is unique, so
    /// pages are stable.
    pub async fn search(
        &self,
        filter: &UserFilterQuery,
        pagination: &PaginationQuery,
    ) -> Result<Page<UserResponseDto>> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users u");
        let mut page_query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM users u",
            USER_COLUMNS
                .split(", ")
                .map(|c| format!("u.{}", c))
                .collect::<Vec<_>>()
                .join(", ")
        ));

        for query in [&mut count_query, &mut page_query] {
            query.push(" WHERE 1=1");
            if let Some(first_name) = &filter.first_name {
                query
                    .push(" AND u.first_name ILIKE ")
                    .push_bind(format!("%{}%", first_name));
            }
            if let Some(last_name) = &filter.last_name {
                query
                    .push(" AND u.last_name ILIKE ")
                    .push_bind(format!("%{}%", last_name));
            }
            if let Some(email) = &filter.email {
                query
                    .push(" AND u.email ILIKE ")
                    .push_bind(format!("%{}%", email));
            }
            if let Some(role) = filter.role {
                query
                    .push(" AND EXISTS (SELECT 1 FROM user_roles r WHERE r.user_id = u.id AND r.role_type = ")
                    .push_bind(role)
                    .push(")");
            }
        }

        let total_items: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        page_query
            .push(" ORDER BY u.username LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let users: Vec<User> = page_query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search users: {:?}", e);
                AppError::Database(e)
            })?;

        let mut roles_by_user = self
            .roles_for_many(users.iter().map(|u| u.id).collect())
            .await?;

        let items = users
            .into_iter()
            .map(|u| {
                let roles = roles_by_user.remove(&u.id).unwrap_or_default();
                UserResponseDto::from_parts(u, roles)
            })
            .collect();

        Ok(Page::new(items, total_items, pagination))
    }

    async fn roles_for_many(&self, user_ids: Vec<Uuid>) -> Result<HashMap<Uuid, Vec<UserRole>>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let roles = sqlx::query_as::<_, UserRole>(
            "SELECT user_id, role_type, label, description FROM user_roles WHERE user_id = ANY($1)",
        )
        .bind(&user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch role grants: {:?}", e);
            AppError::Database(e)
        })?;

        let mut grouped: HashMap<Uuid, Vec<UserRole>> = HashMap::new();
        for role in roles {
            grouped.entry(role.user_id).or_default().push(role);
        }
        Ok(grouped)
    }

    /// Update a user. Callers may edit their own profile; admins may edit
    /// anyone. Tier changes are admin-only and never self-applied.
    pub async fn update(
        &self,
        id: Uuid,
        dto: &UpdateUserDto,
        actor: &AuthenticatedUser,
    ) -> Result<UserResponseDto> {
        if actor.id != id && !actor.is_admin() {
            return Err(AppError::Unauthorized(
                "You may only edit your own account".to_string(),
            ));
        }

        if dto.user_type.is_some() {
            if !actor.is_admin() {
                return Err(AppError::Unauthorized(
                    "Only admins may change a user's tier".to_string(),
                ));
            }
            if actor.id == id {
                return Err(AppError::Unauthorized(
                    "You may not change your own tier".to_string(),
                ));
            }
        }

        let (current, _) = self.get_by_id(id).await?;

        let password_hash = match &dto.password {
            Some(p) => Some(password::hash_password(p)?),
            None => None,
        };

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = $2,
                first_name = $3,
                last_name = $4,
                user_type = $5,
                password_hash = COALESCE($6, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(dto.email.as_deref().unwrap_or(&current.email))
        .bind(dto.first_name.as_deref().unwrap_or(&current.first_name))
        .bind(dto.last_name.as_deref().unwrap_or(&current.last_name))
        .bind(dto.user_type.unwrap_or(current.user_type))
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update user: {:?}", e);
            AppError::Database(e)
        })?;

        let roles = self.roles_for(id).await?;
        Ok(UserResponseDto::from_parts(user, roles))
    }

    /// Replace a user's role set. Admin-only (route guard), never on the
    /// caller's own account, and only municipality accounts hold roles.
    pub async fn set_roles(
        &self,
        id: Uuid,
        dto: &UpdateRolesDto,
        actor: &AuthenticatedUser,
    ) -> Result<UserResponseDto> {
        if actor.id == id {
            return Err(AppError::Unauthorized(
                "You may not grant roles to yourself".to_string(),
            ));
        }

        let (user, _) = self.get_by_id(id).await?;
        if user.user_type != UserType::Municipality {
            return Err(AppError::Validation(
                "Roles can only be granted to municipality accounts".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for grant in &dto.roles {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_type, label, description)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, role_type) DO UPDATE
                SET label = EXCLUDED.label, description = EXCLUDED.description
                "#,
            )
            .bind(id)
            .bind(grant.role_type)
            .bind(&grant.label)
            .bind(&grant.description)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Replaced role grants for user {} ({} roles) by {}",
            id,
            dto.roles.len(),
            actor.id
        );

        let roles = self.roles_for(id).await?;
        Ok(UserResponseDto::from_parts(user, roles))
    }

    /// Delete a user account. The rule itself lives in [`may_delete`].
    pub async fn delete(&self, id: Uuid, actor: &AuthenticatedUser) -> Result<()> {
        // Ownership is decided before the fetch so strangers learn nothing
        // about which ids exist.
        if actor.id != id && !actor.is_admin() {
            return Err(AppError::Unauthorized(
                "You may only delete your own account".to_string(),
            ));
        }

        let (user, _) = self.get_by_id(id).await?;
        may_delete(&user, actor)?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete user: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Deleted user {} (by {})", id, actor.id);
        Ok(())
    }
}

/// Whether `actor` may delete `target`: self or admin, and admin accounts
/// can never be deleted, by anyone, themselves included.
fn may_delete(target: &User, actor: &AuthenticatedUser) -> Result<()> {
    if actor.id != target.id && !actor.is_admin() {
        return Err(AppError::Unauthorized(
            "You may only delete your own account".to_string(),
        ));
    }

    if target.user_type == UserType::Admin {
        return Err(AppError::Unauthorized(
            "Admin accounts cannot be deleted".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(user_type: UserType) -> User {
        User {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            email: "tester@example.org".to_string(),
            first_name: "Test".to_string(),
            last_name: "Er".to_string(),
            user_type,
            password_hash: "x".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn caller_for(target: &User) -> AuthenticatedUser {
        AuthenticatedUser {
            id: target.id,
            username: target.username.clone(),
            user_type: target.user_type,
            roles: vec![],
        }
    }

    fn caller(user_type: UserType) -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            username: "other".to_string(),
            user_type,
            roles: vec![],
        }
    }

    #[test]
    fn test_citizen_may_delete_own_account() {
        let target = account(UserType::Citizen);
        let actor = caller_for(&target);
        assert!(may_delete(&target, &actor).is_ok());
    }

    #[test]
    fn test_admin_may_delete_other_accounts() {
        assert!(may_delete(&account(UserType::Citizen), &caller(UserType::Admin)).is_ok());
        assert!(may_delete(&account(UserType::Municipality), &caller(UserType::Admin)).is_ok());
    }

    #[test]
    fn test_strangers_may_not_delete() {
        let target = account(UserType::Citizen);
        for tier in [UserType::Citizen, UserType::Municipality] {
            assert!(matches!(
                may_delete(&target, &caller(tier)),
                Err(AppError::Unauthorized(_))
            ));
        }
    }

    #[test]
    fn test_admin_accounts_are_never_deletable() {
        let target = account(UserType::Admin);

        // not by another admin
        assert!(matches!(
            may_delete(&target, &caller(UserType::Admin)),
            Err(AppError::Unauthorized(_))
        ));

        // not even by themselves
        let own = caller_for(&target);
        assert!(matches!(
            may_delete(&target, &own),
            Err(AppError::Unauthorized(_))
        ));
    }
}
