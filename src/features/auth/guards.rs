//! Role-based authorization guards.
//!
//! Each guard extracts the authenticated caller from the request extensions
//! and verifies tier (and, where needed, municipality role) before the
//! handler runs. Two independent checks compose:
//!
//! - tier check: admin passes everything; municipality passes staff-level
//!   checks; citizen passes only citizen-scoped checks
//! - role check: municipality callers must hold the specific role_type the
//!   operation requires
//!
//! A failed check surfaces as 401; report reads are public, so existence is
//! never hidden behind not-found.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn caller(parts: &Parts) -> Result<AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

/// Guard for citizen-scoped operations (report submission).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireCitizen(user): RequireCitizen) { ... }
/// ```
pub struct RequireCitizen(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireCitizen
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = caller(parts)?;

        if !user.is_citizen() {
            return Err(AppError::Unauthorized(
                "Citizen account required".to_string(),
            ));
        }

        Ok(RequireCitizen(user))
    }
}

/// Guard for staff-level operations: admin or municipality tier.
///
/// Use this for report search, triage (assign/reject), comment creation,
/// and user search.
pub struct RequireStaff(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = caller(parts)?;

        if !user.is_staff() {
            return Err(AppError::Unauthorized(
                "Municipality or admin access required".to_string(),
            ));
        }

        Ok(RequireStaff(user))
    }
}

/// Guard for admin-only operations (tier changes, role grants).
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = caller(parts)?;

        if !user.is_admin() {
            return Err(AppError::Unauthorized("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user))
    }
}

/// Guard for operations reserved to technical officers: assigning a report
/// to an external maintainer and listing one's own assignments.
pub struct RequireTechnicalOfficer(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireTechnicalOfficer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = caller(parts)?;

        if !user.is_technical_officer() {
            return Err(AppError::Unauthorized(
                "Technical officer role required".to_string(),
            ));
        }

        Ok(RequireTechnicalOfficer(user))
    }
}

/// Guard for maintainer-scoped listings. Resolution itself additionally
/// checks ownership of the specific report (maintainer_id), in the service.
pub struct RequireExternalMaintainer(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireExternalMaintainer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = caller(parts)?;

        if !user.is_external_maintainer() {
            return Err(AppError::Unauthorized(
                "External maintainer role required".to_string(),
            ));
        }

        Ok(RequireExternalMaintainer(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::{RoleType, UserType};
    use axum::{routing::get, Extension, Router};
    use axum_test::TestServer;
    use uuid::Uuid;

    async fn staff_only(RequireStaff(_user): RequireStaff) -> &'static str {
        "ok"
    }

    async fn officer_only(RequireTechnicalOfficer(_user): RequireTechnicalOfficer) -> &'static str {
        "ok"
    }

    async fn citizen_only(RequireCitizen(_user): RequireCitizen) -> &'static str {
        "ok"
    }

    fn server_for(user: Option<AuthenticatedUser>) -> TestServer {
        let mut router = Router::new()
            .route("/staff", get(staff_only))
            .route("/officer", get(officer_only))
            .route("/citizen", get(citizen_only));

        if let Some(user) = user {
            router = router.layer(Extension(user));
        }

        TestServer::new(router).unwrap()
    }

    fn user(user_type: UserType, roles: Vec<RoleType>) -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            user_type,
            roles,
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_request_gets_401() {
        let server = server_for(None);
        let response = server.get("/staff").await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_citizen_cannot_reach_staff_routes() {
        let server = server_for(Some(user(UserType::Citizen, vec![])));

        server.get("/staff").await.assert_status_unauthorized();
        server.get("/officer").await.assert_status_unauthorized();
        server.get("/citizen").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_municipality_staff_without_role() {
        let server = server_for(Some(user(UserType::Municipality, vec![])));

        server.get("/staff").await.assert_status_ok();
        server.get("/officer").await.assert_status_unauthorized();
        server.get("/citizen").await.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_technical_officer_role_unlocks_officer_routes() {
        let server = server_for(Some(user(
            UserType::Municipality,
            vec![RoleType::TechnicalOfficer],
        )));

        server.get("/staff").await.assert_status_ok();
        server.get("/officer").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_admin_passes_staff_and_role_checks() {
        let server = server_for(Some(user(UserType::Admin, vec![])));

        server.get("/staff").await.assert_status_ok();
        server.get("/officer").await.assert_status_ok();
        // admins are not citizens; submission stays citizen-scoped
        server.get("/citizen").await.assert_status_unauthorized();
    }
}
