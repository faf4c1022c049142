use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::users::models::{RoleType, UserType};

/// The caller identity resolved from a verified access token.
///
/// Tier and role strings are parsed into closed enums at the token boundary;
/// an unknown tier or role never reaches a handler.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
    pub user_type: UserType,
    pub roles: Vec<RoleType>,
}

impl AuthenticatedUser {
    /// Check if user holds a specific municipality role
    pub fn has_role(&self, role: RoleType) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }

    pub fn is_citizen(&self) -> bool {
        self.user_type == UserType::Citizen
    }

    /// Staff tier: admin or municipality. Gates triage, search, and
    /// assignment operations.
    pub fn is_staff(&self) -> bool {
        matches!(self.user_type, UserType::Admin | UserType::Municipality)
    }

    /// Role checks apply to the municipality tier only; admins pass
    /// everything by tier alone.
    pub fn is_technical_officer(&self) -> bool {
        self.is_admin()
            || (self.user_type == UserType::Municipality
                && self.has_role(RoleType::TechnicalOfficer))
    }

    pub fn is_external_maintainer(&self) -> bool {
        self.is_admin()
            || (self.user_type == UserType::Municipality
                && self.has_role(RoleType::ExternalMaintainer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(user_type: UserType, roles: Vec<RoleType>) -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            user_type,
            roles,
        }
    }

    #[test]
    fn test_admin_passes_every_check() {
        let admin = user(UserType::Admin, vec![]);
        assert!(admin.is_staff());
        assert!(admin.is_technical_officer());
        assert!(admin.is_external_maintainer());
        assert!(!admin.is_citizen());
    }

    #[test]
    fn test_citizen_passes_only_citizen_checks() {
        let citizen = user(UserType::Citizen, vec![]);
        assert!(citizen.is_citizen());
        assert!(!citizen.is_staff());
        assert!(!citizen.is_technical_officer());
        assert!(!citizen.is_external_maintainer());
    }

    #[test]
    fn test_municipality_needs_role_grant() {
        let officer = user(UserType::Municipality, vec![RoleType::TechnicalOfficer]);
        assert!(officer.is_staff());
        assert!(officer.is_technical_officer());
        assert!(!officer.is_external_maintainer());

        let plain = user(UserType::Municipality, vec![]);
        assert!(plain.is_staff());
        assert!(!plain.is_technical_officer());
    }

    #[test]
    fn test_roles_do_not_elevate_citizens() {
        // A stray role grant on a citizen account must not unlock staff checks
        let odd = user(UserType::Citizen, vec![RoleType::TechnicalOfficer]);
        assert!(!odd.is_technical_officer());
        assert!(!odd.is_staff());
    }
}
