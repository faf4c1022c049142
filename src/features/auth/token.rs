use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::{RoleType, User, UserRole, UserType};

/// HS256 access-token claims. Tier and roles travel in the token so the
/// authorization gate never needs a database round trip.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    username: String,
    user_type: UserType,
    roles: Vec<RoleType>,
    iat: u64,
    exp: u64,
}

/// Issues and verifies access tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: u64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_secs: config.token_ttl_secs,
        }
    }

    /// Issue an access token for a user and their current role grants.
    pub fn issue(&self, user: &User, roles: &[UserRole]) -> Result<String> {
        let now = Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            user_type: user.user_type,
            roles: roles.iter().map(|r| r.role_type).collect(),
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a token and resolve the caller identity.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        let claims = token_data.claims;

        Ok(AuthenticatedUser {
            id: claims.sub,
            username: claims.username,
            user_type: claims.user_type,
            roles: claims.roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            token_ttl_secs: 3600,
        }
    }

    fn officer() -> (User, Vec<UserRole>) {
        let user = User {
            id: Uuid::new_v4(),
            username: "m_rossi".to_string(),
            email: "m.rossi@comune.example".to_string(),
            first_name: "Maria".to_string(),
            last_name: "Rossi".to_string(),
            user_type: UserType::Municipality,
            password_hash: "x".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let roles = vec![UserRole {
            user_id: user.id,
            role_type: RoleType::TechnicalOfficer,
            label: "Technical officer".to_string(),
            description: None,
        }];
        (user, roles)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = TokenService::new(&config("0123456789abcdef0123456789abcdef"));
        let (user, roles) = officer();

        let token = service.issue(&user, &roles).unwrap();
        let caller = service.verify(&token).unwrap();

        assert_eq!(caller.id, user.id);
        assert_eq!(caller.user_type, UserType::Municipality);
        assert!(caller.has_role(RoleType::TechnicalOfficer));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = TokenService::new(&config("0123456789abcdef0123456789abcdef"));
        let verifier = TokenService::new(&config("ffffffffffffffffffffffffffffffff"));
        let (user, roles) = officer();

        let token = issuer.issue(&user, &roles).unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = TokenService::new(&config("0123456789abcdef0123456789abcdef"));
        assert!(matches!(
            service.verify("not.a.token"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
