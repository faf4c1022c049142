use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::dtos::UserResponseDto;

/// Request DTO for username/password login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginDto {
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response DTO carrying the bearer token and the account it belongs to
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    pub access_token: String,
    pub token_type: String,
    pub user: UserResponseDto,
}
