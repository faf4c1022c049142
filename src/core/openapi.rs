use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::users::{
    dtos as users_dtos, handlers as users_handlers, models as users_models,
};
use crate::shared::types::{ApiResponse, Page};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::auth_handler::login,
        auth::handlers::auth_handler::me,
        // Users
        users_handlers::user_handler::register,
        users_handlers::user_handler::search_users,
        users_handlers::user_handler::get_user,
        users_handlers::user_handler::update_user,
        users_handlers::user_handler::set_roles,
        users_handlers::user_handler::delete_user,
        // Categories (public)
        categories_handlers::category_handler::list_categories,
        categories_handlers::category_handler::get_category,
        // Reports
        reports_handlers::report_handler::create_report,
        reports_handlers::report_handler::get_report,
        reports_handlers::report_handler::search_reports,
        reports_handlers::report_handler::update_report_status,
        reports_handlers::report_handler::assign_maintainer,
        reports_handlers::report_handler::resolve_report,
        reports_handlers::report_handler::list_assigned,
        reports_handlers::report_handler::list_maintained,
        // Comments
        reports_handlers::comment_handler::add_comment,
        reports_handlers::comment_handler::update_comment,
        reports_handlers::comment_handler::delete_comment,
    ),
    components(
        schemas(
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::LoginDto,
            auth::dtos::LoginResponseDto,
            ApiResponse<auth::dtos::LoginResponseDto>,
            // Users
            users_models::UserType,
            users_models::RoleType,
            users_dtos::RegisterUserDto,
            users_dtos::UpdateUserDto,
            users_dtos::RoleGrantDto,
            users_dtos::UpdateRolesDto,
            users_dtos::UserRoleDto,
            users_dtos::UserResponseDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Page<users_dtos::UserResponseDto>>,
            // Categories
            categories_dtos::CategoryResponseDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            // Reports
            reports_models::ReportStatus,
            reports_dtos::CreateReportDto,
            reports_dtos::UpdateReportStatusDto,
            reports_dtos::AssignMaintainerDto,
            reports_dtos::ReportPhotoDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::ReportDetailResponseDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<reports_dtos::ReportDetailResponseDto>,
            ApiResponse<Page<reports_dtos::ReportResponseDto>>,
            // Comments
            reports_dtos::CommentBodyDto,
            reports_dtos::ReportCommentDto,
            ApiResponse<reports_dtos::ReportCommentDto>,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User accounts and role management"),
        (name = "categories", description = "Report categories (public)"),
        (name = "reports", description = "Citizen issue reports"),
        (name = "comments", description = "Internal report comments (staff)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Civitas API",
        version = "0.1.0",
        description = "API documentation for Civitas",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
