use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::reports::handlers::{comment_handler, report_handler};
use crate::features::reports::services::{CommentService, ReportService};

/// Public route: anyone can view a report with its photos and comments
pub fn public_routes(service: Arc<ReportService>) -> Router {
    Router::new()
        .route("/api/reports/{id}", get(report_handler::get_report))
        .with_state(service)
}

/// Protected routes (auth middleware applied by caller)
pub fn protected_routes(
    report_service: Arc<ReportService>,
    comment_service: Arc<CommentService>,
) -> Router {
    let reports = Router::new()
        .route(
            "/api/reports",
            post(report_handler::create_report).get(report_handler::search_reports),
        )
        .route("/api/reports/assigned", get(report_handler::list_assigned))
        .route(
            "/api/reports/maintained",
            get(report_handler::list_maintained),
        )
        .route(
            "/api/reports/{id}/status",
            patch(report_handler::update_report_status),
        )
        .route(
            "/api/reports/{id}/maintainer",
            post(report_handler::assign_maintainer),
        )
        .route(
            "/api/reports/{id}/resolve",
            post(report_handler::resolve_report),
        )
        .with_state(report_service);

    let comments = Router::new()
        .route(
            "/api/reports/{id}/comments",
            post(comment_handler::add_comment),
        )
        .route(
            "/api/reports/{id}/comments/{comment_id}",
            patch(comment_handler::update_comment).delete(comment_handler::delete_comment),
        )
        .with_state(comment_service);

    reports.merge(comments)
}
