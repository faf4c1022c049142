pub mod comment_service;
pub mod report_service;

pub use comment_service::CommentService;
pub use report_service::{PhotoUpload, ReportService};
