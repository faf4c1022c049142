pub mod comment_handler;
pub mod report_handler;
