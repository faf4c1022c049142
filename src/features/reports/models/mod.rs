mod report;

pub use report::{Report, ReportComment, ReportPhoto, ReportStatus};
