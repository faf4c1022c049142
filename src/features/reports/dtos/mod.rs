mod comment_dto;
mod report_dto;

pub use comment_dto::{CommentBodyDto, ReportCommentDto};
pub use report_dto::{
    AssignMaintainerDto, CreateReportDto, ReportDetailResponseDto, ReportFilterQuery,
    ReportPhotoDto, ReportResponseDto, TriageRequest, UpdateReportStatusDto,
};
