mod report_dto;

pub use report_dto::{
    CreateReportDto, EngagementCountsDto, EscalationRequestDto, FalseReportCountDto,
    ReportListQueryDto, ReportResponseDto, UpdateReportStatusDto, ViewResponseDto,
    ViewerEngagementDto,
};
