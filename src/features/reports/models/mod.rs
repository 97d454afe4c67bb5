mod filter;
mod report;

pub use filter::{BoundingBox, ReportFilter, ReportSortBy, SortOrder};
pub use report::{
    escalation_level, initial_priority, status_change_note, DeEscalation, Escalation,
    FalseReportToggle, LikeToggle, NewReport, Report, ReportPriority, ReportStatus,
    StatusChange, StatusHistoryEntry, ViewOutcome,
};
