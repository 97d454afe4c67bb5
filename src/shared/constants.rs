/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// REWARDS
// =============================================================================

/// Points for submitting a regular report
pub const REPORT_POINTS: i32 = 10;

/// Points for submitting an emergency report
pub const EMERGENCY_REPORT_POINTS: i32 = 20;

/// Points granted with every badge
pub const BADGE_POINTS: i32 = 50;

// =============================================================================
// REPORT LIFECYCLE
// =============================================================================

/// Reports younger than this escalate at level 0
pub const ESCALATION_LEVEL_1_AFTER_DAYS: i64 = 7;

/// Reports older than this escalate at level 2
pub const ESCALATION_LEVEL_2_AFTER_DAYS: i64 = 14;

pub const NOTE_REPORT_CREATED: &str = "Report created";
pub const DEFAULT_ESCALATION_REASON: &str = "Escalated by user";
pub const DEFAULT_DE_ESCALATION_REASON: &str = "Emergency status removed";

// =============================================================================
// COMMENTS
// =============================================================================

pub const MAX_COMMENT_LENGTH: usize = 1000;
