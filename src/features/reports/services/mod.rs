mod engagement_service;
mod lifecycle_service;

pub use engagement_service::EngagementService;
pub use lifecycle_service::LifecycleService;
