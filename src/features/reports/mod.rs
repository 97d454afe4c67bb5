//! Civic issue reports: lifecycle, escalation and engagement.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth |
//! |--------|----------|------|
//! | POST | `/api/reports` | required |
//! | GET | `/api/reports` | optional |
//! | GET | `/api/reports/{id}` | optional |
//! | POST | `/api/reports/{id}/view` | optional |
//! | PATCH | `/api/reports/{id}/status` | required |
//! | POST | `/api/reports/{id}/escalate` | required |
//! | POST | `/api/reports/{id}/de-escalate` | required |
//! | POST | `/api/reports/{id}/like` | required |
//! | POST | `/api/reports/{id}/dislike` | required |
//! | POST | `/api/reports/{id}/report-false` | required |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use handlers::ReportState;
pub use services::{EngagementService, LifecycleService};
pub use store::{PgReportStore, ReportStore};
