//! Citizen profiles: stats, points, badges and preferences.
//!
//! Profiles are provisioned from the identity provider's `sub` on first use.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/profile` | Profile with stats |
//! | GET | `/api/profile/my-reports` | Caller's reports |
//! | DELETE | `/api/profile/reports/{id}` | Delete an owned report |
//! | PATCH | `/api/profile/language` | Change language |
//! | PATCH | `/api/profile/notification-settings` | Change notification preferences |
//! | GET | `/api/profile/badges` | Caller's badges |
//! | GET | `/api/profile/{user_id}/badges` | Another user's badges |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use services::ProfileService;
pub use store::{PgUserStore, UserStore};
