//! Persisted in-app notifications.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/notifications` | Paginated list with unread count |
//! | PATCH | `/api/notifications/{id}/read` | Mark one as read |
//! | PATCH | `/api/notifications/read-all` | Mark all as read |
//! | DELETE | `/api/notifications/{id}` | Delete one |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use services::{NotificationDispatcher, NotificationListener, NotificationService};
pub use store::{NotificationStore, PgNotificationStore};
