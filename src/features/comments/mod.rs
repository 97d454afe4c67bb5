//! Comments on reports.
//!
//! | Method | Endpoint | Auth |
//! |--------|----------|------|
//! | POST | `/api/reports/{id}/comments` | required |
//! | GET | `/api/reports/{id}/comments` | public |
//! | DELETE | `/api/comments/{id}` | author only |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use services::CommentService;
pub use store::{CommentStore, PgCommentStore};
