pub mod auth;
pub mod badges;
pub mod comments;
pub mod notifications;
pub mod reports;
pub mod users;
