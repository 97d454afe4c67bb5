mod dispatcher;
mod listener;
mod notification_service;

pub use dispatcher::NotificationDispatcher;
pub use listener::NotificationListener;
pub use notification_service::NotificationService;
