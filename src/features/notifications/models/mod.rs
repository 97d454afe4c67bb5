mod notification;

pub use notification::{
    NewNotification, Notification, NotificationData, NotificationPage, NotificationType,
};
