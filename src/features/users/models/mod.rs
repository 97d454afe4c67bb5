mod user;

pub use user::{NotificationSettings, NotificationSettingsUpdate, User, UserIdentity};
