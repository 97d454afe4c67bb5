mod engine;
mod listener;

pub use engine::BadgeRuleEngine;
pub use listener::BadgeListener;
