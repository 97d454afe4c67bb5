pub mod badge_handler;

pub use badge_handler::*;
