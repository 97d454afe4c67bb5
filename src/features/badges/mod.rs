//! Badge catalog and the rule engine that awards badges and points.

mod catalog;

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use catalog::{BadgeCatalog, BadgeDefinition, BadgeStats};
pub use services::{BadgeListener, BadgeRuleEngine};
