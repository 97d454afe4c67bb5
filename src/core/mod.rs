pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod extractor;
pub mod middleware;
pub mod openapi;
