/// Story Service Library
///
/// Ownership- and visibility-checked CRUD and search over user-authored
/// stories, served behind bearer-token authentication.
///
/// # Modules
///
/// - `handlers`: HTTP handlers, route table and view envelopes
/// - `models`: Story, visibility and payload types
/// - `services`: The story access controller
/// - `db`: Story store trait and Postgres implementation
/// - `middleware`: JWT authentication and request metrics
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
