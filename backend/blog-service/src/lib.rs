/// Blog Service Library
///
/// Posts, comments and likes for a small blog, with sign-in through Google
/// and RS256 session tokens.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Users, posts, comments, likes
/// - `services`: Business logic (sessions, identity, posts, comments, likes)
/// - `db`: Repository traits plus PostgreSQL and in-memory stores
/// - `middleware`: Session authentication, authorization rules, request metrics
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod validators;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppServices;
