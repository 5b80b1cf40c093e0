/// Database configuration and connection management
pub mod database;

/// Ordering limits and pricing defaults from config.toml
pub mod limits;
