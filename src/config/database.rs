//! Database configuration module for Farmstand.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{Order, Settings, Subscription, Week};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
pub fn get_database_url() -> Result<String> {
    Ok(std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/farmstand.sqlite".to_string()))
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
/// This function handles connection errors and provides a clean interface for database access
/// throughout the application.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url()?;

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation, ensuring the database schema matches the Rust struct definitions.
/// It creates tables for weeks, orders, subscriptions, and settings. Statements carry
/// `IF NOT EXISTS` so the weekly maintenance run can call this against an existing database.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    // Use SeaORM's proper table creation using Schema::create_table_from_entity
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Create tables using SeaORM's schema generation
    let mut week_table = schema.create_table_from_entity(Week);
    let mut order_table = schema.create_table_from_entity(Order);
    let mut subscription_table = schema.create_table_from_entity(Subscription);
    let mut settings_table = schema.create_table_from_entity(Settings);

    week_table.if_not_exists();
    order_table.if_not_exists();
    subscription_table.if_not_exists();
    settings_table.if_not_exists();

    db.execute(builder.build(&week_table)).await?;
    db.execute(builder.build(&order_table)).await?;
    db.execute(builder.build(&subscription_table)).await?;
    db.execute(builder.build(&settings_table)).await?;

    Ok(())
}
