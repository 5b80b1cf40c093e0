#![allow(clippy::result_large_err)]

//! Weekly maintenance run for the egg stand.
//!
//! Intended to be invoked from cron at least once a week: it makes sure the
//! schema and settings exist, advances the weekly cycle, and chases unpaid
//! delivered orders.

use chrono::Utc;
use dotenvy::dotenv;
use farmstand::{
    config::{database, limits},
    core::{cycle, fulfillment, settings},
    errors::Result,
    notify::LogNotifier,
};
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Make it non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load limit configuration; a missing config.toml means the defaults
    let limits = if Path::new("config.toml").exists() {
        limits::load_default_config()
            .inspect_err(|e| error!("Failed to load config.toml: {e}"))?
            .limits
    } else {
        info!("No config.toml found; using built-in limit defaults.");
        limits::LimitsConfig::default()
    };

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;

    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Seed settings (existing settings row wins over config.toml)
    settings::seed_settings(&db, &limits)
        .await
        .inspect(|_| info!("Settings ready."))
        .inspect_err(|e| error!("Failed to seed settings: {e}"))?;

    // 6. Advance the weekly cycle to today
    let outcome = cycle::advance_cycle(&db, Utc::now().date_naive()).await?;
    info!(
        week_id = outcome.week.id,
        week_start = %outcome.week.week_start,
        created = outcome.created,
        closed_weeks = outcome.closed_weeks,
        "Weekly cycle advanced."
    );

    // 7. Chase delivered orders that are still unpaid
    let notifier = LogNotifier::new();
    let reminders = fulfillment::send_payment_reminders(&db, &notifier).await?;
    if reminders > 0 {
        info!(reminders, "Sent payment reminders.");
    }

    Ok(())
}
