//! Ordering limits and pricing defaults from config.toml
//!
//! This module provides functionality to load the farm's pricing and capacity
//! limits from a TOML configuration file. The values defined in config.toml
//! are used to seed the settings table on first run; after that, the database
//! row is authoritative and can be changed through the settings operations.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Pricing and capacity limits to seed
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Pricing and capacity limits for the farm.
///
/// Every field has a built-in default, so a config.toml only needs to list
/// the values it wants to override.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LimitsConfig {
    /// Bundle price applied to newly created weeks, in dollars
    pub default_bundle_price: f64,
    /// Total eggs per week committed across all active subscriptions
    pub max_subscription_total: i32,
    /// Largest weekly quantity a single subscription may carry
    pub max_per_subscription: i32,
    /// Shortest subscription length offered, in weeks
    pub min_subscription_weeks: i32,
    /// Longest subscription length offered, in weeks
    pub max_subscription_weeks: i32,
    /// Stock level below which the tighter low-season cap applies
    pub low_season_stock_threshold: i32,
    /// Low-season cap on one-time orders when stock is below the threshold
    pub low_season_cap_tight: i32,
    /// Low-season cap on one-time orders when stock is at or above the threshold
    pub low_season_cap_loose: i32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_bundle_price: 5.99,
            max_subscription_total: 120,
            max_per_subscription: 30,
            min_subscription_weeks: 2,
            max_subscription_weeks: 4,
            low_season_stock_threshold: 120,
            low_season_cap_tight: 20,
            low_season_cap_loose: 30,
        }
    }
}

/// Loads limit configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Returns
/// * `Ok(Config)` - Successfully parsed configuration
/// * `Err(Error)` - Failed to read or parse the configuration file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads limit configuration from the default location (./config.toml)
///
/// # Returns
/// * `Ok(Config)` - Successfully parsed configuration
/// * `Err(Error)` - Failed to read or parse the configuration file
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}
