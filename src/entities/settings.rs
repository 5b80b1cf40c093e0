//! Settings entity - Singleton row of farm-wide tunables.
//!
//! Holds the default bundle price applied to newly created weeks and the
//! caps that govern subscriptions and low-season ordering. Exactly one row
//! is expected; it is created on first access with built-in defaults.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Settings database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    /// Unique identifier (only one row should ever exist)
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Bundle price given to newly created weeks, in dollars
    pub default_bundle_price: f64,
    /// Total eggs per week that may be committed across all active subscriptions
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

/// Settings has no relationships to other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
