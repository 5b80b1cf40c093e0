//! Week entity - Represents one Monday-to-Sunday sales week.
//!
//! Each week carries the declared egg stock, the bundle price in effect,
//! and the flags that drive the weekly lifecycle: whether ordering is open,
//! whether the farm is in low season, whether subscriptions have already
//! been materialized into orders, and whether all orders were delivered.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Week database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weeks")]
pub struct Model {
    /// Unique identifier for the week
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Monday the week starts on
    #[sea_orm(unique)]
    pub week_start: Date,
    /// Sunday the week ends on (start + 6 days)
    pub week_end: Date,
    /// Declared egg stock for the week, in eggs
    pub stock: i32,
    /// Price of one 10-egg bundle for this week, in dollars
    pub bundle_price: f64,
    /// Whether customers may currently place or change orders
    pub is_ordering_open: bool,
    /// Whether the week falls in low season (reduced caps, no new subscriptions)
    pub is_low_season: bool,
    /// Whether active subscriptions have been turned into orders for this week
    pub subscriptions_materialized: bool,
    /// Scheduled delivery date, once the farm announces one
    pub delivery_date: Option<Date>,
    /// Free-form delivery time window (e.g., "16:00-18:00")
    pub delivery_time: Option<String>,
    /// Whether every order of the week has been handed over
    pub all_delivered: bool,
}

/// Defines relationships between Week and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One week has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
