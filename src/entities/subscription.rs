//! Subscription entity - Represents a standing weekly egg order.
//!
//! A subscription commits a customer to the same quantity for a fixed number
//! of consecutive weeks. Each week, active subscriptions are materialized
//! into regular orders and `weeks_remaining` counts down; at zero the
//! subscription completes on its own.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum SubscriptionStatus {
    /// Still fulfilling weekly
    #[sea_orm(string_value = "active")]
    Active,
    /// Cancelled by the customer (or replaced by a newer subscription)
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Ran its full length
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Subscription database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    /// Unique identifier for the subscription
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer the subscription belongs to
    pub user_id: i64,
    /// Eggs delivered each week, always a positive multiple of 10
    pub quantity: i32,
    /// Total number of weeks the subscription was signed up for
    pub period_count: i32,
    /// Weeks still owed, counted down at each materialization
    pub weeks_remaining: i32,
    /// Lifecycle state
    pub status: SubscriptionStatus,
    /// Monday of the next week this subscription will be fulfilled in
    pub next_fulfillment: Option<Date>,
    /// When the subscription was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Subscription and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One subscription spawns many orders over its lifetime
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
