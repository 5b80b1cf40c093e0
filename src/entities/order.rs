//! Order entity - Represents one customer's egg order within a week.
//!
//! Orders are either placed directly (one-time) or spawned from an active
//! subscription, in which case `subscription_id` points back at it. The
//! `status` column tracks the delivery lifecycle while the boolean flags
//! track payment and pickup independently.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an order.
///
/// `Completed` is derived, never set directly by a customer action: an order
/// is promoted once it has been delivered, paid for, and picked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum OrderStatus {
    /// Placed but not yet handed over
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Handed over to the customer
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// Delivered, paid, and picked up
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer the order belongs to
    pub user_id: i64,
    /// Week the order was placed in
    pub week_id: i64,
    /// Subscription that spawned this order, None for one-time orders
    pub subscription_id: Option<i64>,
    /// Number of eggs ordered, always a positive multiple of 10
    pub quantity: i32,
    /// Total price in dollars, recomputed whenever quantity or price changes
    pub total: f64,
    /// Delivery lifecycle state
    pub status: OrderStatus,
    /// Whether the farm has confirmed payment
    pub is_paid: bool,
    /// Whether the customer claims to have sent payment
    pub payment_claimed: bool,
    /// Whether the customer confirmed picking the eggs up
    pub picked_up: bool,
    /// When the order was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one week
    #[sea_orm(
        belongs_to = "super::week::Entity",
        from = "Column::WeekId",
        to = "super::week::Column::Id"
    )]
    Week,
    /// Subscription-spawned orders belong to one subscription
    #[sea_orm(
        belongs_to = "super::subscription::Entity",
        from = "Column::SubscriptionId",
        to = "super::subscription::Column::Id"
    )]
    Subscription,
}

impl Related<super::week::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Week.def()
    }
}

impl Related<super::subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
