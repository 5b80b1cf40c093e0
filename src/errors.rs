//! Error types shared across the crate.
//!
//! Every fallible operation returns [`Result`], with validation failures
//! carrying enough numeric detail for callers to render a useful message
//! (how much stock was left, which cap was hit, and so on).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Quantity must be a positive multiple of {bundle_size}, got {quantity}")]
    InvalidQuantity { quantity: i32, bundle_size: i32 },

    #[error("Price must be non-negative, got {price}")]
    InvalidPrice { price: f64 },

    #[error("Stock must be non-negative, got {stock}")]
    InvalidStock { stock: i32 },

    #[error("Subscription length must be between {min} and {max} weeks, got {count}")]
    InvalidPeriodCount { count: i32, min: i32, max: i32 },

    #[error("Only {available} eggs are still available, requested {requested}")]
    InsufficientStock { requested: i32, available: i32 },

    #[error("Subscription capacity is full: {committed} of {limit} eggs already committed")]
    SubscriptionCapacityFull { limit: i32, committed: i32 },

    #[error("Only {remaining} eggs of subscription capacity remain, requested {requested}")]
    SubscriptionCapacityPartial { requested: i32, remaining: i32 },

    #[error("Subscriptions are limited to {cap} eggs per week, requested {requested}")]
    PerSubscriptionCapExceeded { requested: i32, cap: i32 },

    #[error("One-time orders are limited to {cap} eggs during low season, requested {requested}")]
    LowSeasonCapExceeded { requested: i32, cap: i32 },

    #[error("New subscriptions are paused during low season")]
    LowSeasonClosed,

    #[error("No week is currently open for ordering")]
    NoCurrentWeek,

    #[error("Ordering is closed for week {week_id}")]
    OrderingClosed { week_id: i64 },

    #[error("Orders for week {week_id} have already been delivered")]
    WeekDelivered { week_id: i64 },

    #[error("Week {week_id} not found")]
    WeekNotFound { week_id: i64 },

    #[error("Order {order_id} not found")]
    OrderNotFound { order_id: i64 },

    #[error("Subscription {subscription_id} not found")]
    SubscriptionNotFound { subscription_id: i64 },

    #[error("Not authorized to modify this record")]
    NotOwner,

    #[error("A pending order already exists for week {week_id}")]
    DuplicateOrder { week_id: i64 },

    #[error("Order {order_id} is no longer pending")]
    OrderNotPending { order_id: i64 },

    #[error("Order {order_id} has already been paid")]
    OrderPaid { order_id: i64 },

    #[error("Order {order_id} is managed by a subscription")]
    SubscriptionOrder { order_id: i64 },

    #[error("Order {order_id} has not been delivered yet")]
    OrderNotDelivered { order_id: i64 },

    #[error("Order {order_id} is already completed")]
    OrderCompleted { order_id: i64 },

    #[error("Subscription {subscription_id} is not active")]
    SubscriptionNotActive { subscription_id: i64 },
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
