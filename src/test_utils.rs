//! Shared test utilities for Farmstand.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test weeks, orders, and subscriptions with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::order::order_total,
    entities::{OrderStatus, SubscriptionStatus, order, subscription, week},
    errors::Result,
    notify::Notifier,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Returns the canonical test week start: Monday, 2026-01-05.
pub fn test_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

async fn insert_week(
    db: &DatabaseConnection,
    monday: NaiveDate,
    stock: i32,
    is_ordering_open: bool,
    is_low_season: bool,
) -> Result<week::Model> {
    let week = week::ActiveModel {
        week_start: Set(monday),
        week_end: Set(monday + chrono::Duration::days(6)),
        stock: Set(stock),
        bundle_price: Set(5.0),
        is_ordering_open: Set(is_ordering_open),
        is_low_season: Set(is_low_season),
        subscriptions_materialized: Set(false),
        delivery_date: Set(None),
        delivery_time: Set(None),
        all_delivered: Set(false),
        ..Default::default()
    };
    week.insert(db).await.map_err(Into::into)
}

/// Creates a test week that is open for ordering.
///
/// # Arguments
/// * `db` - Database connection
/// * `monday` - Week start date
/// * `stock` - Eggs available
///
/// # Defaults
/// * `bundle_price`: 5.0 (keeps expected totals easy to read)
/// * `is_low_season`: false
pub async fn create_open_week(
    db: &DatabaseConnection,
    monday: NaiveDate,
    stock: i32,
) -> Result<week::Model> {
    insert_week(db, monday, stock, true, false).await
}

/// Creates a test week with ordering closed, as the weekly cycle leaves it.
pub async fn create_closed_week(
    db: &DatabaseConnection,
    monday: NaiveDate,
    stock: i32,
) -> Result<week::Model> {
    insert_week(db, monday, stock, false, false).await
}

/// Creates a test week that is open for ordering and flagged as low season.
pub async fn create_low_season_week(
    db: &DatabaseConnection,
    monday: NaiveDate,
    stock: i32,
) -> Result<week::Model> {
    insert_week(db, monday, stock, true, true).await
}

/// Creates a test order with a chosen status, bypassing placement checks.
/// Use this when the scenario needs an order state the public operations
/// would refuse to produce directly.
pub async fn create_custom_order(
    db: &DatabaseConnection,
    user_id: i64,
    week_id: i64,
    quantity: i32,
    subscription_id: Option<i64>,
    status: OrderStatus,
) -> Result<order::Model> {
    let order = order::ActiveModel {
        user_id: Set(user_id),
        week_id: Set(week_id),
        subscription_id: Set(subscription_id),
        quantity: Set(quantity),
        total: Set(order_total(quantity, 5.0)),
        status: Set(status),
        is_paid: Set(false),
        payment_claimed: Set(false),
        picked_up: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    order.insert(db).await.map_err(Into::into)
}

/// Creates a pending test order, priced at the 5.0 test bundle price.
///
/// # Arguments
/// * `db` - Database connection
/// * `user_id` - Ordering customer
/// * `week_id` - Week the order belongs to
/// * `quantity` - Eggs ordered
/// * `subscription_id` - Present when the order was spawned by a subscription
pub async fn create_pending_order(
    db: &DatabaseConnection,
    user_id: i64,
    week_id: i64,
    quantity: i32,
    subscription_id: Option<i64>,
) -> Result<order::Model> {
    create_custom_order(db, user_id, week_id, quantity, subscription_id, OrderStatus::Pending).await
}

/// Creates an active test subscription.
///
/// # Arguments
/// * `db` - Database connection
/// * `user_id` - Subscribing customer
/// * `quantity` - Eggs per week
/// * `weeks_remaining` - Fulfillments left; also used as the period length
pub async fn create_active_subscription(
    db: &DatabaseConnection,
    user_id: i64,
    quantity: i32,
    weeks_remaining: i32,
) -> Result<subscription::Model> {
    let subscription = subscription::ActiveModel {
        user_id: Set(user_id),
        quantity: Set(quantity),
        period_count: Set(weeks_remaining),
        weeks_remaining: Set(weeks_remaining),
        status: Set(SubscriptionStatus::Active),
        next_fulfillment: Set(Some(test_monday())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    subscription.insert(db).await.map_err(Into::into)
}

/// Cancels a subscription by flipping its status, without the bookkeeping
/// the public cancellation performs.
pub async fn cancel_subscription_directly(
    db: &DatabaseConnection,
    subscription_id: i64,
) -> Result<()> {
    subscription::ActiveModel {
        id: Set(subscription_id),
        status: Set(SubscriptionStatus::Cancelled),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

/// Sets only the delivered flag on a week, leaving ordering untouched.
pub async fn mark_week_all_delivered(db: &DatabaseConnection, week_id: i64) -> Result<()> {
    week::ActiveModel {
        id: Set(week_id),
        all_delivered: Set(true),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

/// Flags an order as paid without going through payment confirmation.
pub async fn mark_order_paid(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    order::ActiveModel {
        id: Set(order_id),
        is_paid: Set(true),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

/// Flags an order as picked up without going through pickup confirmation.
pub async fn mark_order_picked_up(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    order::ActiveModel {
        id: Set(order_id),
        picked_up: Set(true),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

/// Overwrites an order's status directly.
pub async fn set_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    status: OrderStatus,
) -> Result<()> {
    order::ActiveModel {
        id: Set(order_id),
        status: Set(status),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

#[derive(Clone, Copy)]
enum Event {
    StockDeclared(i64),
    OrdersDelivered(i64),
    Trimmed(i64, i32, i32),
    DeliveryScheduled(i64),
    PaymentReminder(i64),
}

/// Notifier that records every event, for asserting on what went out.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Event>>,
}

impl RecordingNotifier {
    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    /// Week ids announced as having stock, in order.
    pub fn stock_declared_weeks(&self) -> Vec<i64> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                Event::StockDeclared(week_id) => Some(*week_id),
                _ => None,
            })
            .collect()
    }

    /// Week ids announced as fully delivered, in order.
    pub fn orders_delivered_weeks(&self) -> Vec<i64> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                Event::OrdersDelivered(week_id) => Some(*week_id),
                _ => None,
            })
            .collect()
    }

    /// Trim notices as (`user_id`, original quantity, final quantity).
    pub fn trims(&self) -> Vec<(i64, i32, i32)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                Event::Trimmed(user_id, original, trimmed) => Some((*user_id, *original, *trimmed)),
                _ => None,
            })
            .collect()
    }

    /// Week ids whose delivery slot was announced, in order.
    pub fn delivery_scheduled_weeks(&self) -> Vec<i64> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                Event::DeliveryScheduled(week_id) => Some(*week_id),
                _ => None,
            })
            .collect()
    }

    /// Order ids that received a payment reminder, in order.
    pub fn payment_reminder_orders(&self) -> Vec<i64> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                Event::PaymentReminder(order_id) => Some(*order_id),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn stock_declared(&self, week: &week::Model) {
        self.record(Event::StockDeclared(week.id));
    }

    fn orders_delivered(&self, week: &week::Model) {
        self.record(Event::OrdersDelivered(week.id));
    }

    fn subscription_trimmed(&self, user_id: i64, original_quantity: i32, final_quantity: i32) {
        self.record(Event::Trimmed(user_id, original_quantity, final_quantity));
    }

    fn delivery_scheduled(&self, week: &week::Model) {
        self.record(Event::DeliveryScheduled(week.id));
    }

    fn payment_reminder(&self, order: &order::Model) {
        self.record(Event::PaymentReminder(order.id));
    }
}
