//! One-time order business logic
//!
//! This module owns order placement and everything customers may do to an
//! order afterwards. Placement walks a fixed ladder of checks: the quantity
//! must be whole bundles, the week must exist with ordering open and not
//! yet delivered, low-season caps must be respected, the customer may hold
//! only one pending one-time order per week, and the requested quantity has
//! to fit into live availability. Orders spawned from subscriptions pass
//! through here only for reads; customers cannot change or cancel them.

use crate::{
    entities::{Order, OrderStatus, order},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Number of eggs in one bundle; every order quantity is a multiple of this.
pub const BUNDLE_SIZE: i32 = 10;

/// Computes the price of `quantity` eggs at `bundle_price` dollars per bundle.
#[must_use]
pub fn order_total(quantity: i32, bundle_price: f64) -> f64 {
    (f64::from(quantity) / f64::from(BUNDLE_SIZE)) * bundle_price
}

/// Checks that a quantity is a positive whole number of bundles.
pub fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < BUNDLE_SIZE || quantity % BUNDLE_SIZE != 0 {
        return Err(Error::InvalidQuantity {
            quantity,
            bundle_size: BUNDLE_SIZE,
        });
    }
    Ok(())
}

/// Places a one-time order for a customer in the given week.
///
/// Runs the full validation ladder and creates the order with its total
/// computed at the week's bundle price. The availability check counts the
/// customer's other pending orders as committed but would release a pending
/// one-time order, which cannot exist here anyway because duplicates are
/// rejected first.
///
/// # Arguments
/// * `db` - Database connection
/// * `user_id` - Customer placing the order
/// * `week_id` - Week to order in
/// * `quantity` - Number of eggs, a positive multiple of `BUNDLE_SIZE`
pub async fn place_order(
    db: &DatabaseConnection,
    user_id: i64,
    week_id: i64,
    quantity: i32,
) -> Result<order::Model> {
    validate_quantity(quantity)?;

    // Use a transaction so the availability check and the insert see the
    // same set of pending orders
    let txn = db.begin().await?;

    let week = crate::core::week::get_week(&txn, week_id).await?;
    if !week.is_ordering_open {
        return Err(Error::OrderingClosed { week_id });
    }
    if week.all_delivered {
        return Err(Error::WeekDelivered { week_id });
    }

    let settings = crate::core::settings::load_or_init(&txn).await?;
    if let Some(cap) = crate::core::capacity::low_season_order_cap(&week, &settings) {
        if quantity > cap {
            return Err(Error::LowSeasonCapExceeded {
                requested: quantity,
                cap,
            });
        }
    }

    let existing = pending_one_time_order(&txn, user_id, week_id).await?;
    if existing.is_some() {
        return Err(Error::DuplicateOrder { week_id });
    }

    let available = crate::core::availability::available_stock(&txn, &week, Some(user_id)).await?;
    if quantity > available {
        return Err(Error::InsufficientStock {
            requested: quantity,
            available,
        });
    }

    let now = chrono::Utc::now();
    let order_model = order::ActiveModel {
        user_id: Set(user_id),
        week_id: Set(week_id),
        subscription_id: Set(None),
        quantity: Set(quantity),
        total: Set(order_total(quantity, week.bundle_price)),
        status: Set(OrderStatus::Pending),
        is_paid: Set(false),
        payment_claimed: Set(false),
        picked_up: Set(false),
        created_at: Set(now),
        ..Default::default()
    };

    let result = order_model.insert(&txn).await?;

    txn.commit().await?;

    Ok(result)
}

/// Changes the quantity of a customer's pending one-time order.
///
/// Only the owner may change an order, only while it is pending and unpaid,
/// and never one managed by a subscription. The new quantity goes through
/// the same cap and availability checks as placement; availability releases
/// the order's current quantity, so shrinking an order always succeeds.
pub async fn update_order(
    db: &DatabaseConnection,
    order_id: i64,
    user_id: i64,
    quantity: i32,
) -> Result<order::Model> {
    validate_quantity(quantity)?;

    let txn = db.begin().await?;

    let order = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { order_id })?;
    if order.user_id != user_id {
        return Err(Error::NotOwner);
    }
    if order.subscription_id.is_some() {
        return Err(Error::SubscriptionOrder { order_id });
    }
    if order.status != OrderStatus::Pending {
        return Err(Error::OrderNotPending { order_id });
    }
    if order.is_paid {
        return Err(Error::OrderPaid { order_id });
    }

    let week = crate::core::week::get_week(&txn, order.week_id).await?;
    if !week.is_ordering_open {
        return Err(Error::OrderingClosed { week_id: week.id });
    }

    let settings = crate::core::settings::load_or_init(&txn).await?;
    if let Some(cap) = crate::core::capacity::low_season_order_cap(&week, &settings) {
        if quantity > cap {
            return Err(Error::LowSeasonCapExceeded {
                requested: quantity,
                cap,
            });
        }
    }

    let available = crate::core::availability::available_stock(&txn, &week, Some(user_id)).await?;
    if quantity > available {
        return Err(Error::InsufficientStock {
            requested: quantity,
            available,
        });
    }

    let mut order_model: order::ActiveModel = order.into();
    order_model.quantity = Set(quantity);
    order_model.total = Set(order_total(quantity, week.bundle_price));
    let updated = order_model.update(&txn).await?;

    txn.commit().await?;

    Ok(updated)
}

/// Cancels a customer's pending one-time order, releasing its eggs.
pub async fn cancel_order(db: &DatabaseConnection, order_id: i64, user_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let order = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { order_id })?;
    if order.user_id != user_id {
        return Err(Error::NotOwner);
    }
    if order.subscription_id.is_some() {
        return Err(Error::SubscriptionOrder { order_id });
    }
    if order.status != OrderStatus::Pending {
        return Err(Error::OrderNotPending { order_id });
    }

    order.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Retrieves all of a customer's orders, newest first.
pub async fn orders_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every order of a week in creation order, for the farm's view.
pub async fn orders_for_week(db: &DatabaseConnection, week_id: i64) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::WeekId.eq(week_id))
        .order_by_asc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The customer's pending one-time order in the given week, if any.
pub async fn pending_one_time_order<C>(
    db: &C,
    user_id: i64,
    week_id: i64,
) -> Result<Option<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(order::Column::WeekId.eq(week_id))
        .filter(order::Column::Status.eq(OrderStatus::Pending))
        .filter(order::Column::SubscriptionId.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// The customer's subscription-spawned order in the given week, if any.
/// When a replaced subscription left an older order behind, the newest wins.
pub async fn subscription_order_for_week(
    db: &DatabaseConnection,
    user_id: i64,
    week_id: i64,
) -> Result<Option<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(order::Column::WeekId.eq(week_id))
        .filter(order::Column::SubscriptionId.is_not_null())
        .order_by_desc(order::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// All of a customer's orders that the farm has not been paid for, newest
/// first. Includes pending ones, so the list doubles as "what I will owe".
pub async fn unpaid_orders_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(order::Column::IsPaid.eq(false))
        .order_by_desc(order::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A customer's delivered orders still waiting to be picked up.
pub async fn orders_awaiting_pickup(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(order::Column::Status.eq(OrderStatus::Delivered))
        .filter(order::Column::PickedUp.eq(false))
        .order_by_asc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
