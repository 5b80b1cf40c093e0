//! Stock availability business logic
//!
//! Availability is never stored; it is always computed live from the week's
//! declared stock and the pending orders against it, so placing, changing,
//! and trimming orders can never leave a counter out of sync. Delivered and
//! completed orders no longer hold stock.

use crate::{
    entities::{Order, OrderStatus, Week, order, week},
    errors::{Error, Result},
};
use sea_orm::prelude::*;

/// Computes how many eggs are still available in `week`.
///
/// Without a user this is the plain remainder: declared stock minus every
/// pending order. With a user, that user's own pending one-time order is
/// added back, because those eggs are released when the user changes or
/// replaces the order. Subscription-spawned orders stay committed either
/// way. The result is never negative, even when trimming was outrun by a
/// stock correction.
///
/// # Arguments
/// * `db` - Database connection
/// * `week` - The week to compute availability for
/// * `user_id` - Customer asking, if availability should account for their own order
pub async fn available_stock<C>(
    db: &C,
    week: &week::Model,
    user_id: Option<i64>,
) -> Result<i32>
where
    C: ConnectionTrait,
{
    let pending_orders = Order::find()
        .filter(order::Column::WeekId.eq(week.id))
        .filter(order::Column::Status.eq(OrderStatus::Pending))
        .all(db)
        .await?;

    let committed: i32 = pending_orders.iter().map(|o| o.quantity).sum();
    let mut available = week.stock - committed;

    if let Some(user_id) = user_id {
        let own_one_time = pending_orders
            .iter()
            .find(|o| o.user_id == user_id && o.subscription_id.is_none());
        if let Some(own) = own_one_time {
            available += own.quantity;
        }
    }

    Ok(available.max(0))
}

/// Looks up a week by id and computes its availability.
///
/// Convenience wrapper for callers that only hold a week id.
pub async fn availability(
    db: &DatabaseConnection,
    week_id: i64,
    user_id: Option<i64>,
) -> Result<i32> {
    let week = Week::find_by_id(week_id)
        .one(db)
        .await?
        .ok_or(Error::WeekNotFound { week_id })?;

    available_stock(db, &week, user_id).await
}
