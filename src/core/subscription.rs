//! Subscription business logic
//!
//! A subscription is a standing weekly order: the same quantity every week
//! for a fixed number of weeks. Signup is gated by the farm-wide
//! subscription pool and paused entirely during low season, when production
//! cannot carry standing commitments. A customer holds at most one active
//! subscription; signing up again replaces the old one.

use crate::{
    core::capacity::CapacityDecision,
    entities::{
        Order, OrderStatus, Subscription, SubscriptionStatus, order, subscription,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// A freshly created subscription, with the order spawned for the current
/// week when the customer chose to start immediately.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    /// The subscription that was created
    pub subscription: subscription::Model,
    /// Order for the current week, present only when starting now
    pub initial_order: Option<order::Model>,
}

/// Retrieves all active subscriptions, oldest first.
///
/// The ordering matters: when combined demand outgrows stock, trimming
/// walks the spawned orders in this creation order.
pub async fn active_subscriptions<C>(db: &C) -> Result<Vec<subscription::Model>>
where
    C: ConnectionTrait,
{
    Subscription::find()
        .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
        .order_by_asc(subscription::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sums the weekly quantity committed across all active subscriptions.
pub async fn committed_subscription_quantity<C>(db: &C) -> Result<i32>
where
    C: ConnectionTrait,
{
    let subscriptions = active_subscriptions(db).await?;
    Ok(subscriptions.iter().map(|s| s.quantity).sum())
}

/// The customer's active subscription, if any.
pub async fn active_subscription_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Option<subscription::Model>> {
    Subscription::find()
        .filter(subscription::Column::UserId.eq(user_id))
        .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Computes the price of a subscription over its whole length.
#[must_use]
pub fn subscription_total(quantity: i32, bundle_price: f64, period_count: i32) -> f64 {
    crate::core::order::order_total(quantity, bundle_price) * f64::from(period_count)
}

/// Signs a customer up for a weekly subscription.
///
/// Validates the quantity and length against settings, refuses signups
/// during low season, and checks the subscription pool. With `start_now`
/// the current week must still have the eggs, and an order is spawned for
/// it immediately, consuming one of the subscription's weeks. Any existing
/// active subscription of the customer is replaced: its undelivered orders
/// are removed and it is marked cancelled.
///
/// # Arguments
/// * `db` - Database connection
/// * `user_id` - Customer signing up
/// * `quantity` - Eggs per week, a positive multiple of a bundle
/// * `period_count` - Length in weeks
/// * `start_now` - Whether the current week is the first fulfillment
/// * `today` - Date used to resolve the current week
pub async fn create_subscription(
    db: &DatabaseConnection,
    user_id: i64,
    quantity: i32,
    period_count: i32,
    start_now: bool,
    today: NaiveDate,
) -> Result<NewSubscription> {
    crate::core::order::validate_quantity(quantity)?;

    let txn = db.begin().await?;

    let settings = crate::core::settings::load_or_init(&txn).await?;
    if quantity > settings.max_per_subscription {
        return Err(Error::PerSubscriptionCapExceeded {
            requested: quantity,
            cap: settings.max_per_subscription,
        });
    }
    if period_count < settings.min_subscription_weeks
        || period_count > settings.max_subscription_weeks
    {
        return Err(Error::InvalidPeriodCount {
            count: period_count,
            min: settings.min_subscription_weeks,
            max: settings.max_subscription_weeks,
        });
    }

    let week = crate::core::week::current_week(&txn, today)
        .await?
        .ok_or(Error::NoCurrentWeek)?;
    if week.is_low_season {
        return Err(Error::LowSeasonClosed);
    }

    match crate::core::capacity::subscription_capacity(&txn, &settings, quantity).await? {
        CapacityDecision::Allowed => {}
        CapacityDecision::Full { limit, committed } => {
            return Err(Error::SubscriptionCapacityFull { limit, committed });
        }
        CapacityDecision::Partial {
            remaining,
            requested,
        } => {
            return Err(Error::SubscriptionCapacityPartial {
                requested,
                remaining,
            });
        }
    }

    if start_now {
        if week.all_delivered {
            // This week is over; the eggs are gone even if some were unsold
            return Err(Error::InsufficientStock {
                requested: quantity,
                available: 0,
            });
        }
        let available =
            crate::core::availability::available_stock(&txn, &week, None).await?;
        if quantity > available {
            return Err(Error::InsufficientStock {
                requested: quantity,
                available,
            });
        }
    }

    // Replace any subscription the customer already has
    let existing = Subscription::find()
        .filter(subscription::Column::UserId.eq(user_id))
        .filter(subscription::Column::Status.eq(SubscriptionStatus::Active))
        .all(&txn)
        .await?;
    for old in existing {
        info!(
            subscription_id = old.id,
            user_id, "Replacing existing active subscription"
        );
        Order::delete_many()
            .filter(order::Column::SubscriptionId.eq(old.id))
            .filter(order::Column::Status.eq(OrderStatus::Pending))
            .exec(&txn)
            .await?;

        let mut old_model: subscription::ActiveModel = old.into();
        old_model.status = Set(SubscriptionStatus::Cancelled);
        old_model.update(&txn).await?;
    }

    // Starting now spends one of the subscription's weeks on the current week
    let weeks_remaining = if start_now {
        period_count - 1
    } else {
        period_count
    };
    let next_fulfillment = week.week_start + chrono::Duration::days(7);

    let now = chrono::Utc::now();
    let subscription_model = subscription::ActiveModel {
        user_id: Set(user_id),
        quantity: Set(quantity),
        period_count: Set(period_count),
        weeks_remaining: Set(weeks_remaining),
        status: Set(SubscriptionStatus::Active),
        next_fulfillment: Set(Some(next_fulfillment)),
        created_at: Set(now),
        ..Default::default()
    };
    let subscription = subscription_model.insert(&txn).await?;

    let initial_order = if start_now {
        let order_model = order::ActiveModel {
            user_id: Set(user_id),
            week_id: Set(week.id),
            subscription_id: Set(Some(subscription.id)),
            quantity: Set(quantity),
            total: Set(crate::core::order::order_total(quantity, week.bundle_price)),
            status: Set(OrderStatus::Pending),
            is_paid: Set(false),
            payment_claimed: Set(false),
            picked_up: Set(false),
            created_at: Set(now),
            ..Default::default()
        };
        Some(order_model.insert(&txn).await?)
    } else {
        None
    };

    txn.commit().await?;

    Ok(NewSubscription {
        subscription,
        initial_order,
    })
}

/// Cancels a customer's subscription and removes its undelivered orders.
///
/// Orders that were already delivered (or completed) stay on the books;
/// only pending ones are released back into availability.
pub async fn cancel_subscription(
    db: &DatabaseConnection,
    subscription_id: i64,
    user_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let subscription = Subscription::find_by_id(subscription_id)
        .one(&txn)
        .await?
        .ok_or(Error::SubscriptionNotFound { subscription_id })?;
    if subscription.user_id != user_id {
        return Err(Error::NotOwner);
    }
    if subscription.status != SubscriptionStatus::Active {
        return Err(Error::SubscriptionNotActive { subscription_id });
    }

    Order::delete_many()
        .filter(order::Column::SubscriptionId.eq(subscription_id))
        .filter(order::Column::Status.eq(OrderStatus::Pending))
        .exec(&txn)
        .await?;

    let mut subscription_model: subscription::ActiveModel = subscription.into();
    subscription_model.status = Set(SubscriptionStatus::Cancelled);
    subscription_model.update(&txn).await?;

    txn.commit().await?;
    Ok(())
}
