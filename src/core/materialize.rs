//! Subscription materialization
//!
//! When stock is first declared for a week, every active subscription is
//! turned into a real pending order at the week's bundle price. If the
//! combined subscription demand outgrows the declared stock, the spawned
//! orders are trimmed one bundle at a time, always taking from the largest
//! order first, until everything fits. Materialization runs at most once
//! per week, guarded by a flag on the week row, and always inside the
//! caller's transaction.

use crate::{
    core::order::{BUNDLE_SIZE, order_total},
    entities::{OrderStatus, SubscriptionStatus, order, subscription, week},
    errors::Result,
};
use sea_orm::{Set, prelude::*};
use tracing::info;

/// One subscriber's order that had to shrink to fit the declared stock.
#[derive(Debug, Clone)]
pub struct TrimOutcome {
    /// Order that was reduced
    pub order_id: i64,
    /// Customer holding the order
    pub user_id: i64,
    /// Quantity the subscription asked for
    pub original_quantity: i32,
    /// Quantity actually committed
    pub final_quantity: i32,
}

/// What materializing subscriptions into a week produced.
#[derive(Debug, Clone, Default)]
pub struct MaterializationSummary {
    /// Orders spawned, one per active subscription
    pub orders_created: usize,
    /// Eggs committed to subscriptions after trimming
    pub committed_quantity: i32,
    /// Subscriptions that ran out of weeks and completed
    pub completed_subscriptions: usize,
    /// Orders that had to shrink, in creation order
    pub trims: Vec<TrimOutcome>,
}

/// Reduces `quantities` until their sum fits in `stock`.
///
/// Works one bundle at a time, always taking from the largest entry; ties
/// go to the earliest entry, so results are deterministic for a fixed input
/// order. No entry ever drops below one bundle, which means the sum can
/// still exceed `stock` when everyone is already at the floor. Entries are
/// expected oldest first.
pub fn fair_trim(quantities: &mut [i32], stock: i32) {
    let mut total: i32 = quantities.iter().sum();

    while total > stock {
        let mut max_index = 0;
        let mut max_quantity = 0;
        for (index, &quantity) in quantities.iter().enumerate() {
            if quantity > max_quantity {
                max_quantity = quantity;
                max_index = index;
            }
        }

        if max_quantity <= BUNDLE_SIZE {
            break;
        }

        quantities[max_index] -= BUNDLE_SIZE;
        total -= BUNDLE_SIZE;
    }
}

/// Turns every active subscription into a pending order for `week`.
///
/// For each subscription this spawns an order at the full subscribed
/// quantity, counts the week against `weeks_remaining`, and completes
/// subscriptions that just fulfilled their last week. Then the spawned
/// orders are trimmed as a group to fit the week's declared stock. The
/// week's materialization flag is set at the end, and a repeat call returns
/// an empty summary without touching anything.
///
/// Callers are expected to run this inside a transaction alongside the
/// stock declaration that triggered it, and to send out trim notifications
/// only after that transaction commits.
pub async fn materialize_subscriptions<C>(
    db: &C,
    week: &week::Model,
) -> Result<MaterializationSummary>
where
    C: ConnectionTrait,
{
    if week.subscriptions_materialized {
        return Ok(MaterializationSummary::default());
    }

    let subscriptions = crate::core::subscription::active_subscriptions(db).await?;
    let now = chrono::Utc::now();
    let next_fulfillment = week.week_start + chrono::Duration::days(7);

    let mut created: Vec<order::Model> = Vec::new();
    let mut completed_subscriptions = 0;

    for sub in subscriptions {
        let order_model = order::ActiveModel {
            user_id: Set(sub.user_id),
            week_id: Set(week.id),
            subscription_id: Set(Some(sub.id)),
            quantity: Set(sub.quantity),
            total: Set(order_total(sub.quantity, week.bundle_price)),
            status: Set(OrderStatus::Pending),
            is_paid: Set(false),
            payment_claimed: Set(false),
            picked_up: Set(false),
            created_at: Set(now),
            ..Default::default()
        };
        created.push(order_model.insert(db).await?);

        let weeks_remaining = sub.weeks_remaining - 1;
        let mut sub_model: subscription::ActiveModel = sub.into();
        sub_model.weeks_remaining = Set(weeks_remaining);
        if weeks_remaining <= 0 {
            sub_model.status = Set(SubscriptionStatus::Completed);
            sub_model.next_fulfillment = Set(None);
            completed_subscriptions += 1;
        } else {
            sub_model.next_fulfillment = Set(Some(next_fulfillment));
        }
        sub_model.update(db).await?;
    }

    // Fit the combined subscription demand into the declared stock
    let mut quantities: Vec<i32> = created.iter().map(|o| o.quantity).collect();
    fair_trim(&mut quantities, week.stock);

    let mut trims = Vec::new();
    for (spawned, &final_quantity) in created.iter().zip(&quantities) {
        if final_quantity < spawned.quantity {
            let mut order_model: order::ActiveModel = spawned.clone().into();
            order_model.quantity = Set(final_quantity);
            order_model.total = Set(order_total(final_quantity, week.bundle_price));
            order_model.update(db).await?;

            trims.push(TrimOutcome {
                order_id: spawned.id,
                user_id: spawned.user_id,
                original_quantity: spawned.quantity,
                final_quantity,
            });
        }
    }

    let committed_quantity: i32 = quantities.iter().sum();

    // Mark the week so this can never run twice
    let mut week_model: week::ActiveModel = week.clone().into();
    week_model.subscriptions_materialized = Set(true);
    week_model.update(db).await?;

    info!(
        week_id = week.id,
        orders_created = created.len(),
        committed_quantity,
        trimmed = trims.len(),
        "Materialized subscriptions into orders"
    );

    Ok(MaterializationSummary {
        orders_created: created.len(),
        committed_quantity,
        completed_subscriptions,
        trims,
    })
}

/// What materialization against a candidate stock level would commit.
#[derive(Debug, Clone)]
pub struct MaterializationPreview {
    /// Active subscriptions that would spawn orders
    pub subscriber_count: usize,
    /// Eggs the subscriptions ask for in total
    pub total_demand: i32,
    /// Whether the demand outgrows the candidate stock
    pub will_trim: bool,
    /// Eggs of demand that could not be honored
    pub deficit: i32,
    /// Eggs left for one-time orders after subscriptions are served
    pub remaining_for_one_time: i32,
}

/// Projects what materializing against `candidate_stock` would do, without
/// writing anything. Used by the farm to sanity-check a stock level before
/// declaring it.
pub async fn preview_materialization<C>(
    db: &C,
    candidate_stock: i32,
) -> Result<MaterializationPreview>
where
    C: ConnectionTrait,
{
    let subscriptions = crate::core::subscription::active_subscriptions(db).await?;
    let total_demand: i32 = subscriptions.iter().map(|s| s.quantity).sum();

    Ok(MaterializationPreview {
        subscriber_count: subscriptions.len(),
        total_demand,
        will_trim: total_demand > candidate_stock,
        deficit: (total_demand - candidate_stock).max(0),
        remaining_for_one_time: (candidate_stock - total_demand).max(0),
    })
}
