//! Subscription pool and seasonal cap business logic
//!
//! Subscriptions may only ever claim a fixed share of weekly production, so
//! one-time buyers always have eggs left to order. This module decides
//! whether a requested subscription quantity fits inside that pool, and
//! computes the per-order cap that applies to one-time orders during low
//! season.

use crate::{
    entities::{settings, week},
    errors::Result,
};
use sea_orm::prelude::*;

/// Outcome of checking a requested quantity against the subscription pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityDecision {
    /// The pool has room for the full request
    Allowed,
    /// The pool is exhausted
    Full {
        /// Size of the pool in eggs per week
        limit: i32,
        /// Eggs per week already committed to active subscriptions
        committed: i32,
    },
    /// Some room remains, but less than requested
    Partial {
        /// Eggs per week still unclaimed in the pool
        remaining: i32,
        /// Eggs per week that were asked for
        requested: i32,
    },
}

/// Checks whether `requested` eggs per week fit in the subscription pool.
///
/// The pool size comes from settings; what is already committed is the sum
/// over all active subscriptions, including any the requesting customer
/// currently holds.
pub async fn subscription_capacity<C>(
    db: &C,
    settings: &settings::Model,
    requested: i32,
) -> Result<CapacityDecision>
where
    C: ConnectionTrait,
{
    let committed = crate::core::subscription::committed_subscription_quantity(db).await?;
    let remaining = settings.max_subscription_total - committed;

    if remaining <= 0 {
        return Ok(CapacityDecision::Full {
            limit: settings.max_subscription_total,
            committed,
        });
    }
    if requested > remaining {
        return Ok(CapacityDecision::Partial {
            remaining,
            requested,
        });
    }

    Ok(CapacityDecision::Allowed)
}

/// Computes the cap on a single one-time order, if one applies.
///
/// Outside low season there is no cap beyond availability. During low
/// season the cap tightens further when declared stock sits below the
/// configured threshold.
#[must_use]
pub fn low_season_order_cap(week: &week::Model, settings: &settings::Model) -> Option<i32> {
    if !week.is_low_season {
        return None;
    }

    if week.stock < settings.low_season_stock_threshold {
        Some(settings.low_season_cap_tight)
    } else {
        Some(settings.low_season_cap_loose)
    }
}
