//! Farm settings business logic
//!
//! The settings table holds a single row of tunables: the default bundle
//! price stamped onto newly created weeks, and the caps that govern
//! subscriptions and low-season ordering. The row is created lazily with
//! built-in defaults (or values from config.toml on first boot), after
//! which the database copy is authoritative.

use crate::{
    config::limits::LimitsConfig,
    entities::{Order, OrderStatus, Settings, Week, order, settings, week},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Set, TransactionTrait, prelude::*};

/// Retrieves the settings row, creating it with built-in defaults if the
/// table is still empty.
pub async fn load_or_init<C>(db: &C) -> Result<settings::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = Settings::find().one(db).await? {
        return Ok(existing);
    }
    seed_settings(db, &LimitsConfig::default()).await
}

/// Seeds the settings row from `limits` if none exists yet.
///
/// Called at startup with the values from config.toml. An existing row wins
/// over the file, so operational changes made through the settings
/// operations are not silently reverted on restart.
///
/// # Arguments
/// * `db` - Database connection
/// * `limits` - Values to seed the row with
///
/// # Returns
/// * The settings row in effect afterwards
pub async fn seed_settings<C>(db: &C, limits: &LimitsConfig) -> Result<settings::Model>
where
    C: ConnectionTrait,
{
    if let Some(existing) = Settings::find().one(db).await? {
        return Ok(existing);
    }

    if !limits.default_bundle_price.is_finite() || limits.default_bundle_price < 0.0 {
        return Err(Error::InvalidPrice {
            price: limits.default_bundle_price,
        });
    }
    if limits.min_subscription_weeks < 1 || limits.max_subscription_weeks < limits.min_subscription_weeks
    {
        return Err(Error::Config {
            message: format!(
                "Invalid subscription length range: {} to {}",
                limits.min_subscription_weeks, limits.max_subscription_weeks
            ),
        });
    }

    let settings_model = settings::ActiveModel {
        default_bundle_price: Set(limits.default_bundle_price),
        max_subscription_total: Set(limits.max_subscription_total),
        max_per_subscription: Set(limits.max_per_subscription),
        min_subscription_weeks: Set(limits.min_subscription_weeks),
        max_subscription_weeks: Set(limits.max_subscription_weeks),
        low_season_stock_threshold: Set(limits.low_season_stock_threshold),
        low_season_cap_tight: Set(limits.low_season_cap_tight),
        low_season_cap_loose: Set(limits.low_season_cap_loose),
        ..Default::default()
    };

    settings_model.insert(db).await.map_err(Into::into)
}

/// Changes the default bundle price, optionally repricing weeks that have
/// not finished yet.
///
/// When `apply_to_open_weeks` is set, every week whose date range has not
/// passed gets the new price, and the totals of its pending orders are
/// recomputed. Delivered and completed orders keep the totals they were
/// settled at.
///
/// # Arguments
/// * `db` - Database connection
/// * `price` - New default bundle price in dollars
/// * `apply_to_open_weeks` - Whether to reprice current and future weeks
/// * `today` - Date used to decide which weeks are still open
pub async fn update_default_price(
    db: &DatabaseConnection,
    price: f64,
    apply_to_open_weeks: bool,
    today: NaiveDate,
) -> Result<settings::Model> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidPrice { price });
    }

    // Use a transaction so the settings row and repriced weeks move together
    let txn = db.begin().await?;

    let current = load_or_init(&txn).await?;
    let mut settings_model: settings::ActiveModel = current.into();
    settings_model.default_bundle_price = Set(price);
    let updated = settings_model.update(&txn).await?;

    if apply_to_open_weeks {
        let open_weeks = Week::find()
            .filter(week::Column::WeekEnd.gte(today))
            .all(&txn)
            .await?;

        for open_week in open_weeks {
            let week_id = open_week.id;
            let mut week_model: week::ActiveModel = open_week.into();
            week_model.bundle_price = Set(price);
            week_model.update(&txn).await?;

            // Reprice pending orders; settled orders keep their totals
            let pending_orders = Order::find()
                .filter(order::Column::WeekId.eq(week_id))
                .filter(order::Column::Status.eq(OrderStatus::Pending))
                .all(&txn)
                .await?;

            for pending in pending_orders {
                let quantity = pending.quantity;
                let mut order_model: order::ActiveModel = pending.into();
                order_model.total = Set(crate::core::order::order_total(quantity, price));
                order_model.update(&txn).await?;
            }
        }
    }

    txn.commit().await?;

    Ok(updated)
}
