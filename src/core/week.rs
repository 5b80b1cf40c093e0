//! Week lifecycle business logic
//!
//! Weeks are created by the weekly cycle with no stock and ordering closed.
//! This module covers everything the farm does to a week afterwards:
//! declaring how many eggs there are (which opens ordering and, the first
//! time, materializes subscriptions), announcing the delivery slot, and
//! flagging low season. Notifications go out only after the underlying
//! transaction commits.

use crate::{
    core::materialize::{self, MaterializationSummary},
    entities::{Week, week},
    errors::{Error, Result},
    notify::Notifier,
};
use chrono::NaiveDate;
use sea_orm::{Set, TransactionTrait, prelude::*};

/// Finds the week whose date range contains `today`, if any.
pub async fn current_week<C>(db: &C, today: NaiveDate) -> Result<Option<week::Model>>
where
    C: ConnectionTrait,
{
    Week::find()
        .filter(week::Column::WeekStart.lte(today))
        .filter(week::Column::WeekEnd.gte(today))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a week by id, or errors if it does not exist.
pub async fn get_week<C>(db: &C, week_id: i64) -> Result<week::Model>
where
    C: ConnectionTrait,
{
    Week::find_by_id(week_id)
        .one(db)
        .await?
        .ok_or(Error::WeekNotFound { week_id })
}

/// Result of declaring stock for a week.
#[derive(Debug, Clone)]
pub struct StockDeclaration {
    /// The week as it stands after the declaration
    pub week: week::Model,
    /// Outcome of subscription materialization, if it ran this time
    pub materialization: Option<MaterializationSummary>,
}

/// Declares the egg stock for a week.
///
/// Any positive stock opens ordering; declaring zero records the count but
/// leaves ordering as it was. The first declaration that finds the week
/// unmaterialized and brings stock above zero also materializes active
/// subscriptions, inside the same transaction, so customers can never
/// order against stock that subscription trimming is about to claim.
///
/// After commit, customers hear about stock only when it went from none to
/// some, and trimmed subscribers are told what their order shrank to.
///
/// # Arguments
/// * `db` - Database connection
/// * `notifier` - Where post-commit events are reported
/// * `week_id` - Week being declared for
/// * `stock` - Total eggs available this week
/// * `bundle_price` - Optional price override for this week
pub async fn declare_stock(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    week_id: i64,
    stock: i32,
    bundle_price: Option<f64>,
) -> Result<StockDeclaration> {
    if stock < 0 {
        return Err(Error::InvalidStock { stock });
    }
    if let Some(price) = bundle_price {
        if !price.is_finite() || price < 0.0 {
            return Err(Error::InvalidPrice { price });
        }
    }

    let txn = db.begin().await?;

    let week = get_week(&txn, week_id).await?;
    let had_stock = week.stock > 0;
    let needs_materialization = !week.subscriptions_materialized && stock > 0;

    let mut week_model: week::ActiveModel = week.into();
    week_model.stock = Set(stock);
    if stock > 0 {
        week_model.is_ordering_open = Set(true);
    }
    if let Some(price) = bundle_price {
        week_model.bundle_price = Set(price);
    }
    let mut updated = week_model.update(&txn).await?;

    let materialization = if needs_materialization {
        let summary = materialize::materialize_subscriptions(&txn, &updated).await?;
        // Materialization set the week's flag; pick that up
        updated = get_week(&txn, week_id).await?;
        Some(summary)
    } else {
        None
    };

    txn.commit().await?;

    if !had_stock && stock > 0 {
        notifier.stock_declared(&updated);
    }
    if let Some(summary) = &materialization {
        for trim in &summary.trims {
            notifier.subscription_trimmed(
                trim.user_id,
                trim.original_quantity,
                trim.final_quantity,
            );
        }
    }

    Ok(StockDeclaration {
        week: updated,
        materialization,
    })
}

/// Announces the delivery slot for a week.
///
/// Customers are notified the first time a date is set; later corrections
/// update the week quietly.
pub async fn schedule_delivery(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    week_id: i64,
    delivery_date: NaiveDate,
    delivery_time: Option<String>,
) -> Result<week::Model> {
    let week = get_week(db, week_id).await?;
    let first_announcement = week.delivery_date.is_none();

    let mut week_model: week::ActiveModel = week.into();
    week_model.delivery_date = Set(Some(delivery_date));
    week_model.delivery_time = Set(delivery_time);
    let updated = week_model.update(db).await?;

    if first_announcement {
        notifier.delivery_scheduled(&updated);
    }

    Ok(updated)
}

/// Flags or unflags a week as low season.
pub async fn set_low_season(
    db: &DatabaseConnection,
    week_id: i64,
    is_low_season: bool,
) -> Result<week::Model> {
    let week = get_week(db, week_id).await?;

    let mut week_model: week::ActiveModel = week.into();
    week_model.is_low_season = Set(is_low_season);
    week_model.update(db).await.map_err(Into::into)
}
