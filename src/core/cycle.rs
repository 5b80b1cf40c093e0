//! Weekly cycle advancement
//!
//! The cycle job runs at least once per week (normally from the maintenance
//! binary) and keeps the calendar honest: ordering closes on every week whose
//! range has passed, and the week containing today exists afterwards. New
//! weeks start with no stock, ordering closed, and every flag cleared; they
//! only come to life once the farm declares stock.

use crate::{
    core::settings::load_or_init,
    entities::{Week, week},
    errors::Result,
};
use chrono::{Datelike, NaiveDate};
use sea_orm::{Set, TransactionTrait, prelude::*};

/// Returns the Monday of the week containing `date`.
#[must_use]
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Result of a cycle advancement run.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// The week covering the date the cycle ran for
    pub week: week::Model,
    /// How many expired weeks had their ordering closed
    pub closed_weeks: usize,
    /// Whether this run created the current week
    pub created: bool,
}

/// Advances the weekly cycle to the week containing `today`.
///
/// Closes ordering on weeks that have ended, then finds or creates the
/// current week. Creation takes the bundle price from settings; everything
/// else starts empty. Safe to run any number of times per week.
pub async fn advance_cycle(db: &DatabaseConnection, today: NaiveDate) -> Result<CycleOutcome> {
    let txn = db.begin().await?;

    let expired = Week::find()
        .filter(week::Column::IsOrderingOpen.eq(true))
        .filter(week::Column::WeekEnd.lt(today))
        .all(&txn)
        .await?;
    let closed_weeks = expired.len();

    for week in expired {
        tracing::info!(
            week_id = week.id,
            week_start = %week.week_start,
            "Closing ordering for expired week"
        );
        let mut week_model: week::ActiveModel = week.into();
        week_model.is_ordering_open = Set(false);
        week_model.update(&txn).await?;
    }

    let week_start = week_start_for(today);
    let existing = Week::find()
        .filter(week::Column::WeekStart.eq(week_start))
        .one(&txn)
        .await?;

    if let Some(week) = existing {
        txn.commit().await?;
        return Ok(CycleOutcome {
            week,
            closed_weeks,
            created: false,
        });
    }

    let settings = load_or_init(&txn).await?;

    let week = week::ActiveModel {
        week_start: Set(week_start),
        week_end: Set(week_start + chrono::Duration::days(6)),
        stock: Set(0),
        bundle_price: Set(settings.default_bundle_price),
        is_ordering_open: Set(false),
        is_low_season: Set(false),
        subscriptions_materialized: Set(false),
        delivery_date: Set(None),
        delivery_time: Set(None),
        all_delivered: Set(false),
        ..Default::default()
    };
    let week = week.insert(&txn).await?;

    tracing::info!(
        week_id = week.id,
        week_start = %week.week_start,
        "Created new week"
    );

    txn.commit().await?;

    Ok(CycleOutcome {
        week,
        closed_weeks,
        created: true,
    })
}
