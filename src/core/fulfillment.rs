//! Delivery and payment tracking
//!
//! Once the farm delivers a week, every pending order moves to delivered
//! and waits on two independent signals: payment confirmed by the farm and
//! pickup confirmed by the customer. An order completes exactly when it is
//! delivered, paid, and picked up. There is also a customer-side payment
//! claim, which is a hint for the farm and never completes anything.

use crate::{
    core::week::get_week,
    entities::{Order, OrderStatus, order, week},
    errors::{Error, Result},
    notify::Notifier,
};
use sea_orm::{Set, TransactionTrait, prelude::*};

/// Promotes a delivered order to completed if payment and pickup are both in.
async fn apply_completion<C>(db: &C, order: order::Model) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    if order.status == OrderStatus::Delivered && order.is_paid && order.picked_up {
        let mut order_model: order::ActiveModel = order.into();
        order_model.status = Set(OrderStatus::Completed);
        return order_model.update(db).await.map_err(Into::into);
    }
    Ok(order)
}

async fn get_order<C>(db: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { order_id })
}

/// Marks a whole week as delivered.
///
/// Every pending order in the week becomes delivered, or completed outright
/// when the customer already paid and picked up at the stand. The week stops
/// taking orders. Customers are notified once, after commit.
///
/// Returns how many orders were transitioned.
pub async fn mark_week_delivered(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    week_id: i64,
) -> Result<usize> {
    let txn = db.begin().await?;

    let week = get_week(&txn, week_id).await?;
    if week.all_delivered {
        return Err(Error::WeekDelivered { week_id });
    }

    let pending = Order::find()
        .filter(order::Column::WeekId.eq(week_id))
        .filter(order::Column::Status.eq(OrderStatus::Pending))
        .all(&txn)
        .await?;
    let transitioned = pending.len();

    for order in pending {
        let next_status = if order.is_paid && order.picked_up {
            OrderStatus::Completed
        } else {
            OrderStatus::Delivered
        };
        let mut order_model: order::ActiveModel = order.into();
        order_model.status = Set(next_status);
        order_model.update(&txn).await?;
    }

    let mut week_model: week::ActiveModel = week.into();
    week_model.all_delivered = Set(true);
    week_model.is_ordering_open = Set(false);
    let week = week_model.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        week_id = week.id,
        orders = transitioned,
        "Marked week as delivered"
    );
    notifier.orders_delivered(&week);

    Ok(transitioned)
}

/// Records that the farm received payment for an order.
///
/// Operator action, so there is no owner check. Completes the order if it
/// was already delivered and picked up.
pub async fn confirm_payment(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    let txn = db.begin().await?;

    let order = get_order(&txn, order_id).await?;
    let mut order_model: order::ActiveModel = order.into();
    order_model.is_paid = Set(true);
    let order = order_model.update(&txn).await?;

    let order = apply_completion(&txn, order).await?;

    txn.commit().await?;
    Ok(order)
}

/// Records a customer's claim that they have paid.
///
/// The claim is informational until the farm confirms the money arrived, so
/// it never completes the order.
pub async fn claim_payment(
    db: &DatabaseConnection,
    order_id: i64,
    user_id: i64,
) -> Result<order::Model> {
    let order = get_order(db, order_id).await?;
    if order.user_id != user_id {
        return Err(Error::NotOwner);
    }
    if order.status == OrderStatus::Completed {
        return Err(Error::OrderCompleted { order_id });
    }

    let mut order_model: order::ActiveModel = order.into();
    order_model.payment_claimed = Set(true);
    order_model.update(db).await.map_err(Into::into)
}

/// Records that the customer picked up their eggs.
///
/// Only makes sense once the order has been delivered. Completes the order
/// if payment was already confirmed.
pub async fn confirm_pickup(
    db: &DatabaseConnection,
    order_id: i64,
    user_id: i64,
) -> Result<order::Model> {
    let txn = db.begin().await?;

    let order = get_order(&txn, order_id).await?;
    if order.user_id != user_id {
        return Err(Error::NotOwner);
    }
    if order.status == OrderStatus::Pending {
        return Err(Error::OrderNotDelivered { order_id });
    }

    let mut order_model: order::ActiveModel = order.into();
    order_model.picked_up = Set(true);
    let order = order_model.update(&txn).await?;

    let order = apply_completion(&txn, order).await?;

    txn.commit().await?;
    Ok(order)
}

/// Sends a payment reminder for every delivered order still awaiting payment.
///
/// Returns how many reminders went out.
pub async fn send_payment_reminders(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
) -> Result<usize> {
    let unpaid = Order::find()
        .filter(order::Column::Status.eq(OrderStatus::Delivered))
        .filter(order::Column::IsPaid.eq(false))
        .all(db)
        .await?;

    for order in &unpaid {
        notifier.payment_reminder(order);
    }

    Ok(unpaid.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::notify::NullNotifier;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_mark_week_delivered_transitions_pending_orders() -> Result<()> {
        let db = setup_test_db().await?;
        let week = create_open_week(&db, test_monday(), 100).await?;
        let first = create_pending_order(&db, 1, week.id, 20, None).await?;
        let second = create_pending_order(&db, 2, week.id, 30, None).await?;

        let transitioned = mark_week_delivered(&db, &NullNotifier, week.id).await?;
        assert_eq!(transitioned, 2);

        let first = get_order(&db, first.id).await?;
        let second = get_order(&db, second.id).await?;
        assert_eq!(first.status, OrderStatus::Delivered);
        assert_eq!(second.status, OrderStatus::Delivered);

        let week = get_week(&db, week.id).await?;
        assert!(week.all_delivered);
        assert!(!week.is_ordering_open);

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_week_delivered_completes_prepaid_pickups() -> Result<()> {
        let db = setup_test_db().await?;
        let week = create_open_week(&db, test_monday(), 100).await?;
        let order = create_pending_order(&db, 1, week.id, 20, None).await?;
        mark_order_paid(&db, order.id).await?;
        mark_order_picked_up(&db, order.id).await?;

        mark_week_delivered(&db, &NullNotifier, week.id).await?;

        let order = get_order(&db, order.id).await?;
        assert_eq!(order.status, OrderStatus::Completed);

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_week_delivered_rejects_second_run() -> Result<()> {
        let db = setup_test_db().await?;
        let week = create_open_week(&db, test_monday(), 100).await?;
        let notifier = RecordingNotifier::default();

        mark_week_delivered(&db, &notifier, week.id).await?;
        let result = mark_week_delivered(&db, &notifier, week.id).await;
        assert!(matches!(result.unwrap_err(), Error::WeekDelivered { .. }));

        assert_eq!(notifier.orders_delivered_weeks(), vec![week.id]);

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_payment_completes_picked_up_order() -> Result<()> {
        let db = setup_test_db().await?;
        let week = create_open_week(&db, test_monday(), 100).await?;
        let order = create_pending_order(&db, 1, week.id, 20, None).await?;
        mark_week_delivered(&db, &NullNotifier, week.id).await?;
        confirm_pickup(&db, order.id, 1).await?;

        let order = confirm_payment(&db, order.id).await?;
        assert!(order.is_paid);
        assert_eq!(order.status, OrderStatus::Completed);

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_payment_alone_keeps_order_delivered() -> Result<()> {
        let db = setup_test_db().await?;
        let week = create_open_week(&db, test_monday(), 100).await?;
        let order = create_pending_order(&db, 1, week.id, 20, None).await?;
        mark_week_delivered(&db, &NullNotifier, week.id).await?;

        let order = confirm_payment(&db, order.id).await?;
        assert!(order.is_paid);
        assert_eq!(order.status, OrderStatus::Delivered);

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_payment_unknown_order() -> Result<()> {
        let db = setup_test_db().await?;

        let result = confirm_payment(&db, 42).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::OrderNotFound { order_id: 42 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_claim_payment_never_completes() -> Result<()> {
        let db = setup_test_db().await?;
        let week = create_open_week(&db, test_monday(), 100).await?;
        let order = create_pending_order(&db, 1, week.id, 20, None).await?;
        mark_week_delivered(&db, &NullNotifier, week.id).await?;
        confirm_pickup(&db, order.id, 1).await?;

        // Claimed and picked up, but the farm has not confirmed the money
        let order = claim_payment(&db, order.id, 1).await?;
        assert!(order.payment_claimed);
        assert!(!order.is_paid);
        assert_eq!(order.status, OrderStatus::Delivered);

        Ok(())
    }

    #[tokio::test]
    async fn test_claim_payment_checks_owner_and_state() -> Result<()> {
        let db = setup_test_db().await?;
        let week = create_open_week(&db, test_monday(), 100).await?;
        let order = create_pending_order(&db, 1, week.id, 20, None).await?;

        let result = claim_payment(&db, order.id, 2).await;
        assert!(matches!(result.unwrap_err(), Error::NotOwner));

        set_order_status(&db, order.id, OrderStatus::Completed).await?;
        let result = claim_payment(&db, order.id, 1).await;
        assert!(matches!(result.unwrap_err(), Error::OrderCompleted { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_pickup_rejects_pending_order() -> Result<()> {
        let db = setup_test_db().await?;
        let week = create_open_week(&db, test_monday(), 100).await?;
        let order = create_pending_order(&db, 1, week.id, 20, None).await?;

        let result = confirm_pickup(&db, order.id, 1).await;
        assert!(matches!(result.unwrap_err(), Error::OrderNotDelivered { .. }));

        let result = confirm_pickup(&db, order.id, 2).await;
        assert!(matches!(result.unwrap_err(), Error::NotOwner));

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_pickup_completes_paid_order() -> Result<()> {
        let db = setup_test_db().await?;
        let week = create_open_week(&db, test_monday(), 100).await?;
        let order = create_pending_order(&db, 1, week.id, 20, None).await?;
        mark_week_delivered(&db, &NullNotifier, week.id).await?;
        confirm_payment(&db, order.id).await?;

        let order = confirm_pickup(&db, order.id, 1).await?;
        assert!(order.picked_up);
        assert_eq!(order.status, OrderStatus::Completed);

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_reminders_target_delivered_unpaid_orders() -> Result<()> {
        let db = setup_test_db().await?;
        let week = create_open_week(&db, test_monday(), 100).await?;
        let unpaid = create_pending_order(&db, 1, week.id, 20, None).await?;
        let paid = create_pending_order(&db, 2, week.id, 30, None).await?;
        mark_order_paid(&db, paid.id).await?;
        mark_week_delivered(&db, &NullNotifier, week.id).await?;

        // An order in a week that is still out for delivery gets no reminder
        let next_week = create_open_week(&db, test_monday() + chrono::Duration::days(7), 100).await?;
        create_pending_order(&db, 3, next_week.id, 10, None).await?;

        let notifier = RecordingNotifier::default();
        let sent = send_payment_reminders(&db, &notifier).await?;

        assert_eq!(sent, 1);
        assert_eq!(notifier.payment_reminder_orders(), vec![unpaid.id]);

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_reminders_with_nothing_outstanding() -> Result<()> {
        let db = setup_test_db().await?;

        let sent = send_payment_reminders(&db, &NullNotifier).await?;
        assert_eq!(sent, 0);

        Ok(())
    }
}
