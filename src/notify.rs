//! Customer notification dispatch.
//!
//! Domain operations report noteworthy events (stock declared, deliveries,
//! trims, payment reminders) through the [`Notifier`] trait and carry on;
//! implementations decide who hears about it and over which channels.
//! Notification failures must never abort the operation that raised them,
//! so the trait methods are infallible and implementations log their own
//! delivery errors.

use crate::entities::{OrderModel, WeekModel};
use tracing::info;

/// A delivery channel a customer can enable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Plain email
    Email,
    /// Mobile push
    Push,
}

/// Resolves which channels a customer has enabled.
///
/// Per-customer events consult this before dispatching, so a customer who
/// turned everything off simply hears nothing.
pub trait ChannelLookup: Send + Sync {
    /// Returns the channels enabled for `user_id`, possibly empty.
    fn enabled_channels(&self, user_id: i64) -> Vec<Channel>;
}

/// Lookup that enables every channel for every customer.
pub struct AllChannels;

impl ChannelLookup for AllChannels {
    fn enabled_channels(&self, _user_id: i64) -> Vec<Channel> {
        vec![Channel::Email, Channel::Push]
    }
}

/// Receiver for domain events worth telling customers about.
///
/// Week-level events (`stock_declared`, `orders_delivered`,
/// `delivery_scheduled`) are broadcasts; implementations resolve the
/// audience themselves. `subscription_trimmed` and `payment_reminder`
/// target a single customer.
pub trait Notifier: Send + Sync {
    /// Stock for the week went from zero to available and ordering opened.
    fn stock_declared(&self, week: &WeekModel);

    /// Every order of the week has been handed over.
    fn orders_delivered(&self, week: &WeekModel);

    /// A subscriber's weekly order was reduced to fit the declared stock.
    fn subscription_trimmed(&self, user_id: i64, original_quantity: i32, final_quantity: i32);

    /// A delivery date was announced for the week.
    fn delivery_scheduled(&self, week: &WeekModel);

    /// A delivered order is still unpaid after the week closed out.
    fn payment_reminder(&self, order: &OrderModel);
}

/// Notifier that writes every event to the log.
///
/// This is the implementation the maintenance binary runs with. Broadcast
/// events become single log lines; per-customer events are expanded through
/// the configured [`ChannelLookup`] so the log shows exactly which channels
/// a real dispatcher would have used.
pub struct LogNotifier<L = AllChannels> {
    lookup: L,
}

impl LogNotifier {
    /// Creates a `LogNotifier` that treats every channel as enabled.
    pub fn new() -> Self {
        Self {
            lookup: AllChannels,
        }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ChannelLookup> LogNotifier<L> {
    /// Creates a `LogNotifier` with a custom channel lookup.
    pub fn with_lookup(lookup: L) -> Self {
        Self { lookup }
    }
}

impl<L: ChannelLookup> Notifier for LogNotifier<L> {
    fn stock_declared(&self, week: &WeekModel) {
        info!(
            week_id = week.id,
            stock = week.stock,
            bundle_price = week.bundle_price,
            "Eggs available for week starting {}",
            week.week_start
        );
    }

    fn orders_delivered(&self, week: &WeekModel) {
        info!(
            week_id = week.id,
            "All orders delivered for week starting {}", week.week_start
        );
    }

    fn subscription_trimmed(&self, user_id: i64, original_quantity: i32, final_quantity: i32) {
        for channel in self.lookup.enabled_channels(user_id) {
            info!(
                user_id,
                ?channel,
                original_quantity,
                final_quantity,
                "Subscription order trimmed to fit this week's stock"
            );
        }
    }

    fn delivery_scheduled(&self, week: &WeekModel) {
        info!(
            week_id = week.id,
            delivery_date = ?week.delivery_date,
            delivery_time = ?week.delivery_time,
            "Delivery scheduled for week starting {}",
            week.week_start
        );
    }

    fn payment_reminder(&self, order: &OrderModel) {
        for channel in self.lookup.enabled_channels(order.user_id) {
            info!(
                user_id = order.user_id,
                ?channel,
                order_id = order.id,
                total = order.total,
                "Payment reminder for delivered order"
            );
        }
    }
}

/// Notifier that drops every event, for callers that want silence.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn stock_declared(&self, _week: &WeekModel) {}
    fn orders_delivered(&self, _week: &WeekModel) {}
    fn subscription_trimmed(&self, _user_id: i64, _original_quantity: i32, _final_quantity: i32) {}
    fn delivery_scheduled(&self, _week: &WeekModel) {}
    fn payment_reminder(&self, _order: &OrderModel) {}
}
