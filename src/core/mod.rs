//! Core business logic for the egg stand
//!
//! Framework-agnostic operations over the database: the weekly cycle, week
//! lifecycle, one-time orders, subscriptions and their materialization,
//! availability and capacity accounting, fulfillment, and farm settings.

/// Stock availability accounting for a week
pub mod availability;
/// Subscription pool capacity and low-season order caps
pub mod capacity;
/// Weekly cycle advancement
pub mod cycle;
/// Delivery, payment, and pickup tracking
pub mod fulfillment;
/// Spawning subscription orders into a week, with fair trimming
pub mod materialize;
/// One-time order placement and management
pub mod order;
/// Persistent farm settings
pub mod settings;
/// Subscription creation and cancellation
pub mod subscription;
/// Week lifecycle operations
pub mod week;
