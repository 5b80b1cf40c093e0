//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod order;
pub mod settings;
pub mod subscription;
pub mod week;

// Re-export specific types to avoid conflicts
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel, OrderStatus};
pub use settings::{Column as SettingsColumn, Entity as Settings, Model as SettingsModel};
pub use subscription::{
    Column as SubscriptionColumn, Entity as Subscription, Model as SubscriptionModel,
    SubscriptionStatus,
};
pub use week::{Column as WeekColumn, Entity as Week, Model as WeekModel};
