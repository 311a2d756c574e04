//! Services for dairy-service.

pub mod database;
pub mod metrics;
pub mod notify;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
pub use notify::{MockNotifier, NotificationKind, Notifier, WebhookNotifier, notify_fire_and_forget};
