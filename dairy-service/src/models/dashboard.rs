//! Read-side aggregation rows for the owner dashboard.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Day-wide totals across all active customers.
#[derive(Debug, Clone, FromRow)]
pub struct TodayStats {
    pub total_milk_delivered: Decimal,
    pub total_revenue: Decimal,
    pub completed_deliveries: i64,
    pub total_customers: i64,
}

/// Per-agent rollup for one day. `areas` is the comma-joined union of the
/// agent's customer areas.
#[derive(Debug, Clone, FromRow)]
pub struct AgentDayStats {
    pub delivery_man_id: Uuid,
    pub name: String,
    pub areas: Option<String>,
    pub total_customers: i64,
    pub completed_today: i64,
    pub milk_delivered_today: Decimal,
}

impl AgentDayStats {
    /// Raw difference; a delivery recorded for a customer reassigned mid-day
    /// can push completed past total. Only the dashboard-wide count clamps.
    pub fn pending_today(&self) -> i64 {
        self.total_customers - self.completed_today
    }
}

/// A recent delivery with names resolved, for the activity feed.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityRow {
    pub delivery_id: Uuid,
    pub customer_name: String,
    pub delivery_man_name: String,
    pub area: String,
    pub quantity: Decimal,
    pub total_amount: Decimal,
    pub delivery_date: NaiveDate,
    pub created_utc: DateTime<Utc>,
}

/// Dashboard-wide pending count, clamped at zero.
///
/// Completed can exceed the active-customer total when a delivery exists for
/// a customer deactivated after recording; the clamp masks that undercount
/// rather than surfacing a negative number.
pub fn pending_count(total_customers: i64, completed_deliveries: i64) -> i64 {
    (total_customers - completed_deliveries).max(0)
}
