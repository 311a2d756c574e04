//! Customer registry model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Registry row as stored. The person identity (name, phone, active flag)
/// lives on the linked `people` row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: Uuid,
    pub person_id: Uuid,
    pub address: String,
    pub area: String,
    pub usual_quantity: Decimal,
    pub rate_per_liter: Decimal,
    pub delivery_man_id: Uuid,
    pub created_utc: DateTime<Utc>,
}

/// Customer joined with its person identity.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: Uuid,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub area: String,
    pub usual_quantity: Decimal,
    pub rate_per_liter: Decimal,
    pub delivery_man_id: Uuid,
    pub is_active: bool,
}

/// Input for onboarding a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub area: String,
    pub usual_quantity: Decimal,
    pub rate_per_liter: Decimal,
    pub delivery_man_id: Uuid,
}

/// Partial update; `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub area: Option<String>,
    pub usual_quantity: Option<Decimal>,
    pub rate_per_liter: Option<Decimal>,
}

/// Delivery status of a customer's day slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Complete,
    Pending,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Complete => "complete",
            DayStatus::Pending => "pending",
        }
    }
}

/// One row of the per-agent daily snapshot: the customer plus whatever was
/// recorded for the requested day, if anything.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CustomerDayStatus {
    pub customer_id: Uuid,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub area: String,
    pub usual_quantity: Decimal,
    pub rate_per_liter: Decimal,
    pub day_quantity: Option<Decimal>,
    pub recorded_utc: Option<DateTime<Utc>>,
}

impl CustomerDayStatus {
    /// Complete once a delivery record exists for the day; a recorded day
    /// never transitions back to pending.
    pub fn status(&self) -> DayStatus {
        if self.day_quantity.is_some() {
            DayStatus::Complete
        } else {
            DayStatus::Pending
        }
    }
}
