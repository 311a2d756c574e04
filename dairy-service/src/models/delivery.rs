//! Delivery ledger model: one record per (customer, calendar day).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A delivery fact. The rate is a snapshot taken at write time; later rate
/// changes on the customer never alter stored records.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Delivery {
    pub delivery_id: Uuid,
    pub customer_id: Uuid,
    pub delivery_man_id: Uuid,
    pub quantity: Decimal,
    pub rate_per_liter: Decimal,
    pub total_amount: Decimal,
    pub delivery_date: NaiveDate,
    pub created_utc: DateTime<Utc>,
}

impl Delivery {
    /// Charge for a delivery: round(rate x quantity, 2), half away from zero.
    pub fn charge(quantity: Decimal, rate_per_liter: Decimal) -> Decimal {
        (rate_per_liter * quantity).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Input for the record-delivery upsert.
#[derive(Debug, Clone)]
pub struct RecordDelivery {
    pub customer_id: Uuid,
    pub delivery_man_id: Uuid,
    pub quantity: Decimal,
    pub delivery_date: NaiveDate,
}

/// Delivery joined with customer name and area for agent listings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DeliveryRow {
    pub delivery_id: Uuid,
    pub customer_id: Uuid,
    pub delivery_man_id: Uuid,
    pub quantity: Decimal,
    pub rate_per_liter: Decimal,
    pub total_amount: Decimal,
    pub delivery_date: NaiveDate,
    pub created_utc: DateTime<Utc>,
    pub customer_name: String,
    pub area: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn charge_is_rate_times_quantity_rounded() {
        assert_eq!(Delivery::charge(dec!(1.5), dec!(60)), dec!(90.00));
        assert_eq!(Delivery::charge(dec!(1.0), dec!(60)), dec!(60.00));
        assert_eq!(Delivery::charge(dec!(0.333), dec!(55.5)), dec!(18.48));
    }

    #[test]
    fn charge_rounds_half_away_from_zero() {
        // 0.125 * 61 = 7.625 -> 7.63, not banker's 7.62
        assert_eq!(Delivery::charge(dec!(0.125), dec!(61)), dec!(7.63));
    }
}
