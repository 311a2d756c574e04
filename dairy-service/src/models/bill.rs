//! Monthly bill model and billing window arithmetic.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One bill per (customer, month, year). Regeneration overwrites totals and
/// the timestamp; it never accumulates.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MonthlyBill {
    pub bill_id: Uuid,
    pub customer_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
    pub is_generated: bool,
    pub generated_utc: DateTime<Utc>,
}

/// Bill joined with customer identity for listings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BillRow {
    pub bill_id: Uuid,
    pub customer_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
    pub is_generated: bool,
    pub generated_utc: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
}

/// Per-customer aggregate over a billing window, as read from the ledger.
#[derive(Debug, Clone, FromRow)]
pub struct CustomerMonthAggregate {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
    pub delivery_days: i64,
}

/// Summary over one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingSummary {
    pub total_customers: usize,
    pub total_quantity: Decimal,
    pub total_amount: Decimal,
    pub month: u32,
    pub year: i32,
}

/// A (month, year) aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    pub month: u32,
    pub year: i32,
}

impl BillingPeriod {
    pub fn new(month: u32, year: i32) -> Option<Self> {
        // Probe the first day to reject month 0 / 13 and absurd years.
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { month, year })
    }

    /// Window containing the given day.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    /// Half-open [start, end) date bounds of the window.
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated on construction");
        let end = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        }
        .expect("validated on construction");
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_months() {
        assert!(BillingPeriod::new(0, 2024).is_none());
        assert!(BillingPeriod::new(13, 2024).is_none());
        assert!(BillingPeriod::new(10, 2024).is_some());
    }

    #[test]
    fn bounds_are_half_open() {
        let period = BillingPeriod::new(10, 2024).unwrap();
        let (start, end) = period.bounds();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = BillingPeriod::new(12, 2024).unwrap().bounds();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn containing_picks_the_dates_month() {
        let period = BillingPeriod::containing(NaiveDate::from_ymd_opt(2024, 10, 5).unwrap());
        assert_eq!(period, BillingPeriod::new(10, 2024).unwrap());
    }
}
