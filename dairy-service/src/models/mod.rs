//! Data models for dairy-service.

pub mod bill;
pub mod customer;
pub mod dashboard;
pub mod delivery;
pub mod person;

pub use bill::{BillRow, BillingPeriod, BillingSummary, CustomerMonthAggregate, MonthlyBill};
pub use customer::{
    CreateCustomer, Customer, CustomerDayStatus, CustomerProfile, DayStatus, UpdateCustomer,
};
pub use dashboard::{ActivityRow, AgentDayStats, TodayStats, pending_count};
pub use delivery::{Delivery, DeliveryRow, RecordDelivery};
pub use person::{Person, PersonType};
