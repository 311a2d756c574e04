//! Person identity shared by owners, delivery agents, and customers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role a person plays in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonType {
    Owner,
    DeliveryMan,
    Customer,
}

impl PersonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonType::Owner => "owner",
            PersonType::DeliveryMan => "delivery_man",
            PersonType::Customer => "customer",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "owner" => PersonType::Owner,
            "delivery_man" => PersonType::DeliveryMan,
            _ => PersonType::Customer,
        }
    }
}

impl std::fmt::Display for PersonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity row. Customers are never hard-deleted; `is_active` is the
/// soft-delete flag.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Person {
    pub person_id: Uuid,
    pub name: String,
    pub phone: String,
    pub person_type: String,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
}
