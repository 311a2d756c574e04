//! Customer registry handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::CallerContext;
use crate::models::{
    BillingPeriod, CreateCustomer, CustomerDayStatus, CustomerProfile, Delivery, UpdateCustomer,
};
use crate::startup::AppState;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct CustomerDto {
    pub customer_id: Uuid,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub area: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub usual_quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate_per_liter: Decimal,
    pub delivery_man_id: Uuid,
    pub is_active: bool,
}

impl From<CustomerProfile> for CustomerDto {
    fn from(c: CustomerProfile) -> Self {
        Self {
            customer_id: c.customer_id,
            name: c.name,
            phone: c.phone,
            address: c.address,
            area: c.area,
            usual_quantity: c.usual_quantity,
            rate_per_liter: c.rate_per_liter,
            delivery_man_id: c.delivery_man_id,
            is_active: c.is_active,
        }
    }
}

// -----------------------------------------------------------------------------
// Per-agent listing / daily snapshot
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListCustomersQuery {
    pub delivery_man_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct CustomerDayStatusDto {
    pub customer_id: Uuid,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub area: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub usual_quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate_per_liter: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub today_quantity: Option<Decimal>,
    pub today_status: String,
    pub recorded_utc: Option<DateTime<Utc>>,
}

impl From<CustomerDayStatus> for CustomerDayStatusDto {
    fn from(c: CustomerDayStatus) -> Self {
        let status = c.status();
        Self {
            customer_id: c.customer_id,
            name: c.name,
            phone: c.phone,
            address: c.address,
            area: c.area,
            usual_quantity: c.usual_quantity,
            rate_per_liter: c.rate_per_liter,
            today_quantity: c.day_quantity,
            today_status: status.as_str().to_string(),
            recorded_utc: c.recorded_utc,
        }
    }
}

/// Agent-wide totals over the snapshot rows.
#[derive(Debug, Serialize)]
pub struct AgentSnapshotSummary {
    pub total_customers: usize,
    pub completed: usize,
    pub pending: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity_delivered: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ListCustomersResponse {
    pub customers: Vec<CustomerDayStatusDto>,
    pub summary: AgentSnapshotSummary,
}

/// An agent's active customers with their day-slot status for the given date
/// (today by default), plus agent-wide totals.
#[tracing::instrument(skip(state, _ctx))]
pub async fn list_customers(
    State(state): State<AppState>,
    _ctx: CallerContext,
    Query(query): Query<ListCustomersQuery>,
) -> Result<Json<ListCustomersResponse>, AppError> {
    let delivery_man_id = query.delivery_man_id.ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("delivery_man_id is required"))
    })?;
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let rows = state
        .db
        .list_customers_for_agent(delivery_man_id, date)
        .await?;

    let completed = rows.iter().filter(|c| c.day_quantity.is_some()).count();
    let quantity_delivered = rows
        .iter()
        .filter_map(|c| c.day_quantity)
        .sum::<Decimal>();
    let summary = AgentSnapshotSummary {
        total_customers: rows.len(),
        completed,
        pending: rows.len() - completed,
        quantity_delivered,
    };

    Ok(Json(ListCustomersResponse {
        customers: rows.into_iter().map(Into::into).collect(),
        summary,
    }))
}

// -----------------------------------------------------------------------------
// Onboarding
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 6, message = "Phone number is too short"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: Option<String>,
    pub area: Option<String>,
    pub usual_quantity: Option<Decimal>,
    pub rate_per_liter: Option<Decimal>,
    pub delivery_man_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub customer: CustomerDto,
}

/// Onboard a customer. Quantity and rate fall back to the house defaults
/// (1.0 L, 60.0 per liter).
#[tracing::instrument(skip(state, ctx, request))]
pub async fn create_customer(
    State(state): State<AppState>,
    ctx: CallerContext,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), AppError> {
    request.validate()?;

    let (Some(name), Some(phone), Some(address), Some(delivery_man_id)) = (
        request.name,
        request.phone,
        request.address,
        request.delivery_man_id,
    ) else {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Missing required fields"
        )));
    };

    ctx.authorize_recording_as(delivery_man_id)?;

    let usual_quantity = request.usual_quantity.unwrap_or(Decimal::ONE);
    let rate_per_liter = request
        .rate_per_liter
        .unwrap_or_else(|| Decimal::new(60, 0));

    if rate_per_liter <= Decimal::ZERO {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Rate per liter must be positive"
        )));
    }
    if usual_quantity < Decimal::ZERO {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Usual quantity must not be negative"
        )));
    }

    let input = CreateCustomer {
        name,
        phone,
        address,
        area: request.area.unwrap_or_default(),
        usual_quantity,
        rate_per_liter,
        delivery_man_id,
    };

    let customer = state.db.create_customer(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CustomerResponse {
            customer: customer.into(),
        }),
    ))
}

// -----------------------------------------------------------------------------
// Detail / update / deactivate
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CustomerDetailQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CustomerDeliveryDto {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate_per_liter: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl From<Delivery> for CustomerDeliveryDto {
    fn from(d: Delivery) -> Self {
        Self {
            date: d.delivery_date,
            quantity: d.quantity,
            rate_per_liter: d.rate_per_liter,
            amount: d.total_amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerDetailResponse {
    pub customer: CustomerDto,
    pub deliveries: Vec<CustomerDeliveryDto>,
}

/// Customer detail plus its deliveries for the requested window (the current
/// month by default), by delivery date ascending.
#[tracing::instrument(skip(state, _ctx))]
pub async fn get_customer(
    State(state): State<AppState>,
    _ctx: CallerContext,
    Path(customer_id): Path<Uuid>,
    Query(query): Query<CustomerDetailQuery>,
) -> Result<Json<CustomerDetailResponse>, AppError> {
    let customer = state
        .db
        .get_customer(customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer not found")))?;

    let today = Utc::now().date_naive();
    let period = BillingPeriod::new(
        query.month.unwrap_or_else(|| today.month()),
        query.year.unwrap_or_else(|| today.year()),
    )
    .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid month/year")))?;

    let deliveries = state.db.list_customer_deliveries(customer_id, period).await?;

    Ok(Json(CustomerDetailResponse {
        customer: customer.into(),
        deliveries: deliveries.into_iter().map(Into::into).collect(),
    }))
}

#[derive(Debug, Deserialize, Default, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 6, message = "Phone number is too short"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: Option<String>,
    pub area: Option<String>,
    pub usual_quantity: Option<Decimal>,
    pub rate_per_liter: Option<Decimal>,
}

/// Partial update; unspecified fields stay as they are. A rate change only
/// affects deliveries recorded after it.
#[tracing::instrument(skip(state, _ctx, request))]
pub async fn update_customer(
    State(state): State<AppState>,
    _ctx: CallerContext,
    Path(customer_id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>, AppError> {
    request.validate()?;

    if let Some(rate) = request.rate_per_liter {
        if rate <= Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Rate per liter must be positive"
            )));
        }
    }
    if let Some(quantity) = request.usual_quantity {
        if quantity < Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Usual quantity must not be negative"
            )));
        }
    }

    let input = UpdateCustomer {
        name: request.name,
        phone: request.phone,
        address: request.address,
        area: request.area,
        usual_quantity: request.usual_quantity,
        rate_per_liter: request.rate_per_liter,
    };

    let customer = state
        .db
        .update_customer(customer_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer not found")))?;

    Ok(Json(CustomerResponse {
        customer: customer.into(),
    }))
}

/// Soft-delete. The ledger history stays; the customer disappears from
/// listings, billing, and dashboards.
#[tracing::instrument(skip(state, ctx))]
pub async fn deactivate_customer(
    State(state): State<AppState>,
    ctx: CallerContext,
    Path(customer_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ctx.require_owner()?;

    let deactivated = state.db.deactivate_customer(customer_id).await?;
    if !deactivated {
        return Err(AppError::NotFound(anyhow::anyhow!("Customer not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}
