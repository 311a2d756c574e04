//! Delivery ledger handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::middleware::CallerContext;
use crate::models::{Delivery, DeliveryRow, RecordDelivery};
use crate::services::metrics::DELIVERIES_RECORDED;
use crate::services::{NotificationKind, notify_fire_and_forget};
use crate::startup::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct RecordDeliveryRequest {
    pub customer_id: Option<Uuid>,
    pub delivery_man_id: Option<Uuid>,
    pub quantity: Option<Decimal>,
    pub delivery_date: Option<NaiveDate>,
}

/// Stored record surfaced with numeric fields as floats.
#[derive(Debug, Serialize)]
pub struct DeliveryDto {
    pub delivery_id: Uuid,
    pub customer_id: Uuid,
    pub delivery_man_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate_per_liter: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub delivery_date: NaiveDate,
    pub created_utc: DateTime<Utc>,
}

impl From<Delivery> for DeliveryDto {
    fn from(d: Delivery) -> Self {
        Self {
            delivery_id: d.delivery_id,
            customer_id: d.customer_id,
            delivery_man_id: d.delivery_man_id,
            quantity: d.quantity,
            rate_per_liter: d.rate_per_liter,
            total_amount: d.total_amount,
            delivery_date: d.delivery_date,
            created_utc: d.created_utc,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordDeliveryResponse {
    pub delivery: DeliveryDto,
    pub message: String,
}

/// Record (or overwrite) the delivery for (customer, day).
#[tracing::instrument(skip(state, ctx, request))]
pub async fn record_delivery(
    State(state): State<AppState>,
    ctx: CallerContext,
    Json(request): Json<RecordDeliveryRequest>,
) -> Result<Json<RecordDeliveryResponse>, AppError> {
    let (Some(customer_id), Some(delivery_man_id), Some(quantity)) = (
        request.customer_id,
        request.delivery_man_id,
        request.quantity,
    ) else {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Missing required fields"
        )));
    };

    ctx.authorize_recording_as(delivery_man_id)?;

    let input = RecordDelivery {
        customer_id,
        delivery_man_id,
        quantity,
        delivery_date: request
            .delivery_date
            .unwrap_or_else(|| Utc::now().date_naive()),
    };

    let delivery = match state.db.record_delivery(&input).await {
        Ok(delivery) => {
            DELIVERIES_RECORDED.with_label_values(&["ok"]).inc();
            delivery
        }
        Err(e) => {
            DELIVERIES_RECORDED.with_label_values(&["error"]).inc();
            return Err(e);
        }
    };

    // Fire-and-forget: the customer hears about it, but notification failure
    // never fails the write.
    notify_fire_and_forget(
        state.notifier.clone(),
        customer_id,
        NotificationKind::DeliveryRecorded,
        json!({
            "quantity": delivery.quantity,
            "total_amount": delivery.total_amount,
            "delivery_date": delivery.delivery_date,
        }),
    );

    Ok(Json(RecordDeliveryResponse {
        delivery: delivery.into(),
        message: "Delivery recorded successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListDeliveriesQuery {
    pub delivery_man_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DeliveryListItem {
    pub delivery_id: Uuid,
    pub customer_id: Uuid,
    pub delivery_man_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate_per_liter: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub delivery_date: NaiveDate,
    pub created_utc: DateTime<Utc>,
    pub customer_name: String,
    pub area: String,
}

impl From<DeliveryRow> for DeliveryListItem {
    fn from(d: DeliveryRow) -> Self {
        Self {
            delivery_id: d.delivery_id,
            customer_id: d.customer_id,
            delivery_man_id: d.delivery_man_id,
            quantity: d.quantity,
            rate_per_liter: d.rate_per_liter,
            total_amount: d.total_amount,
            delivery_date: d.delivery_date,
            created_utc: d.created_utc,
            customer_name: d.customer_name,
            area: d.area,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListDeliveriesResponse {
    pub deliveries: Vec<DeliveryListItem>,
}

/// An agent's deliveries for one day, most recent write first.
#[tracing::instrument(skip(state, _ctx))]
pub async fn list_deliveries(
    State(state): State<AppState>,
    _ctx: CallerContext,
    Query(query): Query<ListDeliveriesQuery>,
) -> Result<Json<ListDeliveriesResponse>, AppError> {
    let delivery_man_id = query.delivery_man_id.ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("delivery_man_id is required"))
    })?;
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let deliveries = state
        .db
        .list_deliveries_for_agent(delivery_man_id, date)
        .await?;

    Ok(Json(ListDeliveriesResponse {
        deliveries: deliveries.into_iter().map(Into::into).collect(),
    }))
}
