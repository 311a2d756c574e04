//! Billing reconciliation handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::middleware::CallerContext;
use crate::models::{BillRow, BillingPeriod, BillingSummary, CustomerMonthAggregate, MonthlyBill};
use crate::services::metrics::BILL_RUNS;
use crate::services::{NotificationKind, notify_fire_and_forget};
use crate::startup::AppState;
use service_core::error::AppError;

fn resolve_period(month: Option<u32>, year: Option<i32>) -> Result<BillingPeriod, AppError> {
    let today = Utc::now().date_naive();
    let month = month.unwrap_or_else(|| today.month());
    let year = year.unwrap_or_else(|| today.year());
    BillingPeriod::new(month, year)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid month/year: {}/{}", month, year)))
}

#[derive(Debug, Deserialize, Default)]
pub struct GenerateBillsRequest {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Generated bill surfaced with the customer identity and numeric fields as
/// floats.
#[derive(Debug, Serialize)]
pub struct BillDto {
    pub bill_id: Uuid,
    pub customer_id: Uuid,
    pub month: i32,
    pub year: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub is_generated: bool,
    pub generated_utc: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_days: Option<i64>,
}

impl BillDto {
    fn from_generation(aggregate: &CustomerMonthAggregate, bill: &MonthlyBill) -> Self {
        Self {
            bill_id: bill.bill_id,
            customer_id: bill.customer_id,
            month: bill.month,
            year: bill.year,
            total_quantity: bill.total_quantity,
            total_amount: bill.total_amount,
            is_generated: bill.is_generated,
            generated_utc: bill.generated_utc,
            customer_name: aggregate.customer_name.clone(),
            customer_phone: aggregate.customer_phone.clone(),
            customer_address: aggregate.customer_address.clone(),
            delivery_days: Some(aggregate.delivery_days),
        }
    }
}

impl From<BillRow> for BillDto {
    fn from(b: BillRow) -> Self {
        Self {
            bill_id: b.bill_id,
            customer_id: b.customer_id,
            month: b.month,
            year: b.year,
            total_quantity: b.total_quantity,
            total_amount: b.total_amount,
            is_generated: b.is_generated,
            generated_utc: b.generated_utc,
            customer_name: b.customer_name,
            customer_phone: b.customer_phone,
            customer_address: b.customer_address,
            delivery_days: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateBillsResponse {
    pub bills: Vec<BillDto>,
    pub summary: BillingSummaryDto,
}

#[derive(Debug, Serialize)]
pub struct BillingSummaryDto {
    pub total_customers: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub month: u32,
    pub year: i32,
}

impl From<BillingSummary> for BillingSummaryDto {
    fn from(s: BillingSummary) -> Self {
        Self {
            total_customers: s.total_customers,
            total_quantity: s.total_quantity,
            total_amount: s.total_amount,
            month: s.month,
            year: s.year,
        }
    }
}

/// Reconcile a (month, year) window into one bill per qualifying customer.
/// Safe to re-run: totals converge to the ledger, they never accumulate.
#[tracing::instrument(skip(state, ctx, request))]
pub async fn generate_bills(
    State(state): State<AppState>,
    ctx: CallerContext,
    Json(request): Json<GenerateBillsRequest>,
) -> Result<Json<GenerateBillsResponse>, AppError> {
    ctx.require_owner()?;

    let period = resolve_period(request.month, request.year)?;

    let generated = match state.db.generate_monthly_bills(period).await {
        Ok(generated) => {
            BILL_RUNS.with_label_values(&["ok"]).inc();
            generated
        }
        Err(e) => {
            BILL_RUNS.with_label_values(&["error"]).inc();
            return Err(e);
        }
    };

    let mut total_quantity = Decimal::ZERO;
    let mut total_amount = Decimal::ZERO;
    let mut bills = Vec::with_capacity(generated.len());

    for (aggregate, bill) in &generated {
        total_quantity += bill.total_quantity;
        total_amount += bill.total_amount;
        bills.push(BillDto::from_generation(aggregate, bill));

        notify_fire_and_forget(
            state.notifier.clone(),
            bill.customer_id,
            NotificationKind::BillGenerated,
            json!({
                "month": bill.month,
                "year": bill.year,
                "total_quantity": bill.total_quantity,
                "total_amount": bill.total_amount,
            }),
        );
    }

    let summary = BillingSummary {
        total_customers: bills.len(),
        total_quantity,
        total_amount,
        month: period.month,
        year: period.year,
    };

    Ok(Json(GenerateBillsResponse {
        bills,
        summary: summary.into(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListBillsQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ListBillsResponse {
    pub bills: Vec<BillDto>,
}

/// Previously generated bills for a window; an empty window is an empty list.
#[tracing::instrument(skip(state, _ctx))]
pub async fn list_bills(
    State(state): State<AppState>,
    _ctx: CallerContext,
    Query(query): Query<ListBillsQuery>,
) -> Result<Json<ListBillsResponse>, AppError> {
    let period = resolve_period(query.month, query.year)?;

    let bills = state.db.list_bills(period, query.customer_id).await?;

    Ok(Json(ListBillsResponse {
        bills: bills.into_iter().map(Into::into).collect(),
    }))
}
