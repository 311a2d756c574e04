//! Owner dashboard handler.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::CallerContext;
use crate::models::{ActivityRow, AgentDayStats, pending_count};
use crate::startup::AppState;
use service_core::error::AppError;

const RECENT_ACTIVITY_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStatsDto {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_milk_delivered: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub total_customers: i64,
    pub completed_deliveries: i64,
    pub pending_deliveries: i64,
    pub active_delivery_men: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryManStatsDto {
    pub id: Uuid,
    pub name: String,
    pub area: String,
    pub customers: i64,
    pub completed: i64,
    pub pending: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub milk_delivered: Decimal,
}

impl From<AgentDayStats> for DeliveryManStatsDto {
    fn from(s: AgentDayStats) -> Self {
        let pending = s.pending_today();
        Self {
            id: s.delivery_man_id,
            name: s.name,
            area: s.areas.unwrap_or_default(),
            customers: s.total_customers,
            completed: s.completed_today,
            pending,
            milk_delivered: s.milk_delivered_today,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub customer_name: String,
    pub delivery_man_name: String,
    pub area: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub recorded_utc: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityDto {
    fn from(a: ActivityRow) -> Self {
        let message = format!(
            "{} delivered {}L to {}",
            a.delivery_man_name, a.quantity, a.customer_name
        );
        Self {
            id: a.delivery_id,
            kind: "delivery".to_string(),
            message,
            customer_name: a.customer_name,
            delivery_man_name: a.delivery_man_name,
            area: a.area,
            quantity: a.quantity,
            total_amount: a.total_amount,
            recorded_utc: a.created_utc,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub today_stats: TodayStatsDto,
    pub delivery_men_stats: Vec<DeliveryManStatsDto>,
    pub recent_activity: Vec<ActivityDto>,
}

/// Dashboard snapshot for one day (today by default). A best-effort
/// point-in-time view: it may race benignly with in-flight delivery writes.
#[tracing::instrument(skip(state, ctx))]
pub async fn dashboard(
    State(state): State<AppState>,
    ctx: CallerContext,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    ctx.require_owner()?;

    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let today = state.db.today_stats(date).await?;
    let agents = state.db.agent_day_stats(date).await?;
    let activity = state.db.recent_activity(date, RECENT_ACTIVITY_LIMIT).await?;

    let today_stats = TodayStatsDto {
        total_milk_delivered: today.total_milk_delivered,
        total_revenue: today.total_revenue,
        total_customers: today.total_customers,
        completed_deliveries: today.completed_deliveries,
        // Clamped: completed can exceed the active total when a delivery
        // exists for a customer deactivated after recording.
        pending_deliveries: pending_count(today.total_customers, today.completed_deliveries),
        active_delivery_men: agents.len(),
    };

    Ok(Json(DashboardResponse {
        today_stats,
        delivery_men_stats: agents.into_iter().map(Into::into).collect(),
        recent_activity: activity.into_iter().map(Into::into).collect(),
    }))
}
