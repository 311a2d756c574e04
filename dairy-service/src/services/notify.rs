//! Customer notification collaborator.
//!
//! Notification delivery is an external concern; this module only defines the
//! interface and two implementations: a webhook client for the real
//! collaborator and a mock used when none is configured. Calls are
//! fire-and-forget from the ledger's point of view and never participate in a
//! write's success or failure.

use crate::services::metrics::NOTIFICATIONS_TOTAL;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// What happened, from the customer's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    DeliveryRecorded,
    BillGenerated,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::DeliveryRecorded => "delivery_recorded",
            NotificationKind::BillGenerated => "bill_generated",
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notifier not enabled: {0}")]
    NotEnabled(String),

    #[error("Failed to deliver notification: {0}")]
    Send(String),
}

/// Interface to the notification collaborator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        customer_id: Uuid,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), NotifyError>;
}

/// Posts events to the configured notification endpoint.
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(
        &self,
        customer_id: Uuid,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), NotifyError> {
        let body = serde_json::json!({
            "customer_id": customer_id,
            "event": kind.as_str(),
            "payload": payload,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Send(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Send(format!(
                "notification endpoint returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Mock notifier used when no endpoint is configured.
pub struct MockNotifier {
    succeed: bool,
}

impl MockNotifier {
    pub fn new(succeed: bool) -> Self {
        Self { succeed }
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(
        &self,
        customer_id: Uuid,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), NotifyError> {
        if self.succeed {
            tracing::info!(
                customer_id = %customer_id,
                event = kind.as_str(),
                payload = %payload,
                "Mock notification"
            );
            Ok(())
        } else {
            Err(NotifyError::NotEnabled("mock configured to fail".to_string()))
        }
    }
}

/// Queue a notification without awaiting it. Failures are logged and counted,
/// never propagated to the caller.
pub fn notify_fire_and_forget(
    notifier: Arc<dyn Notifier>,
    customer_id: Uuid,
    kind: NotificationKind,
    payload: serde_json::Value,
) {
    tokio::spawn(async move {
        match notifier.notify(customer_id, kind, payload).await {
            Ok(()) => {
                NOTIFICATIONS_TOTAL
                    .with_label_values(&[kind.as_str(), "ok"])
                    .inc();
            }
            Err(e) => {
                NOTIFICATIONS_TOTAL
                    .with_label_values(&[kind.as_str(), "error"])
                    .inc();
                tracing::warn!(
                    customer_id = %customer_id,
                    event = kind.as_str(),
                    error = %e,
                    "Failed to notify customer"
                );
            }
        }
    });
}
