//! Caller context extraction.
//!
//! There is no implicit session: every request names its caller explicitly.
//! The presentation layer authenticates the user and forwards the caller's
//! role and id in headers; this extractor turns them into a capability-scoped
//! context that handlers pass to ledger operations.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;
use uuid::Uuid;

pub const CALLER_ROLE_HEADER: &str = "x-caller-role";
pub const CALLER_ID_HEADER: &str = "x-caller-id";

/// Role of the caller, as forwarded by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerRole {
    Owner,
    DeliveryMan,
    Customer,
}

impl CallerRole {
    pub fn from_header(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(CallerRole::Owner),
            "delivery_man" => Some(CallerRole::DeliveryMan),
            "customer" => Some(CallerRole::Customer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallerRole::Owner => "owner",
            CallerRole::DeliveryMan => "delivery_man",
            CallerRole::Customer => "customer",
        }
    }
}

/// Capability-scoped caller context.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub role: CallerRole,
    pub caller_id: Uuid,
}

impl CallerContext {
    /// Owner-only operations (bill generation, dashboard).
    pub fn require_owner(&self) -> Result<(), AppError> {
        if self.role == CallerRole::Owner {
            Ok(())
        } else {
            Err(AppError::Forbidden(anyhow::anyhow!(
                "Operation requires the owner role"
            )))
        }
    }

    /// Recording requires a delivery agent or the owner; an agent may only
    /// record under its own id.
    pub fn authorize_recording_as(&self, delivery_man_id: Uuid) -> Result<(), AppError> {
        match self.role {
            CallerRole::Owner => Ok(()),
            CallerRole::DeliveryMan if self.caller_id == delivery_man_id => Ok(()),
            CallerRole::DeliveryMan => Err(AppError::Forbidden(anyhow::anyhow!(
                "Delivery agents may only record their own deliveries"
            ))),
            CallerRole::Customer => Err(AppError::Forbidden(anyhow::anyhow!(
                "Operation requires a delivery agent or the owner"
            ))),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = parts
            .headers
            .get(CALLER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(CallerRole::from_header)
            .ok_or_else(|| {
                AppError::Unauthorized(anyhow::anyhow!(
                    "Missing or invalid {} header",
                    CALLER_ROLE_HEADER
                ))
            })?;

        let caller_id = parts
            .headers
            .get(CALLER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| {
                AppError::Unauthorized(anyhow::anyhow!(
                    "Missing or invalid {} header",
                    CALLER_ID_HEADER
                ))
            })?;

        // Add to tracing span for observability
        let span = tracing::Span::current();
        span.record("caller_role", role.as_str());
        span.record("caller_id", caller_id.to_string().as_str());

        Ok(CallerContext { role, caller_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!(CallerRole::from_header("owner"), Some(CallerRole::Owner));
        assert_eq!(
            CallerRole::from_header("delivery_man"),
            Some(CallerRole::DeliveryMan)
        );
        assert_eq!(CallerRole::from_header("admin"), None);
    }

    #[test]
    fn agent_cannot_record_for_another_agent() {
        let agent = Uuid::new_v4();
        let other = Uuid::new_v4();
        let ctx = CallerContext {
            role: CallerRole::DeliveryMan,
            caller_id: agent,
        };
        assert!(ctx.authorize_recording_as(agent).is_ok());
        assert!(ctx.authorize_recording_as(other).is_err());
    }

    #[test]
    fn owner_records_for_any_agent() {
        let ctx = CallerContext {
            role: CallerRole::Owner,
            caller_id: Uuid::new_v4(),
        };
        assert!(ctx.authorize_recording_as(Uuid::new_v4()).is_ok());
    }
}
