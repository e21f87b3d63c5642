//! Billing webhook events and operational alerts

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Processing state of a stored webhook event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WebhookEventStatus {
    #[default]
    Pending,
    Processed,
    Failed,
    /// Valid signature but an event type we do not act on
    Ignored,
}

impl std::str::FromStr for WebhookEventStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(WebhookEventStatus::Pending),
            "processed" => Ok(WebhookEventStatus::Processed),
            "failed" => Ok(WebhookEventStatus::Failed),
            "ignored" => Ok(WebhookEventStatus::Ignored),
            _ => Err(format!("Unknown webhook event status: {}", s)),
        }
    }
}

impl std::fmt::Display for WebhookEventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookEventStatus::Pending => write!(f, "pending"),
            WebhookEventStatus::Processed => write!(f, "processed"),
            WebhookEventStatus::Failed => write!(f, "failed"),
            WebhookEventStatus::Ignored => write!(f, "ignored"),
        }
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for WebhookEventStatus {
    fn decode(
        value: sqlx::mysql::MySqlValueRef<'r>,
    ) -> std::result::Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl sqlx::Type<sqlx::MySql> for WebhookEventStatus {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for WebhookEventStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        let s = self.to_string();
        <&str as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&s.as_str(), buf)
    }
}

/// Raw billing provider event, persisted before any processing.
/// Deduplicated on `provider_event_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WebhookEvent {
    pub id: i64,
    pub provider_event_id: String,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub tenant_id: Option<StringUuid>,
    pub status: WebhookEventStatus,
    pub error: Option<String>,
    pub received_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Parsed body of a billing provider event
#[derive(Debug, Clone, Deserialize)]
pub struct BillingEventPayload {
    /// Provider-side unique event id
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    /// Tenant the event concerns; absent for platform-level events
    pub tenant_id: Option<StringUuid>,
    /// Provider subscription id, when the event concerns a subscription
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Operational alert derived from billing or lifecycle processing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: i64,
    pub tenant_id: Option<StringUuid>,
    pub severity: String,
    pub kind: String,
    pub message: String,
    pub is_resolved: bool,
    pub resolved_by: Option<StringUuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for raising an alert
#[derive(Debug, Clone)]
pub struct CreateAlertInput {
    pub tenant_id: Option<StringUuid>,
    pub severity: String,
    pub kind: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_status_roundtrip() {
        for s in ["pending", "processed", "failed", "ignored"] {
            let status: WebhookEventStatus = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
        }
    }

    #[test]
    fn test_billing_event_payload_parses() {
        let json = r#"{
            "id": "evt_123",
            "type": "payment_succeeded",
            "tenant_id": "550e8400-e29b-41d4-a716-446655440000",
            "subscription_id": "sub_9",
            "data": {"amount_cents": 4900}
        }"#;
        let payload: BillingEventPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.id, "evt_123");
        assert_eq!(payload.event_type, "payment_succeeded");
        assert!(payload.tenant_id.is_some());
    }

    #[test]
    fn test_billing_event_payload_minimal() {
        let payload: BillingEventPayload =
            serde_json::from_str(r#"{"id": "evt_1", "type": "ping"}"#).unwrap();
        assert!(payload.tenant_id.is_none());
        assert!(payload.subscription_id.is_none());
    }
}
