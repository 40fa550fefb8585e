use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The typed view of a confirmed payment, as returned by `POST /v1/payments/confirm`.
/// Only the fields the gateway acts on are modelled; the full response body travels
/// alongside as raw JSON for the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TossPayment {
    pub payment_key: String,
    pub order_id: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub total_amount: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
}

/// Webhook event types the gateway understands. Anything else deserializes to `Unknown`
/// and is deliberately ignored rather than rejected, so new event types cannot break the
/// webhook endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookEventType {
    PaymentConfirmed,
    PaymentFailed,
    PaymentCanceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub event_type: WebhookEventType,
    #[serde(default)]
    pub data: WebhookPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub payment_key: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn confirm_response_deserializes() {
        let json = r#"{
            "paymentKey": "5zJ4xY7m0kODnyRpQWGrN2xqGlNvLrKwv1M9ENjbeoPaZdL6",
            "orderId": "order_1740830400000_9f3ac1b2",
            "method": "카드",
            "totalAmount": 550000,
            "status": "DONE",
            "approvedAt": "2025-03-01T21:01:06+09:00",
            "requestedAt": "2025-03-01T21:00:52+09:00"
        }"#;
        let payment: TossPayment = serde_json::from_str(json).unwrap();
        assert_eq!(payment.order_id, "order_1740830400000_9f3ac1b2");
        assert_eq!(payment.method.as_deref(), Some("카드"));
        assert_eq!(payment.total_amount, Some(550_000));
        assert!(payment.approved_at.is_some());
    }

    #[test]
    fn webhook_event_deserializes() {
        let json = r#"{
            "eventType": "PAYMENT_CONFIRMED",
            "createdAt": "2025-03-01T12:00:00",
            "data": { "orderId": "order_1", "paymentKey": "key_1", "method": "카드" }
        }"#;
        let event: WebhookEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, WebhookEventType::PaymentConfirmed);
        assert_eq!(event.data.order_id.as_deref(), Some("order_1"));
        assert_eq!(event.data.payment_key.as_deref(), Some("key_1"));
    }

    #[test]
    fn unknown_event_types_fold_into_unknown() {
        let json = r#"{ "eventType": "DEPOSIT_CALLBACK", "data": {} }"#;
        let event: WebhookEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, WebhookEventType::Unknown);
        assert!(event.data.order_id.is_none());
    }

    #[test]
    fn events_without_a_type_are_rejected() {
        let json = r#"{ "data": { "orderId": "order_1" } }"#;
        assert!(serde_json::from_str::<WebhookEvent>(json).is_err());
    }
}
