//----------------------------------------------   Webhook  -----------------------------------------------------------
//! Webhook reconciliation endpoint.
//!
//! The signature middleware has already verified the raw body by the time this handler
//! runs. Once verification passes, the response must be a 2xx in every case that is not a
//! server fault — including events for unknown orders and event types we do not handle —
//! otherwise Toss keeps retrying the delivery.

use actix_web::{web, HttpResponse};
use course_payment_engine::{
    db_types::{OrderId, PaymentEvent, PaymentEventKind},
    traits::OrderLedger,
    OrderFlowApi,
};
use log::*;
use serde_json::{json, Value};
use toss_tools::{WebhookEvent, WebhookEventType};

use crate::errors::ServerError;

pub async fn toss_webhook<B>(body: web::Bytes, api: web::Data<OrderFlowApi<B>>) -> Result<HttpResponse, ServerError>
where B: OrderLedger {
    trace!("🔔️ Received webhook call ({} bytes)", body.len());
    let raw: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("🔔️ Webhook body is not valid JSON: {e}");
        ServerError::WebhookProcessingFailed
    })?;
    let event: WebhookEvent = serde_json::from_value(raw.clone()).map_err(|e| {
        warn!("🔔️ Webhook body is not a payment event: {e}");
        ServerError::WebhookProcessingFailed
    })?;
    let kind = match event.event_type {
        WebhookEventType::PaymentConfirmed => PaymentEventKind::Confirmed,
        WebhookEventType::PaymentFailed => PaymentEventKind::Failed,
        WebhookEventType::PaymentCanceled => PaymentEventKind::Cancelled,
        WebhookEventType::Unknown => {
            info!("🔔️ Ignoring webhook event of an unknown type");
            return Ok(ack());
        },
    };
    let Some(order_id) = event.data.order_id else {
        info!("🔔️ {kind} event carries no order id. Acknowledging without changes.");
        return Ok(ack());
    };
    let payment_event = PaymentEvent {
        order_id: OrderId::from(order_id),
        kind,
        payment_key: event.data.payment_key,
        method: event.data.method,
        raw: raw.get("data").cloned().unwrap_or(Value::Null),
    };
    api.apply_payment_event(payment_event).await.map_err(|e| {
        error!("🔔️ Could not apply payment event: {e}");
        ServerError::WebhookProcessingFailed
    })?;
    Ok(ack())
}

fn ack() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true }))
}
